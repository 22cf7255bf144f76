//! Configuration file loading for visfix.
//!
//! Discovers and loads `visfix.toml` from the repository root and merges it with CLI
//! arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;
use visfix_types::edit::FixId;
use visfix_types::finding::ItemKind;

pub const CONFIG_FILE_NAME: &str = "visfix.toml";

/// Top-level configuration from visfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisfixConfig {
    pub rule: RuleSection,
    pub fix: FixSection,
    pub discovery: DiscoverySection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSection {
    /// Item kinds checked. `None` keeps the built-in default set.
    pub kinds: Option<Vec<ItemKind>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixSection {
    /// Fix identity used when `--fix` is not given.
    pub default: Option<FixId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySection {
    /// Glob patterns relative to the root.
    pub exclude: Vec<String>,
}

pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<VisfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<VisfixConfig> {
    let config: VisfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from repo root, or return default if not found.
pub fn load_or_default(repo_root: &Utf8Path) -> anyhow::Result<VisfixConfig> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(VisfixConfig::default()),
    }
}

/// Config file values with CLI arguments applied on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub fix: FixId,
    pub kinds: Vec<ItemKind>,
    pub exclude: Vec<String>,
}

pub struct ConfigMerger {
    config: VisfixConfig,
}

impl ConfigMerger {
    pub fn new(config: VisfixConfig) -> Self {
        Self { config }
    }

    /// `--fix` and a non-empty `--kind` list replace the file values; `--exclude` patterns
    /// extend the file's list.
    pub fn merge(
        self,
        cli_fix: Option<FixId>,
        cli_kinds: &[ItemKind],
        cli_exclude: &[String],
    ) -> MergedConfig {
        let fix = cli_fix.or(self.config.fix.default).unwrap_or_default();

        let mut kinds = if cli_kinds.is_empty() {
            self.config
                .rule
                .kinds
                .unwrap_or_else(|| ItemKind::DEFAULT.to_vec())
        } else {
            cli_kinds.to_vec()
        };
        kinds.sort();
        kinds.dedup();

        let mut exclude = self.config.discovery.exclude;
        for pattern in cli_exclude {
            if !exclude.contains(pattern) {
                exclude.push(pattern.clone());
            }
        }

        MergedConfig {
            fix,
            kinds,
            exclude,
        }
    }
}
