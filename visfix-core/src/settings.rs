//! Clap-free settings for check and fix passes.

use camino::Utf8PathBuf;
use visfix_domain::RuleConfig;
use visfix_types::edit::FixId;
use visfix_types::finding::{ItemKind, RuleId};

#[derive(Debug, Clone)]
pub struct PassSettings {
    pub repo_root: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,

    pub rule: RuleId,
    pub fix: FixId,
    pub kinds: Vec<ItemKind>,

    /// Glob patterns, matched against paths relative to `repo_root`.
    pub exclude: Vec<String>,

    /// Write edited documents back through the `WritePort`. Off means preview only.
    pub apply: bool,
}

impl PassSettings {
    pub fn rule_config(&self) -> RuleConfig {
        RuleConfig {
            kinds: self.kinds.clone(),
        }
    }
}

impl Default for PassSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            out_dir: Utf8PathBuf::from("target/visfix"),
            rule: RuleId::MissingVisibility,
            fix: FixId::default(),
            kinds: ItemKind::DEFAULT.to_vec(),
            exclude: Vec::new(),
            apply: false,
        }
    }
}
