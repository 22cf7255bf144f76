use crate::document::DocumentId;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use visfix_syntax::{Position, Span};

/// Identity of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// A module-scope item declared without a visibility modifier.
    MissingVisibility,
}

impl RuleId {
    pub const ALL: &'static [RuleId] = &[RuleId::MissingVisibility];

    pub fn code(self) -> &'static str {
        match self {
            RuleId::MissingVisibility => "VIS001",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::MissingVisibility => "missing_visibility",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().replace('-', "_");
        RuleId::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == norm || r.code().eq_ignore_ascii_case(&norm))
            .ok_or_else(|| UnknownId {
                kind: "rule",
                value: s.to_string(),
            })
    }
}

/// Returned when parsing an unknown rule or fix identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} id `{value}`")]
pub struct UnknownId {
    pub kind: &'static str,
    pub value: String,
}

/// Item declarations the visibility rule knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "struct")]
    Struct,
    #[serde(rename = "enum")]
    Enum,
    #[serde(rename = "union")]
    Union,
    #[serde(rename = "trait")]
    Trait,
    #[serde(rename = "fn")]
    Function,
    #[serde(rename = "type")]
    TypeAlias,
}

impl ItemKind {
    pub const ALL: &'static [ItemKind] = &[
        ItemKind::Struct,
        ItemKind::Enum,
        ItemKind::Union,
        ItemKind::Trait,
        ItemKind::Function,
        ItemKind::TypeAlias,
    ];

    /// Kinds checked when nothing else is configured.
    pub const DEFAULT: &'static [ItemKind] = &[
        ItemKind::Struct,
        ItemKind::Enum,
        ItemKind::Union,
        ItemKind::Trait,
    ];

    /// tree-sitter node kind for the item.
    pub fn node_kind(self) -> &'static str {
        match self {
            ItemKind::Struct => "struct_item",
            ItemKind::Enum => "enum_item",
            ItemKind::Union => "union_item",
            ItemKind::Trait => "trait_item",
            ItemKind::Function => "function_item",
            ItemKind::TypeAlias => "type_item",
        }
    }

    /// Keyword token introducing the item; also the config spelling.
    pub fn keyword(self) -> &'static str {
        match self {
            ItemKind::Struct => "struct",
            ItemKind::Enum => "enum",
            ItemKind::Union => "union",
            ItemKind::Trait => "trait",
            ItemKind::Function => "fn",
            ItemKind::TypeAlias => "type",
        }
    }

    pub fn from_node_kind(kind: &str) -> Option<ItemKind> {
        ItemKind::ALL.iter().copied().find(|k| k.node_kind() == kind)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ItemKind {
    type Err = UnknownId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ItemKind::ALL
            .iter()
            .copied()
            .find(|k| k.keyword() == s)
            .ok_or_else(|| UnknownId {
                kind: "item kind",
                value: s.to_string(),
            })
    }
}

/// A located rule violation.
///
/// `span` covers the item's keyword token in the document the rule was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: RuleId,
    pub document: DocumentId,
    pub path: Utf8PathBuf,
    pub span: Span,
    pub position: Position,
    pub item: ItemKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Finding {
    pub fn message(&self) -> String {
        match &self.name {
            Some(name) => format!("{} `{}` has no visibility modifier", self.item, name),
            None => format!("{} has no visibility modifier", self.item),
        }
    }
}
