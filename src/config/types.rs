use crate::core::feed::sources::RelationshipKind;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Which actors the aggregation run is allowed to see.
///
/// Unrecognized filter strings fall back to [`FilterMode::All`] (the least
/// restrictive behavior) rather than failing; see [`FilterMode::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// No actor restriction.
    #[default]
    All,
    /// Only the subject's own actions.
    SelfOnly,
    /// Only actions by members of the subject's relationship circle.
    Circle,
}

impl FilterMode {
    /// Parse a filter mode string.
    ///
    /// Accepts `"all"`, `"self"` (alias `"user"`) and `"circle"` (alias
    /// `"friends"`), case-insensitively. Anything else maps to `All`.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "self" | "user" => FilterMode::SelfOnly,
            "circle" | "friends" => FilterMode::Circle,
            _ => FilterMode::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::SelfOnly => "self",
            FilterMode::Circle => "circle",
        }
    }
}

impl Serialize for FilterMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FilterMode::parse(&raw))
    }
}

/// Viewer-selected configuration for one aggregation run.
///
/// All category toggles default to enabled; `max_items` caps each source
/// independently, not the merged feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub filter: FilterMode,
    /// Relationship kind consulted when `filter` is `Circle`.
    #[serde(default)]
    pub circle_kind: RelationshipKind,
    /// Per-source row cap.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_true")]
    pub show_edits: bool,
    #[serde(default = "default_true")]
    pub show_comments: bool,
    #[serde(default = "default_true")]
    pub show_relationships: bool,
    #[serde(default = "default_true")]
    pub show_system_messages: bool,
    #[serde(default = "default_true")]
    pub show_messages_sent: bool,
    /// When set, comment rows scoring at or below this threshold are skipped.
    #[serde(default)]
    pub min_comment_score: Option<u32>,
}

fn default_true() -> bool {
    true
}

fn default_max_items() -> usize {
    50
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            filter: FilterMode::All,
            circle_kind: RelationshipKind::Friend,
            max_items: default_max_items(),
            show_edits: true,
            show_comments: true,
            show_relationships: true,
            show_system_messages: true,
            show_messages_sent: true,
            min_comment_score: None,
        }
    }
}

impl FeedConfig {
    /// Config restricted to the subject's own actions.
    pub fn self_only() -> Self {
        Self {
            filter: FilterMode::SelfOnly,
            ..Self::default()
        }
    }

    /// Config restricted to the subject's relationship circle.
    pub fn circle(kind: RelationshipKind) -> Self {
        Self {
            filter: FilterMode::Circle,
            circle_kind: kind,
            ..Self::default()
        }
    }
}
