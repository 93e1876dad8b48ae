//! Canonical activity feed data structures
//!
//! This module defines the uniform item model that every source row is
//! normalized into, plus the per-target grouping state consumed by the
//! summary line engine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category of a normalized activity item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Edit,
    Comment,
    Friend,
    Foe,
    UserMessage,
    SystemMessage,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Edit => "edit",
            ActivityKind::Comment => "comment",
            ActivityKind::Friend => "friend",
            ActivityKind::Foe => "foe",
            ActivityKind::UserMessage => "user_message",
            ActivityKind::SystemMessage => "system_message",
        }
    }

    /// Whether `target` and `namespace` refer to a page rather than a
    /// recipient.
    pub fn is_page_scoped(&self) -> bool {
        matches!(self, ActivityKind::Edit | ActivityKind::Comment)
    }

    /// Whether a summary line for this category is only emitted when its
    /// target fragment is non-empty.
    pub fn requires_target_fragment(&self) -> bool {
        self.is_page_scoped()
    }
}

/// One normalized event from any source.
///
/// `kind` determines which fields are meaningful; the rest stay zero-valued.
/// For page-scoped kinds `target` is a page title and `namespace` is set; for
/// relationship and message kinds `target` is the recipient's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    /// Source-local identifier, 0 when the source has none.
    pub id: u64,
    pub kind: ActivityKind,
    /// Seconds since the Unix epoch. Always set.
    pub timestamp: i64,
    pub target: String,
    pub namespace: i32,
    /// Display name of the user who performed the action.
    pub actor_name: String,
    /// Pre-truncated, escaped comment or body text; may be empty.
    pub summary_text: String,
    /// Edit only: whether the edit was flagged minor.
    pub minor: bool,
    /// Edit only: whether the edit created the page.
    pub new_page: bool,
}

impl ActivityItem {
    /// Create an item with the given identity fields and everything else
    /// zero-valued.
    pub fn new(kind: ActivityKind, timestamp: i64, actor_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind,
            timestamp,
            target: String::new(),
            namespace: 0,
            actor_name: actor_name.into(),
            summary_text: String::new(),
            minor: false,
            new_page: false,
        }
    }
}

/// Aggregated state for one (kind, target) group.
///
/// Actor insertion order is fetch order (descending source id) and is
/// observable: it drives both the stacking scan and the actor list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetGroup {
    /// Maximum timestamp of any item in the group.
    pub last_timestamp: i64,
    /// Actor display name to that actor's actions, in fetch order.
    pub actions_by_actor: IndexMap<String, Vec<ActivityItem>>,
}

impl TargetGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, keeping `last_timestamp` monotone non-decreasing.
    pub fn record(&mut self, item: ActivityItem) {
        if item.timestamp > self.last_timestamp {
            self.last_timestamp = item.timestamp;
        }
        self.actions_by_actor
            .entry(item.actor_name.clone())
            .or_default()
            .push(item);
    }

    pub fn actor_count(&self) -> usize {
        self.actions_by_actor.len()
    }

    /// The single actor and their actions, when exactly one actor touched
    /// this target.
    pub fn sole_actor(&self) -> Option<(&str, &[ActivityItem])> {
        if self.actions_by_actor.len() == 1 {
            self.actions_by_actor
                .iter()
                .next()
                .map(|(name, actions)| (name.as_str(), actions.as_slice()))
        } else {
            None
        }
    }
}

/// Per-kind, per-target grouped accumulation for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedActivity {
    map: HashMap<ActivityKind, IndexMap<String, TargetGroup>>,
}

impl GroupedActivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an item under its (kind, target) group, creating the group on
    /// first use.
    pub fn record(&mut self, target: &str, item: ActivityItem) {
        self.map
            .entry(item.kind)
            .or_default()
            .entry(target.to_string())
            .or_default()
            .record(item);
    }

    /// Target groups of one category, in insertion order.
    pub fn groups(&self, kind: ActivityKind) -> Option<&IndexMap<String, TargetGroup>> {
        self.map.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One emitted grouped-feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub kind: ActivityKind,
    /// The group's `last_timestamp` (or the item's timestamp for system
    /// messages).
    pub timestamp: i64,
    /// Fully composed narrative text.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_item(timestamp: i64, actor: &str) -> ActivityItem {
        ActivityItem::new(ActivityKind::Edit, timestamp, actor)
    }

    #[test]
    fn test_kind_as_str() {
        assert_eq!(ActivityKind::Edit.as_str(), "edit");
        assert_eq!(ActivityKind::UserMessage.as_str(), "user_message");
        assert_eq!(ActivityKind::SystemMessage.as_str(), "system_message");
    }

    #[test]
    fn test_kind_scoping() {
        assert!(ActivityKind::Edit.is_page_scoped());
        assert!(ActivityKind::Comment.is_page_scoped());
        assert!(!ActivityKind::Friend.is_page_scoped());
        assert!(!ActivityKind::UserMessage.is_page_scoped());
        assert!(ActivityKind::Edit.requires_target_fragment());
        assert!(!ActivityKind::UserMessage.requires_target_fragment());
    }

    #[test]
    fn test_new_item_is_zero_valued() {
        let item = ActivityItem::new(ActivityKind::Comment, 100, "Alice");
        assert_eq!(item.id, 0);
        assert_eq!(item.timestamp, 100);
        assert_eq!(item.actor_name, "Alice");
        assert!(item.target.is_empty());
        assert!(item.summary_text.is_empty());
        assert!(!item.minor);
        assert!(!item.new_page);
    }

    #[test]
    fn test_target_group_last_timestamp_is_max() {
        let mut group = TargetGroup::new();
        group.record(edit_item(100, "Alice"));
        assert_eq!(group.last_timestamp, 100);
        group.record(edit_item(90, "Alice"));
        assert_eq!(group.last_timestamp, 100);
        group.record(edit_item(150, "Bob"));
        assert_eq!(group.last_timestamp, 150);
        assert_eq!(group.actor_count(), 2);
    }

    #[test]
    fn test_target_group_sole_actor() {
        let mut group = TargetGroup::new();
        group.record(edit_item(100, "Alice"));
        group.record(edit_item(90, "Alice"));
        let (name, actions) = group.sole_actor().unwrap();
        assert_eq!(name, "Alice");
        assert_eq!(actions.len(), 2);

        group.record(edit_item(80, "Bob"));
        assert!(group.sole_actor().is_none());
    }

    #[test]
    fn test_target_group_preserves_actor_order() {
        let mut group = TargetGroup::new();
        group.record(edit_item(100, "Zoe"));
        group.record(edit_item(90, "Alice"));
        group.record(edit_item(80, "Zoe"));
        let names: Vec<&String> = group.actions_by_actor.keys().collect();
        assert_eq!(names, ["Zoe", "Alice"]);
    }

    #[test]
    fn test_grouped_activity_record() {
        let mut grouped = GroupedActivity::new();
        assert!(grouped.is_empty());

        grouped.record("PageA", edit_item(100, "Alice"));
        grouped.record("PageB", edit_item(90, "Bob"));
        grouped.record("PageA", edit_item(95, "Bob"));

        let groups = grouped.groups(ActivityKind::Edit).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["PageA"].last_timestamp, 100);
        assert_eq!(groups["PageA"].actor_count(), 2);
        assert_eq!(groups["PageB"].actor_count(), 1);
        assert!(grouped.groups(ActivityKind::Comment).is_none());
    }

    #[test]
    fn test_grouped_activity_preserves_target_order() {
        let mut grouped = GroupedActivity::new();
        grouped.record("Zebra", edit_item(10, "A"));
        grouped.record("Apple", edit_item(20, "A"));
        grouped.record("Mango", edit_item(30, "A"));
        let targets: Vec<&String> = grouped
            .groups(ActivityKind::Edit)
            .unwrap()
            .keys()
            .collect();
        assert_eq!(targets, ["Zebra", "Apple", "Mango"]);
    }
}
