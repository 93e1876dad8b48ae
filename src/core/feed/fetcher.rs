//! Source fetching and item normalization
//!
//! Five retrieval routines share one contract: ask the store for the most
//! recent rows the actor filter admits, drop rows that fail source-specific
//! validity checks, normalize the survivors into [`ActivityItem`]s, and
//! accumulate them into both the flat item list and the per-target grouped
//! map. Nothing here is fatal; a missing source or an unresolvable actor
//! just means fewer items.

use super::render::TextShaper;
use super::sources::{
    ActivityStore, ActorFilter, ActorResolver, RelationshipKind, SystemMessageKind,
};
use super::types::{ActivityItem, ActivityKind, GroupedActivity};
use tracing::debug;

/// Visible-character budget for comment and body previews.
pub const COMMENT_PREVIEW_CHARS: usize = 75;

/// Fetches rows from every enabled source and accumulates normalized items.
///
/// One fetcher instance lives for one aggregation run; the accumulated
/// `items` and `grouped` state is handed to the assembler and the summary
/// engine afterwards.
pub struct Fetcher<'a> {
    store: &'a dyn ActivityStore,
    resolver: &'a dyn ActorResolver,
    shaper: &'a dyn TextShaper,
    filter: ActorFilter,
    max_items: usize,
    min_comment_score: Option<u32>,
    /// Flat list of every normalized item, in fetch order.
    pub items: Vec<ActivityItem>,
    /// Per-kind, per-target grouped accumulation.
    pub grouped: GroupedActivity,
}

impl<'a> Fetcher<'a> {
    pub fn new(
        store: &'a dyn ActivityStore,
        resolver: &'a dyn ActorResolver,
        shaper: &'a dyn TextShaper,
        filter: ActorFilter,
        max_items: usize,
        min_comment_score: Option<u32>,
    ) -> Self {
        Self {
            store,
            resolver,
            shaper,
            filter,
            max_items,
            min_comment_score,
            items: Vec::new(),
            grouped: GroupedActivity::new(),
        }
    }

    /// Truncate to the preview budget, then escape. Truncation first so the
    /// budget counts visible characters rather than entity-encoded ones.
    fn fix_comment(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        let preview = self.shaper.truncate_visual(raw, COMMENT_PREVIEW_CHARS);
        self.shaper.escape(&preview)
    }

    fn record(&mut self, item: ActivityItem) {
        if item.kind != ActivityKind::SystemMessage {
            let target = item.target.clone();
            self.grouped.record(&target, item.clone());
        }
        self.items.push(item);
    }

    /// Fetch recent page edits.
    ///
    /// Skips rows in non-content namespaces (special pages are not editable)
    /// and log-only rows (blocking a vandal is not an edit of their page).
    pub fn fetch_edits(&mut self) {
        let rows = self.store.recent_edits(&self.filter, self.max_items);
        let fetched = rows.len();
        let mut kept = 0;

        for row in rows {
            if row.namespace < 0 || row.log_only {
                continue;
            }
            let actor_name = match self.resolver.resolve(row.actor) {
                Some(name) => name,
                None => continue,
            };

            let mut item = ActivityItem::new(ActivityKind::Edit, row.timestamp, actor_name);
            item.target = row.title;
            item.namespace = row.namespace;
            item.summary_text = self.fix_comment(&row.comment);
            item.minor = row.minor;
            item.new_page = row.new_page;
            self.record(item);
            kept += 1;
        }
        debug!(fetched, kept, "fetched edit rows");
    }

    /// Fetch recent page comments, honoring the optional minimum score.
    pub fn fetch_comments(&mut self) {
        let rows = self.store.recent_comments(&self.filter, self.max_items);
        let fetched = rows.len();
        let mut kept = 0;

        for row in rows {
            if let Some(min_score) = self.min_comment_score {
                if row.score <= min_score {
                    continue;
                }
            }
            let actor_name = match self.resolver.resolve(row.actor) {
                Some(name) => name,
                None => continue,
            };

            let mut item = ActivityItem::new(ActivityKind::Comment, row.timestamp, actor_name);
            item.id = row.id;
            item.target = row.page_title;
            item.namespace = row.namespace;
            item.summary_text = self.fix_comment(&row.text);
            self.record(item);
            kept += 1;
        }
        debug!(fetched, kept, "fetched comment rows");
    }

    /// Fetch recent relationship changes. Rows where either end of the
    /// relationship no longer resolves are dropped.
    pub fn fetch_relationships(&mut self) {
        let rows = self.store.recent_relationships(&self.filter, self.max_items);
        let fetched = rows.len();
        let mut kept = 0;

        for row in rows {
            let actor_name = match self.resolver.resolve(row.actor) {
                Some(name) => name,
                None => continue,
            };
            let other_name = match self.resolver.resolve(row.other) {
                Some(name) => name,
                None => continue,
            };

            let kind = match row.kind {
                RelationshipKind::Friend => ActivityKind::Friend,
                RelationshipKind::Foe => ActivityKind::Foe,
            };
            let mut item = ActivityItem::new(kind, row.timestamp, actor_name);
            item.id = row.id;
            item.target = other_name;
            self.record(item);
            kept += 1;
        }
        debug!(fetched, kept, "fetched relationship rows");
    }

    /// Fetch recently sent public board messages. Non-public rows and rows
    /// whose sender or recipient no longer resolves are dropped.
    pub fn fetch_messages_sent(&mut self) {
        let rows = self.store.recent_board_messages(&self.filter, self.max_items);
        let fetched = rows.len();
        let mut kept = 0;

        for row in rows {
            if !row.public {
                continue;
            }
            let sender_name = match self.resolver.resolve(row.sender) {
                Some(name) => name,
                None => continue,
            };
            let recipient_name = match self.resolver.resolve(row.recipient) {
                Some(name) => name,
                None => continue,
            };

            let mut item =
                ActivityItem::new(ActivityKind::UserMessage, row.timestamp, sender_name);
            item.id = row.id;
            item.target = recipient_name;
            item.summary_text = self.fix_comment(&row.body);
            self.record(item);
            kept += 1;
        }
        debug!(fetched, kept, "fetched board message rows");
    }

    /// Fetch recent system messages.
    ///
    /// Level-up messages carry pre-approved markup and are only truncated,
    /// never escaped; everything else is escaped first and then truncated.
    pub fn fetch_system_messages(&mut self) {
        let rows = self.store.recent_system_messages(&self.filter, self.max_items);
        let fetched = rows.len();
        let mut kept = 0;

        for row in rows {
            let actor_name = match self.resolver.resolve(row.actor) {
                Some(name) => name,
                None => continue,
            };

            let summary_text = match row.kind {
                SystemMessageKind::LevelUp => self
                    .shaper
                    .truncate_visual(&row.body, COMMENT_PREVIEW_CHARS),
                SystemMessageKind::Notice => self
                    .shaper
                    .truncate_visual(&self.shaper.escape(&row.body), COMMENT_PREVIEW_CHARS),
            };

            let mut item =
                ActivityItem::new(ActivityKind::SystemMessage, row.timestamp, actor_name);
            item.id = row.id;
            item.summary_text = summary_text;
            self.record(item);
            kept += 1;
        }
        debug!(fetched, kept, "fetched system message rows");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feed::memory::MemoryStore;
    use crate::core::feed::render::DefaultShaper;
    use crate::core::feed::sources::{
        ActorId, BoardMessageRow, CommentRow, EditRow, RelationshipRow, SystemMessageRow,
    };
    use std::collections::HashMap;

    struct Names(HashMap<u64, &'static str>);

    impl Names {
        fn new(entries: &[(u64, &'static str)]) -> Self {
            Self(entries.iter().copied().collect())
        }
    }

    impl ActorResolver for Names {
        fn resolve(&self, actor: ActorId) -> Option<String> {
            self.0.get(&actor.0).map(|name| name.to_string())
        }
    }

    fn edit_row(id: u64, timestamp: i64, actor: u64, title: &str) -> EditRow {
        EditRow {
            id,
            timestamp,
            actor: ActorId(actor),
            title: title.to_string(),
            namespace: 0,
            comment: String::new(),
            minor: false,
            new_page: false,
            log_only: false,
        }
    }

    fn fetcher<'a>(
        store: &'a MemoryStore,
        resolver: &'a Names,
        shaper: &'a DefaultShaper,
    ) -> Fetcher<'a> {
        Fetcher::new(store, resolver, shaper, ActorFilter::Any, 10, None)
    }

    #[test]
    fn test_fetch_edits_normalizes_and_groups() {
        let mut store = MemoryStore::default();
        store.edits.push(edit_row(2, 100, 1, "PageA"));
        store.edits.push(edit_row(1, 90, 1, "PageA"));
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_edits();

        assert_eq!(fetcher.items.len(), 2);
        assert_eq!(fetcher.items[0].kind, ActivityKind::Edit);
        assert_eq!(fetcher.items[0].id, 0);
        assert_eq!(fetcher.items[0].actor_name, "Alice");
        assert_eq!(fetcher.items[0].target, "PageA");

        let groups = fetcher.grouped.groups(ActivityKind::Edit).unwrap();
        assert_eq!(groups["PageA"].last_timestamp, 100);
        assert_eq!(groups["PageA"].actions_by_actor["Alice"].len(), 2);
    }

    #[test]
    fn test_fetch_edits_skips_invalid_rows() {
        let mut store = MemoryStore::default();
        let mut special = edit_row(3, 100, 1, "RecentChanges");
        special.namespace = -1;
        store.edits.push(special);
        let mut log_row = edit_row(2, 95, 1, "Vandal");
        log_row.log_only = true;
        store.edits.push(log_row);
        store.edits.push(edit_row(1, 90, 1, "PageA"));
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_edits();

        assert_eq!(fetcher.items.len(), 1);
        assert_eq!(fetcher.items[0].target, "PageA");
    }

    #[test]
    fn test_unresolved_actor_drops_row_only() {
        let mut store = MemoryStore::default();
        store.edits.push(edit_row(2, 100, 9, "PageA"));
        store.edits.push(edit_row(1, 90, 1, "PageB"));
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_edits();

        assert_eq!(fetcher.items.len(), 1);
        assert_eq!(fetcher.items[0].target, "PageB");
    }

    #[test]
    fn test_comment_preview_truncates_then_escapes() {
        let mut store = MemoryStore::default();
        store.comments.push(CommentRow {
            id: 1,
            timestamp: 100,
            actor: ActorId(1),
            page_title: "PageA".to_string(),
            namespace: 0,
            text: "<".repeat(200),
            score: 0,
        });
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_comments();

        let text = &fetcher.items[0].summary_text;
        // 74 escaped brackets plus the ellipsis: the budget was applied to
        // visible characters, before entity encoding.
        assert_eq!(text.matches("&lt;").count(), 74);
        assert!(text.ends_with('\u{2026}'));
    }

    #[test]
    fn test_comment_score_filter() {
        let mut store = MemoryStore::default();
        for (id, score) in [(1u64, 2u32), (2, 5), (3, 10)] {
            store.comments.push(CommentRow {
                id,
                timestamp: 100 + id as i64,
                actor: ActorId(1),
                page_title: format!("Page{}", id),
                namespace: 0,
                text: "hi".to_string(),
                score,
            });
        }
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = Fetcher::new(&store, &resolver, &shaper, ActorFilter::Any, 10, Some(4));
        fetcher.fetch_comments();

        // Only rows scoring above the threshold survive, newest id first.
        let targets: Vec<&str> = fetcher.items.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, ["Page3", "Page2"]);
    }

    #[test]
    fn test_relationships_group_by_recipient() {
        let mut store = MemoryStore::default();
        store.relationships.push(RelationshipRow {
            id: 1,
            timestamp: 100,
            actor: ActorId(1),
            other: ActorId(2),
            kind: RelationshipKind::Friend,
        });
        store.relationships.push(RelationshipRow {
            id: 2,
            timestamp: 110,
            actor: ActorId(1),
            other: ActorId(3),
            kind: RelationshipKind::Foe,
        });
        let resolver = Names::new(&[(1, "Alice"), (2, "Bob"), (3, "Mallory")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_relationships();

        assert_eq!(fetcher.items.len(), 2);
        let friends = fetcher.grouped.groups(ActivityKind::Friend).unwrap();
        assert!(friends.contains_key("Bob"));
        let foes = fetcher.grouped.groups(ActivityKind::Foe).unwrap();
        assert!(foes.contains_key("Mallory"));
    }

    #[test]
    fn test_relationship_with_unresolvable_end_is_dropped() {
        let mut store = MemoryStore::default();
        store.relationships.push(RelationshipRow {
            id: 1,
            timestamp: 100,
            actor: ActorId(1),
            other: ActorId(99),
            kind: RelationshipKind::Friend,
        });
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_relationships();
        assert!(fetcher.items.is_empty());
    }

    #[test]
    fn test_private_messages_never_surface() {
        let mut store = MemoryStore::default();
        store.board_messages.push(BoardMessageRow {
            id: 1,
            timestamp: 100,
            sender: ActorId(1),
            recipient: ActorId(2),
            body: "psst".to_string(),
            public: false,
        });
        store.board_messages.push(BoardMessageRow {
            id: 2,
            timestamp: 110,
            sender: ActorId(1),
            recipient: ActorId(2),
            body: "hello".to_string(),
            public: true,
        });
        let resolver = Names::new(&[(1, "Alice"), (2, "Bob")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_messages_sent();

        assert_eq!(fetcher.items.len(), 1);
        assert_eq!(fetcher.items[0].summary_text, "hello");
        assert_eq!(fetcher.items[0].target, "Bob");
        assert_eq!(fetcher.items[0].actor_name, "Alice");
    }

    #[test]
    fn test_level_up_keeps_markup() {
        let mut store = MemoryStore::default();
        store.system_messages.push(SystemMessageRow {
            id: 1,
            timestamp: 100,
            actor: ActorId(1),
            kind: SystemMessageKind::LevelUp,
            body: format!("advanced to <span>level 5</span>{}", "!".repeat(200)),
        });
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_system_messages();

        let text = &fetcher.items[0].summary_text;
        assert!(text.starts_with("advanced to <span>level 5</span>"));
        assert_eq!(text.chars().count(), 75);
    }

    #[test]
    fn test_plain_system_message_is_escaped_then_truncated() {
        let mut store = MemoryStore::default();
        store.system_messages.push(SystemMessageRow {
            id: 1,
            timestamp: 100,
            actor: ActorId(1),
            kind: SystemMessageKind::Notice,
            body: "<".repeat(200),
        });
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_system_messages();

        let text = &fetcher.items[0].summary_text;
        assert!(text.starts_with("&lt;"));
        // The budget applies to the escaped form here, unlike level-ups.
        assert_eq!(text.chars().count(), 75);
    }

    #[test]
    fn test_system_messages_are_not_grouped() {
        let mut store = MemoryStore::default();
        store.system_messages.push(SystemMessageRow {
            id: 1,
            timestamp: 100,
            actor: ActorId(1),
            kind: SystemMessageKind::Notice,
            body: "notice".to_string(),
        });
        let resolver = Names::new(&[(1, "Alice")]);
        let shaper = DefaultShaper;

        let mut fetcher = fetcher(&store, &resolver, &shaper);
        fetcher.fetch_system_messages();

        assert_eq!(fetcher.items.len(), 1);
        assert!(fetcher.grouped.groups(ActivityKind::SystemMessage).is_none());
    }
}
