//! Aggregation run coordinator
//!
//! One [`ActivityFeed`] value is one aggregation run for one subject: it
//! resolves the viewer's filter into an actor predicate, drives the enabled
//! source fetchers, and exposes the two outputs — the flat chronological
//! item list and the grouped summary lines. All intermediate state lives and
//! dies inside the call.

use super::fetcher::Fetcher;
use super::render::{NarrativeRenderer, TextShaper};
use super::sources::{ActivityStore, ActorFilter, ActorId, ActorResolver, RelationshipLookup};
use super::summary_line::{summarize, RECENCY_WINDOW_SECS};
use super::types::{ActivityItem, GroupedActivity, SummaryLine};
use crate::config::{FeedConfig, FilterMode};
use chrono::Utc;
use std::cmp::Reverse;
use tracing::debug;

/// One aggregation run for one subject's feed.
pub struct ActivityFeed<'a> {
    config: FeedConfig,
    /// Explicitly optional: an absent subject disables actor-based
    /// restriction entirely, leaving only the per-source cap.
    subject: Option<ActorId>,
    now: i64,
    store: &'a dyn ActivityStore,
    resolver: &'a dyn ActorResolver,
    relationships: &'a dyn RelationshipLookup,
    shaper: &'a dyn TextShaper,
    renderer: &'a dyn NarrativeRenderer,
}

impl<'a> ActivityFeed<'a> {
    pub fn new(
        config: FeedConfig,
        subject: Option<ActorId>,
        store: &'a dyn ActivityStore,
        resolver: &'a dyn ActorResolver,
        relationships: &'a dyn RelationshipLookup,
        shaper: &'a dyn TextShaper,
        renderer: &'a dyn NarrativeRenderer,
    ) -> Self {
        Self {
            config,
            subject,
            now: Utc::now().timestamp(),
            store,
            resolver,
            relationships,
            shaper,
            renderer,
        }
    }

    /// Pin "now" to a specific epoch second instead of the wall clock.
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    /// Oldest `last_timestamp` a target group may have and still be
    /// summarized.
    pub fn cutoff(&self) -> i64 {
        self.now - RECENCY_WINDOW_SECS
    }

    /// Resolve the configured filter mode into an actor predicate.
    fn resolve_filter(&self) -> ActorFilter {
        match (self.config.filter, self.subject) {
            (FilterMode::SelfOnly, Some(subject)) => ActorFilter::Only(subject),
            (FilterMode::Circle, Some(subject)) => ActorFilter::Among(
                self.relationships
                    .related_actors(subject, self.config.circle_kind),
            ),
            // Without a subject there is nobody to restrict around.
            (FilterMode::SelfOnly, None) | (FilterMode::Circle, None) => ActorFilter::Any,
            (FilterMode::All, _) => ActorFilter::Any,
        }
    }

    /// Run every enabled fetcher and return the accumulated state.
    fn collect(&self) -> (Vec<ActivityItem>, GroupedActivity) {
        let filter = self.resolve_filter();
        let mut fetcher = Fetcher::new(
            self.store,
            self.resolver,
            self.shaper,
            filter,
            self.config.max_items,
            self.config.min_comment_score,
        );

        if self.config.show_edits {
            fetcher.fetch_edits();
        }
        if self.config.show_comments {
            fetcher.fetch_comments();
        }
        if self.config.show_relationships {
            fetcher.fetch_relationships();
        }
        if self.config.show_system_messages {
            fetcher.fetch_system_messages();
        }
        if self.config.show_messages_sent {
            fetcher.fetch_messages_sent();
        }

        debug!(items = fetcher.items.len(), "collected activity items");
        (fetcher.items, fetcher.grouped)
    }

    /// The flat activity feed: every normalized item from every enabled
    /// source, sorted descending by timestamp. Cap-only; the recency window
    /// applies to the grouped path, not here.
    pub fn activity_list(&self) -> Vec<ActivityItem> {
        let (mut items, _) = self.collect();
        items.sort_by_key(|item| Reverse(item.timestamp));
        items
    }

    /// The grouped feed: compact summary lines, sorted descending by
    /// timestamp.
    pub fn summary_lines(&self) -> Vec<SummaryLine> {
        let (items, grouped) = self.collect();
        summarize(
            &grouped,
            &items,
            &self.config,
            self.cutoff(),
            self.shaper,
            self.renderer,
        )
    }
}
