//! In-memory activity store with JSONL loading
//!
//! [`MemoryStore`] backs the engine's tests and small deployments: rows live
//! in plain vectors and can be loaded from a JSONL file where each line is
//! one tagged row. Malformed lines are skipped, not fatal, and an absent
//! file just yields an empty store.

use super::sources::{
    ActivityStore, ActorFilter, BoardMessageRow, CommentRow, EditRow, RelationshipRow,
    SystemMessageRow,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// One line of a JSONL activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ActivityRecord {
    Edit(EditRow),
    Comment(CommentRow),
    Relationship(RelationshipRow),
    BoardMessage(BoardMessageRow),
    SystemMessage(SystemMessageRow),
}

/// Vector-backed [`ActivityStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub edits: Vec<EditRow>,
    pub comments: Vec<CommentRow>,
    pub relationships: Vec<RelationshipRow>,
    pub board_messages: Vec<BoardMessageRow>,
    pub system_messages: Vec<SystemMessageRow>,
}

impl MemoryStore {
    /// Load a store from a JSONL file, one [`ActivityRecord`] per line.
    ///
    /// An absent file yields an empty store; blank and unparsable lines are
    /// skipped with a warning.
    pub fn from_jsonl_path(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        let mut store = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ActivityRecord>(line) {
                Ok(record) => store.push(record),
                Err(err) => warn!(%err, "skipping unparsable activity record"),
            }
        }
        store
    }

    pub fn push(&mut self, record: ActivityRecord) {
        match record {
            ActivityRecord::Edit(row) => self.edits.push(row),
            ActivityRecord::Comment(row) => self.comments.push(row),
            ActivityRecord::Relationship(row) => self.relationships.push(row),
            ActivityRecord::BoardMessage(row) => self.board_messages.push(row),
            ActivityRecord::SystemMessage(row) => self.system_messages.push(row),
        }
    }
}

/// Filter, order descending by source id, cap. Shared by every source.
fn select<R: Clone>(
    rows: &[R],
    admits: impl Fn(&R) -> bool,
    id: impl Fn(&R) -> u64,
    max_items: usize,
) -> Vec<R> {
    let mut out: Vec<R> = rows.iter().filter(|&row| admits(row)).cloned().collect();
    out.sort_by_key(|row| std::cmp::Reverse(id(row)));
    out.truncate(max_items);
    out
}

impl ActivityStore for MemoryStore {
    fn recent_edits(&self, filter: &ActorFilter, max_items: usize) -> Vec<EditRow> {
        select(&self.edits, |r| filter.admits(r.actor), |r| r.id, max_items)
    }

    fn recent_comments(&self, filter: &ActorFilter, max_items: usize) -> Vec<CommentRow> {
        select(
            &self.comments,
            |r| filter.admits(r.actor),
            |r| r.id,
            max_items,
        )
    }

    fn recent_relationships(&self, filter: &ActorFilter, max_items: usize) -> Vec<RelationshipRow> {
        select(
            &self.relationships,
            |r| filter.admits(r.actor),
            |r| r.id,
            max_items,
        )
    }

    fn recent_board_messages(&self, filter: &ActorFilter, max_items: usize) -> Vec<BoardMessageRow> {
        select(
            &self.board_messages,
            |r| filter.admits(r.sender),
            |r| r.id,
            max_items,
        )
    }

    fn recent_system_messages(
        &self,
        filter: &ActorFilter,
        max_items: usize,
    ) -> Vec<SystemMessageRow> {
        select(
            &self.system_messages,
            |r| filter.admits(r.actor),
            |r| r.id,
            max_items,
        )
    }
}
