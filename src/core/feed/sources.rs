//! Source rows and external collaborator traits
//!
//! Each backing source hands the engine raw rows through [`ActivityStore`].
//! Rows carry actor identifiers, not display names; resolution happens
//! through [`ActorResolver`] and failures drop the row rather than aborting
//! the fetch.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opaque actor account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

/// Kind of a relationship between two actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    #[default]
    Friend,
    Foe,
}

/// Sub-kind of a stored system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemMessageKind {
    /// Carries pre-approved markup; escaped only by truncation.
    LevelUp,
    Notice,
}

/// A recent-changes row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRow {
    pub id: u64,
    pub timestamp: i64,
    pub actor: ActorId,
    pub title: String,
    pub namespace: i32,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub minor: bool,
    #[serde(default)]
    pub new_page: bool,
    /// Log-only rows (blocks, moves, ...) are not edits and get skipped.
    #[serde(default)]
    pub log_only: bool,
}

/// A page comment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: u64,
    pub timestamp: i64,
    pub actor: ActorId,
    pub page_title: String,
    pub namespace: i32,
    #[serde(default)]
    pub text: String,
    /// Community score; consulted only when a minimum score is configured.
    #[serde(default)]
    pub score: u32,
}

/// A relationship change row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub id: u64,
    pub timestamp: i64,
    /// The actor who added the relationship.
    pub actor: ActorId,
    /// The actor on the receiving end.
    pub other: ActorId,
    pub kind: RelationshipKind,
}

/// A user board message row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMessageRow {
    pub id: u64,
    pub timestamp: i64,
    pub sender: ActorId,
    pub recipient: ActorId,
    #[serde(default)]
    pub body: String,
    /// Private messages never surface in the feed.
    #[serde(default)]
    pub public: bool,
}

/// A system message row ("User Foo advanced to level Bar" and friends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessageRow {
    pub id: u64,
    pub timestamp: i64,
    pub actor: ActorId,
    pub kind: SystemMessageKind,
    #[serde(default)]
    pub body: String,
}

/// Resolved actor restriction applied by every source.
#[derive(Debug, Clone, PartialEq)]
pub enum ActorFilter {
    /// No restriction.
    Any,
    /// Only the subject's own actions.
    Only(ActorId),
    /// Only actions by the given set. An empty set admits nothing.
    Among(HashSet<ActorId>),
}

impl ActorFilter {
    pub fn admits(&self, actor: ActorId) -> bool {
        match self {
            ActorFilter::Any => true,
            ActorFilter::Only(subject) => actor == *subject,
            ActorFilter::Among(set) => set.contains(&actor),
        }
    }
}

/// Read access to the backing event sources.
///
/// Contract for every method: rows come back most-recent-first (descending
/// source id), at most `max_items` of them, already restricted to actors the
/// filter admits. A deployment that lacks a source simply keeps the default
/// body, which reports no rows.
pub trait ActivityStore {
    fn recent_edits(&self, _filter: &ActorFilter, _max_items: usize) -> Vec<EditRow> {
        Vec::new()
    }

    fn recent_comments(&self, _filter: &ActorFilter, _max_items: usize) -> Vec<CommentRow> {
        Vec::new()
    }

    fn recent_relationships(
        &self,
        _filter: &ActorFilter,
        _max_items: usize,
    ) -> Vec<RelationshipRow> {
        Vec::new()
    }

    fn recent_board_messages(
        &self,
        _filter: &ActorFilter,
        _max_items: usize,
    ) -> Vec<BoardMessageRow> {
        Vec::new()
    }

    fn recent_system_messages(
        &self,
        _filter: &ActorFilter,
        _max_items: usize,
    ) -> Vec<SystemMessageRow> {
        Vec::new()
    }
}

/// Maps actor identifiers to display names.
pub trait ActorResolver {
    /// `None` means the account no longer resolves; the row is dropped.
    fn resolve(&self, actor: ActorId) -> Option<String>;
}

/// Looks up the subject's relationship circle, for `Circle` filtering.
pub trait RelationshipLookup {
    fn related_actors(&self, subject: ActorId, kind: RelationshipKind) -> HashSet<ActorId>;
}
