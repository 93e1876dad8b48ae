//! Feedline - user activity aggregation and summary line engine
//!
//! Feedline pulls a subject's recent activity (page edits, comments,
//! relationship changes, sent board messages and system notices) from
//! independent event sources, merges it into one chronological feed, and
//! compresses that feed into compact narrative summary lines by grouping
//! repeated actions on the same target.
//!
//! Backing storage, actor identity resolution and localized rendering are
//! external collaborators behind narrow traits; the crate itself owns only
//! the normalization, merging, grouping and stacking logic.

pub mod config;
pub mod core;

pub use config::{ConfigLoader, FeedConfig, FilterMode};
pub use core::feed::aggregate::ActivityFeed;
pub use core::feed::memory::MemoryStore;
pub use core::feed::render::{
    DefaultShaper, EnglishRenderer, LineArgs, NarrativeRenderer, TextShaper,
};
pub use core::feed::sources::{
    ActivityStore, ActorFilter, ActorId, ActorResolver, RelationshipKind, RelationshipLookup,
};
pub use core::feed::types::{
    ActivityItem, ActivityKind, GroupedActivity, SummaryLine, TargetGroup,
};
