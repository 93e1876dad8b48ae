//! Activity feed aggregation module
//!
//! This module provides functionality for:
//! - Normalizing heterogeneous source rows into canonical activity items
//! - Fetching and filtering recent activity from five event sources
//! - Merging items into one chronological flat feed
//! - Collapsing per-target groups into compact narrative summary lines

pub mod aggregate;
pub mod fetcher;
pub mod memory;
pub mod render;
pub mod sources;
pub mod summary_line;
pub mod types;

// Re-export commonly used items
pub use aggregate::ActivityFeed;
pub use memory::MemoryStore;
pub use render::{DefaultShaper, EnglishRenderer, LineArgs, NarrativeRenderer, TextShaper};
pub use sources::{
    ActivityStore, ActorFilter, ActorId, ActorResolver, RelationshipKind, RelationshipLookup,
};
pub use summary_line::{summarize, RECENCY_WINDOW_SECS, STACK_LIMIT};
pub use types::{ActivityItem, ActivityKind, GroupedActivity, SummaryLine, TargetGroup};
