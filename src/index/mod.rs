//! Yodelr Index Structures
//!
//! Provides the lookup paths behind every query:
//!
//! - **CompositeIndex**: user / topic / timestamp → post handle mappings
//! - **TimeIndex**: ordered timestamp bindings for O(log n + k) window scans
//! - **PostingList**: per-key handle lists, newest on top
//! - **PriorityContainer**: stack, queue or heap extraction order
//! - **Topic extraction** and **trend ranking**
//!
//! # Architecture
//!
//! ```text
//! Query: "trending topics between ts=0 and ts=9"
//!        ↓
//! TimeIndex: bindings in [0, 9] → [(4, h0), (6, h1), (8, h2)]
//!        ↓
//! PostStore: drop tombstoned handles → [post0, post1, post2]
//!        ↓
//! count_topics → {post: 2, topic: 2, full: 1}
//!        ↓
//! rank (max-heap) → [post, topic, full]
//! ```

mod composite;
mod container;
mod posting;
mod time_index;
mod topic;
mod trending;

pub use composite::CompositeIndex;
pub use container::{ContainerKind, Iter, PriorityContainer};
pub use posting::PostingList;
pub use time_index::{TimeIndex, TimestampPolicy};
pub use topic::extract_topics;
pub use trending::{count_topics, rank, rank_entries, TrendEntry};

use serde::Serialize;

/// Statistics about index usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of registered users
    pub users: usize,
    /// Number of topic keys (including keys whose posts are all deleted)
    pub topics: usize,
    /// Number of distinct timestamps bound
    pub timestamps: usize,
    /// Slots allocated in the post store
    pub posts_total: usize,
    /// Posts not tombstoned
    pub posts_live: usize,
    /// Tombstoned slots
    pub tombstones: usize,
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Users: {}, Topics: {}, Timestamps: {}, Posts: {} live / {} total, Tombstones: {}",
            self.users,
            self.topics,
            self.timestamps,
            self.posts_live,
            self.posts_total,
            self.tombstones
        )
    }
}
