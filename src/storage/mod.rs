//! Yodelr Storage
//!
//! This module provides the post records and their slot arena:
//!
//! - **types**: Core data structures (Post, PostHandle, TimeRange)
//! - **post_store**: Append-only arena with tombstone slots
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   text → truncate → PostStore::append → PostHandle
//!
//! Delete Path:
//!   PostHandle → PostStore::tombstone → slot = None (handle never reused)
//! ```

pub mod error;
pub mod post_store;
pub mod types;

// Re-export commonly used types
pub use error::{YodelrError, YodelrResult};
pub use post_store::PostStore;
pub use types::{truncate_text, Post, PostHandle, TimeRange, Timestamp, Topic, UserId, MAX_POST_CHARS};
