//! Core data types for the Yodelr index
//!
//! This module defines the fundamental types used throughout the engine:
//! - `Post`: an immutable record authored by a user
//! - `PostHandle`: position of a post in the post store
//! - `TimeRange`: an inclusive timestamp window for trend queries

use serde::{Deserialize, Serialize};

/// Registered user name
pub type UserId = String;

/// Hashtag-derived topic, stored without the leading `#`
pub type Topic = String;

/// Caller-supplied post timestamp
pub type Timestamp = i64;

/// Default maximum post length, in characters
pub const MAX_POST_CHARS: usize = 140;

/// Opaque reference to a stored post
///
/// Handles are assigned monotonically by the post store and are never reused,
/// even after the post they point to has been tombstoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostHandle(u64);

impl PostHandle {
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    /// Slot index inside the post store
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "post#{}", self.0)
    }
}

/// A single post
///
/// Immutable once created. The text is already truncated to the configured
/// maximum and the topics were extracted from that truncated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Author of the post
    pub author: UserId,
    /// Post body
    pub text: String,
    /// Distinct topics in first-seen order
    pub topics: Vec<Topic>,
}

impl Post {
    pub fn new(author: impl Into<UserId>, text: impl Into<String>, topics: Vec<Topic>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            topics,
        }
    }
}

/// Truncate post text to at most `max_chars` characters
///
/// Counts Unicode scalar values, so multi-byte characters are never split.
pub fn truncate_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// An inclusive timestamp window
///
/// Construction normalizes the bounds, so `TimeRange::new(9, 0)` is the same
/// window as `TimeRange::new(0, 9)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// First timestamp in the window (inclusive)
    pub start: Timestamp,
    /// Last timestamp in the window (inclusive)
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(from: Timestamp, to: Timestamp) -> Self {
        Self {
            start: from.min(to),
            end: from.max(to),
        }
    }
}
