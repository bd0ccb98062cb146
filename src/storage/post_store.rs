//! Post Store - append-only slot arena with soft delete
//!
//! Posts live in a `Vec<Option<Post>>` addressed by `PostHandle`. Deleting a
//! post replaces its slot with `None` (a tombstone); the slot stays allocated
//! so handles held by the topic index remain valid keys and are filtered
//! lazily at read time.
//!
//! # Performance
//! - Append: O(1) amortized
//! - Tombstone: O(1)
//! - Read: O(1)

use crate::storage::error::{YodelrError, YodelrResult};
use crate::storage::types::{truncate_text, Post, PostHandle, Topic, MAX_POST_CHARS};

/// Arena of posts with tombstone slots
#[derive(Debug)]
pub struct PostStore {
    /// Slot per handle; `None` once tombstoned
    slots: Vec<Option<Post>>,
    /// Number of non-tombstoned slots
    live: usize,
    /// Maximum post length in characters
    max_chars: usize,
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new(MAX_POST_CHARS)
    }
}

impl PostStore {
    pub fn new(max_chars: usize) -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            max_chars,
        }
    }

    /// Maximum post length in characters
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Store a new post at the next free handle
    ///
    /// Text over the length limit is truncated before storage. Callers should
    /// extract `topics` from the already truncated text.
    pub fn append(&mut self, author: &str, text: &str, topics: Vec<Topic>) -> PostHandle {
        let handle = PostHandle::new(self.slots.len() as u64);
        let text = truncate_text(text, self.max_chars);

        self.slots.push(Some(Post::new(author, text, topics)));
        self.live += 1;

        handle
    }

    /// Mark a post as deleted
    ///
    /// Returns `true` if the slot was live. Tombstoning twice is a no-op.
    pub fn tombstone(&mut self, handle: PostHandle) -> bool {
        match self.slots.get_mut(handle.index()) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    /// Read a live post
    pub fn read(&self, handle: PostHandle) -> YodelrResult<&Post> {
        self.get(handle).ok_or(YodelrError::PostNotFound(handle))
    }

    /// Read a live post, `None` for tombstoned or unknown handles
    pub fn get(&self, handle: PostHandle) -> Option<&Post> {
        self.slots.get(handle.index()).and_then(Option::as_ref)
    }

    /// Check if a handle points to a live post
    pub fn is_live(&self, handle: PostHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Total number of allocated slots (live + tombstoned)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of live posts
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of tombstoned slots
    pub fn tombstone_count(&self) -> usize {
        self.slots.len() - self.live
    }
}
