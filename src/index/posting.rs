//! Posting List - post handles for one user or topic key
//!
//! Backed by a stack-ordered `PriorityContainer`, so the top is always the
//! most recently recorded handle and iteration is newest first.

use crate::index::container::{ContainerKind, PriorityContainer};
use crate::storage::PostHandle;

/// Handles recorded under a single key, newest on top
#[derive(Debug, Clone)]
pub struct PostingList {
    handles: PriorityContainer<PostHandle>,
}

impl Default for PostingList {
    fn default() -> Self {
        Self::new()
    }
}

impl PostingList {
    pub fn new() -> Self {
        Self {
            handles: PriorityContainer::new(ContainerKind::Stack),
        }
    }

    /// Record a handle
    pub fn push(&mut self, handle: PostHandle) {
        self.handles.insert(handle);
    }

    /// Record a handle unless it is already the most recent one
    ///
    /// Only the top of the list is compared, not full membership. Returns
    /// `true` if the handle was recorded.
    pub fn push_unless_latest(&mut self, handle: PostHandle) -> bool {
        if self.latest() == Some(handle) {
            return false;
        }
        self.push(handle);
        true
    }

    /// Most recently recorded handle
    pub fn latest(&self) -> Option<PostHandle> {
        self.handles.peek_top().copied()
    }

    /// Handles, most recently recorded first
    pub fn newest_first(&self) -> impl Iterator<Item = PostHandle> + '_ {
        self.handles.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
