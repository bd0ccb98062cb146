//! Composite Index - coordinates the user, topic and time indexes
//!
//! Three independent key spaces point into the same `PostStore`:
//!
//! ```text
//! user      → PostingList   (every post by the user, newest on top)
//! topic     → PostingList   (every post carrying the topic, newest on top)
//! timestamp → TimeIndex     (ordered, for window queries)
//! ```
//!
//! # Deletion
//!
//! Deleting a user drops its posting list and tombstones each of its posts in
//! the store. Topic lists and timestamp bindings keep the dead handles; every
//! read path skips handles the store reports as tombstoned.

use crate::index::posting::PostingList;
use crate::index::time_index::{TimeIndex, TimestampPolicy};
use crate::index::trending::{count_topics, rank_entries, TrendEntry};
use crate::index::IndexStats;
use crate::storage::{
    Post, PostHandle, PostStore, TimeRange, Timestamp, Topic, UserId, YodelrError, YodelrResult,
};
use std::collections::HashMap;

/// The user/topic/timestamp → post handle index
#[derive(Debug, Default)]
pub struct CompositeIndex {
    /// Registered users and their posts
    users: HashMap<UserId, PostingList>,
    /// Topic keys (without `#`) and the posts carrying them
    topics: HashMap<Topic, PostingList>,
    /// Timestamp bindings
    time_index: TimeIndex,
}

impl CompositeIndex {
    pub fn new(policy: TimestampPolicy) -> Self {
        Self {
            users: HashMap::new(),
            topics: HashMap::new(),
            time_index: TimeIndex::new(policy),
        }
    }

    // ==================== Update Methods ====================

    /// Register a user with an empty post history
    ///
    /// Idempotent: an existing user keeps its posts. Returns `true` if the
    /// user was newly created.
    pub fn register_user(&mut self, user: &str) -> bool {
        if self.users.contains_key(user) {
            return false;
        }
        self.users.insert(user.to_string(), PostingList::new());
        true
    }

    /// Check if a user is registered
    pub fn is_registered(&self, user: &str) -> bool {
        self.users.contains_key(user)
    }

    /// Index a stored post under its author, topics and timestamp
    ///
    /// Returns the handle previously bound to `timestamp`, if any.
    pub fn record_post(
        &mut self,
        user: &str,
        handle: PostHandle,
        timestamp: Timestamp,
        topics: &[Topic],
    ) -> YodelrResult<Option<PostHandle>> {
        let user_posts = self
            .users
            .get_mut(user)
            .ok_or_else(|| YodelrError::UnknownUser(user.to_string()))?;
        user_posts.push(handle);

        for topic in topics {
            match self.topics.get_mut(topic) {
                Some(list) => {
                    list.push_unless_latest(handle);
                }
                None => {
                    let mut list = PostingList::new();
                    list.push(handle);
                    self.topics.insert(topic.clone(), list);
                }
            }
        }

        Ok(self.time_index.bind(timestamp, handle))
    }

    /// Remove a user and tombstone every post it owned
    ///
    /// O(number of posts owned by the user). Returns the number of posts
    /// tombstoned.
    pub fn delete_user(&mut self, user: &str, store: &mut PostStore) -> YodelrResult<usize> {
        let owned = self
            .users
            .remove(user)
            .ok_or_else(|| YodelrError::UnknownUser(user.to_string()))?;

        let mut tombstoned = 0;
        for handle in owned.newest_first() {
            if store.tombstone(handle) {
                tombstoned += 1;
            }
        }
        Ok(tombstoned)
    }

    // ==================== Query Methods ====================

    /// Live posts by a user, most recent first
    pub fn posts_for_user<'s>(&self, user: &str, store: &'s PostStore) -> YodelrResult<Vec<&'s Post>> {
        let list = self
            .users
            .get(user)
            .ok_or_else(|| YodelrError::UnknownUser(user.to_string()))?;

        Ok(Self::resolve(list, store))
    }

    /// Live posts carrying a topic, most recent first
    ///
    /// Unknown topics yield an empty list.
    pub fn posts_for_topic<'s>(&self, topic: &str, store: &'s PostStore) -> Vec<&'s Post> {
        self.topics
            .get(topic)
            .map(|list| Self::resolve(list, store))
            .unwrap_or_default()
    }

    /// Live posts in an inclusive window, ascending by timestamp
    pub fn posts_in_timestamp_range<'s>(
        &self,
        range: TimeRange,
        store: &'s PostStore,
    ) -> Vec<(Timestamp, &'s Post)> {
        self.time_index
            .range(range)
            .filter_map(|(ts, handle)| store.get(handle).map(|post| (ts, post)))
            .collect()
    }

    /// Topics ranked by how many live posts in the window carry them
    pub fn trending(&self, range: TimeRange, store: &PostStore) -> Vec<TrendEntry> {
        let window = self.posts_in_timestamp_range(range, store);
        rank_entries(count_topics(window.into_iter().map(|(_, post)| post)))
    }

    fn resolve<'s>(list: &PostingList, store: &'s PostStore) -> Vec<&'s Post> {
        list.newest_first()
            .filter_map(|handle| store.get(handle))
            .collect()
    }

    // ==================== Stats Methods ====================

    /// All indexed topic keys, sorted
    ///
    /// Includes topics whose posts have all been tombstoned.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.topics.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// All registered users, sorted
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.users.keys().cloned().collect();
        users.sort();
        users
    }

    /// Smallest and largest bound timestamps
    pub fn time_bounds(&self) -> Option<(Timestamp, Timestamp)> {
        self.time_index.time_bounds()
    }

    pub fn timestamp_policy(&self) -> TimestampPolicy {
        self.time_index.policy()
    }

    /// Get statistics about the index and its store
    pub fn stats(&self, store: &PostStore) -> IndexStats {
        IndexStats {
            users: self.users.len(),
            topics: self.topics.len(),
            timestamps: self.time_index.len(),
            posts_total: store.len(),
            posts_live: store.live_count(),
            tombstones: store.tombstone_count(),
        }
    }
}
