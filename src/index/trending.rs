//! Trend Ranker - topic frequency ranking
//!
//! Counts how many live posts in a window carry each topic, then drains a
//! max-heap so the output is ordered by:
//!
//! 1. count, descending
//! 2. topic name, ascending (byte order) on equal counts
//!
//! This order is total, so ties of any size come out the same way every time.

use crate::index::container::{ContainerKind, PriorityContainer};
use crate::storage::{Post, Topic};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A topic with its occurrence count in a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendEntry {
    pub topic: Topic,
    pub count: usize,
}

impl TrendEntry {
    pub fn new(topic: impl Into<Topic>, count: usize) -> Self {
        Self {
            topic: topic.into(),
            count,
        }
    }
}

/// Heap priority: higher count wins, then the lexicographically smaller topic
impl Ord for TrendEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.topic.cmp(&self.topic))
    }
}

impl PartialOrd for TrendEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Count topic occurrences across posts
///
/// Each post contributes at most one occurrence per topic, since its topic
/// list is already deduplicated at extraction time.
pub fn count_topics<'a, I>(posts: I) -> HashMap<Topic, usize>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut counts: HashMap<Topic, usize> = HashMap::new();
    for post in posts {
        for topic in &post.topics {
            *counts.entry(topic.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Rank topic counts, keeping the counts
///
/// O(n log n) for n distinct topics.
pub fn rank_entries(counts: HashMap<Topic, usize>) -> Vec<TrendEntry> {
    let mut heap = PriorityContainer::with_capacity(ContainerKind::Heap, counts.len());
    heap.extend(
        counts
            .into_iter()
            .map(|(topic, count)| TrendEntry { topic, count }),
    );

    let mut ranked = Vec::with_capacity(heap.len());
    while let Some(entry) = heap.extract_top() {
        ranked.push(entry);
    }
    ranked
}

/// Rank topic counts into topic names
pub fn rank(counts: HashMap<Topic, usize>) -> Vec<Topic> {
    rank_entries(counts)
        .into_iter()
        .map(|entry| entry.topic)
        .collect()
}
