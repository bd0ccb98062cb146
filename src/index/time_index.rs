//! Time Index - ordered timestamp → post bindings
//!
//! Uses a `BTreeMap` so window queries only touch timestamps that actually
//! carry posts.
//!
//! # Performance
//! - Bind: O(log n)
//! - Range query: O(log n + k) where k = results
//!
//! # Collisions
//! Posts are not required to have distinct timestamps. Under
//! `TimestampPolicy::LastWriterWins` a later post replaces the earlier binding
//! (the earlier post stays reachable through the user and topic indexes).
//! Under `TimestampPolicy::KeepAll` every post is kept, in insertion order.

use crate::storage::{PostHandle, TimeRange, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What happens when two posts share a timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// The latest post replaces the existing binding
    #[default]
    LastWriterWins,
    /// Every post is bound, in insertion order
    KeepAll,
}

impl std::str::FromStr for TimestampPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last_writer_wins" | "last-writer-wins" | "overwrite" => Ok(Self::LastWriterWins),
            "keep_all" | "keep-all" | "multi" => Ok(Self::KeepAll),
            other => Err(format!("unknown timestamp policy: {}", other)),
        }
    }
}

impl std::fmt::Display for TimestampPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampPolicy::LastWriterWins => write!(f, "last_writer_wins"),
            TimestampPolicy::KeepAll => write!(f, "keep_all"),
        }
    }
}

/// Ordered timestamp index
#[derive(Debug, Default)]
pub struct TimeIndex {
    /// timestamp → bound handles (exactly one under `LastWriterWins`)
    entries: BTreeMap<Timestamp, Vec<PostHandle>>,
    policy: TimestampPolicy,
}

impl TimeIndex {
    pub fn new(policy: TimestampPolicy) -> Self {
        Self {
            entries: BTreeMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> TimestampPolicy {
        self.policy
    }

    /// Bind a post to a timestamp
    ///
    /// Returns the handle previously bound at `timestamp`, if any: the
    /// displaced post under `LastWriterWins`, the co-resident one under
    /// `KeepAll`.
    pub fn bind(&mut self, timestamp: Timestamp, handle: PostHandle) -> Option<PostHandle> {
        let bound = self.entries.entry(timestamp).or_default();
        let previous = bound.last().copied();

        match self.policy {
            TimestampPolicy::LastWriterWins => {
                bound.clear();
                bound.push(handle);
            }
            TimestampPolicy::KeepAll => bound.push(handle),
        }

        previous
    }

    /// All bindings in an inclusive window, ascending by timestamp
    ///
    /// Handles sharing a timestamp come out in insertion order.
    pub fn range(&self, range: TimeRange) -> impl Iterator<Item = (Timestamp, PostHandle)> + '_ {
        self.entries
            .range(range.start..=range.end)
            .flat_map(|(&ts, handles)| handles.iter().map(move |&h| (ts, h)))
    }

    /// Number of distinct timestamps bound
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest and largest bound timestamps
    pub fn time_bounds(&self) -> Option<(Timestamp, Timestamp)> {
        let first = self.entries.keys().next()?;
        let last = self.entries.keys().next_back()?;
        Some((*first, *last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(i: u64) -> PostHandle {
        PostHandle::new(i)
    }

    fn bound_at(index: &TimeIndex, timestamp: Timestamp) -> &[PostHandle] {
        index.entries.get(&timestamp).map(Vec::as_slice).unwrap_or_default()
    }

    #[test]
    fn test_bind_and_get() {
        let mut index = TimeIndex::default();

        assert_eq!(index.bind(4, h(0)), None);
        assert_eq!(index.bind(6, h(1)), None);

        assert_eq!(bound_at(&index, 4), &[h(0)]);
        assert_eq!(bound_at(&index, 6), &[h(1)]);
        assert!(bound_at(&index, 5).is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut index = TimeIndex::new(TimestampPolicy::LastWriterWins);

        index.bind(1, h(0));
        assert_eq!(index.bind(1, h(1)), Some(h(0)));

        assert_eq!(bound_at(&index, 1), &[h(1)]);
        assert_eq!(index.range(TimeRange::new(0, 9)).count(), 1);
    }

    #[test]
    fn test_keep_all() {
        let mut index = TimeIndex::new(TimestampPolicy::KeepAll);

        index.bind(1, h(0));
        assert_eq!(index.bind(1, h(1)), Some(h(0)));
        index.bind(0, h(2));

        let bindings: Vec<_> = index.range(TimeRange::new(0, 1)).collect();
        assert_eq!(bindings, vec![(0, h(2)), (1, h(0)), (1, h(1))]);
    }

    #[test]
    fn test_range_inclusive_and_ordered() {
        let mut index = TimeIndex::default();
        for (i, ts) in [175, 1, 12, 30, 20].into_iter().enumerate() {
            index.bind(ts, h(i as u64));
        }

        let stamps: Vec<Timestamp> = index.range(TimeRange::new(12, 30)).map(|(ts, _)| ts).collect();
        assert_eq!(stamps, vec![12, 20, 30]);

        // Inverted bounds are normalized by TimeRange
        let inverted: Vec<Timestamp> = index.range(TimeRange::new(30, 12)).map(|(ts, _)| ts).collect();
        assert_eq!(inverted, stamps);
    }

    #[test]
    fn test_range_matches_linear_scan() {
        let mut index = TimeIndex::default();
        let stamps = [-5, 0, 3, 4, 8, 9, 15];
        for (i, &ts) in stamps.iter().enumerate() {
            index.bind(ts, h(i as u64));
        }

        for from in -7..17 {
            for to in -7..17 {
                let range = TimeRange::new(from, to);
                let fast: Vec<_> = index.range(range).collect();
                let linear: Vec<_> = (range.start..=range.end)
                    .flat_map(|ts| bound_at(&index, ts).iter().map(move |&handle| (ts, handle)))
                    .collect();
                assert_eq!(fast, linear, "window {}..={}", from, to);
            }
        }
    }

    #[test]
    fn test_extreme_timestamps() {
        let mut index = TimeIndex::default();
        index.bind(Timestamp::MIN, h(0));
        index.bind(Timestamp::MAX, h(1));

        assert_eq!(index.range(TimeRange::new(Timestamp::MIN, Timestamp::MAX)).count(), 2);
        assert_eq!(index.time_bounds(), Some((Timestamp::MIN, Timestamp::MAX)));
    }

    #[test]
    fn test_time_bounds_empty() {
        let index = TimeIndex::default();
        assert!(index.is_empty());
        assert!(index.time_bounds().is_none());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("keep_all".parse::<TimestampPolicy>().unwrap(), TimestampPolicy::KeepAll);
        assert_eq!(
            "Last_Writer_Wins".parse::<TimestampPolicy>().unwrap(),
            TimestampPolicy::LastWriterWins
        );
        assert!("sometimes".parse::<TimestampPolicy>().is_err());
        assert_eq!(TimestampPolicy::KeepAll.to_string(), "keep_all");
    }
}
