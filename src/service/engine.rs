//! Yodelr Engine
//!
//! The service facade orchestrates all components:
//! - Write path: check user → truncate → extract topics → PostStore → CompositeIndex
//! - Read path: CompositeIndex → PostStore (tombstones skipped) → text
//!
//! The post store and the index are one shared resource behind a single
//! `RwLock`: mutations take the write lock, queries the read lock. A query
//! racing `delete_user` therefore sees all of the user's posts or none.

use crate::config::IndexConfig;
use crate::index::{extract_topics, CompositeIndex, IndexStats, TrendEntry};
use crate::service::events::{EventSink, IndexEvent, TracingSink};
use crate::storage::{
    truncate_text, PostStore, TimeRange, Timestamp, Topic, YodelrError, YodelrResult,
};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The micro-blogging service interface
///
/// Adding and deleting users, adding and retrieving posts, and ranking
/// trending topics.
pub trait Yodelr {
    /// Register a user; registering an existing user is a no-op
    fn add_user(&self, user: &str) -> YodelrResult<()>;

    /// Store a post for a registered user
    fn add_post(&self, user: &str, text: &str, timestamp: Timestamp) -> YodelrResult<()>;

    /// Remove a user and all of its posts
    fn delete_user(&self, user: &str) -> YodelrResult<()>;

    /// Post texts by a user, most recent first
    fn get_posts_for_user(&self, user: &str) -> YodelrResult<Vec<String>>;

    /// Post texts carrying a topic (given without `#`), most recent first
    fn get_posts_for_topic(&self, topic: &str) -> YodelrResult<Vec<String>>;

    /// Topics in the inclusive window, by count desc then name asc
    fn get_trending_topics(&self, from: Timestamp, to: Timestamp) -> YodelrResult<Vec<String>>;
}

/// Post store and index, always locked together
#[derive(Debug)]
struct IndexState {
    store: PostStore,
    index: CompositeIndex,
}

/// In-memory implementation of `Yodelr`
pub struct YodelrEngine {
    state: RwLock<IndexState>,
    sink: Arc<dyn EventSink>,
}

impl Default for YodelrEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl YodelrEngine {
    /// Create an engine with default settings, reporting events to `tracing`
    pub fn new() -> Self {
        Self::with_config(&IndexConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: &IndexConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Create with custom configuration and event sink
    pub fn with_sink(config: &IndexConfig, sink: Arc<dyn EventSink>) -> Self {
        tracing::debug!(
            max_post_chars = config.max_post_chars,
            timestamp_policy = %config.timestamp_policy,
            "Creating Yodelr engine"
        );

        Self {
            state: RwLock::new(IndexState {
                store: PostStore::new(config.max_post_chars),
                index: CompositeIndex::new(config.timestamp_policy),
            }),
            sink,
        }
    }

    fn read(&self) -> YodelrResult<RwLockReadGuard<'_, IndexState>> {
        Ok(self.state.read()?)
    }

    fn write(&self) -> YodelrResult<RwLockWriteGuard<'_, IndexState>> {
        Ok(self.state.write()?)
    }

    fn unknown_user(&self, operation: &str, user: &str) -> YodelrError {
        self.sink.record(&IndexEvent::UnknownUser {
            operation: operation.to_string(),
            user: user.to_string(),
        });
        YodelrError::UnknownUser(user.to_string())
    }

    // ==================== Introspection ====================

    /// Check if a user is registered
    pub fn is_user_registered(&self, user: &str) -> YodelrResult<bool> {
        Ok(self.read()?.index.is_registered(user))
    }

    /// All indexed topics, sorted
    pub fn topics(&self) -> YodelrResult<Vec<Topic>> {
        Ok(self.read()?.index.topics())
    }

    /// All registered users, sorted
    pub fn users(&self) -> YodelrResult<Vec<String>> {
        Ok(self.read()?.index.users())
    }

    /// Number of live posts
    pub fn post_count(&self) -> YodelrResult<usize> {
        Ok(self.read()?.store.live_count())
    }

    /// Smallest and largest timestamps seen
    pub fn time_bounds(&self) -> YodelrResult<Option<(Timestamp, Timestamp)>> {
        Ok(self.read()?.index.time_bounds())
    }

    /// Get statistics about the index
    pub fn stats(&self) -> YodelrResult<IndexStats> {
        let state = self.read()?;
        Ok(state.index.stats(&state.store))
    }

    // ==================== Extended Queries ====================

    /// Trending topics with their counts
    pub fn get_trending_entries(&self, from: Timestamp, to: Timestamp) -> YodelrResult<Vec<TrendEntry>> {
        let range = TimeRange::new(from, to);
        let state = self.read()?;
        let ranked = state.index.trending(range, &state.store);

        tracing::debug!(from = range.start, to = range.end, topics = ranked.len(), "Ranked trending topics");
        Ok(ranked)
    }

    /// Live posts in the inclusive window, ascending by timestamp
    pub fn get_posts_in_range(&self, from: Timestamp, to: Timestamp) -> YodelrResult<Vec<(Timestamp, String)>> {
        let state = self.read()?;
        Ok(state
            .index
            .posts_in_timestamp_range(TimeRange::new(from, to), &state.store)
            .into_iter()
            .map(|(ts, post)| (ts, post.text.clone()))
            .collect())
    }
}

impl Yodelr for YodelrEngine {
    fn add_user(&self, user: &str) -> YodelrResult<()> {
        let created = self.write()?.index.register_user(user);

        self.sink.record(&IndexEvent::UserRegistered {
            user: user.to_string(),
            created,
        });
        Ok(())
    }

    fn add_post(&self, user: &str, text: &str, timestamp: Timestamp) -> YodelrResult<()> {
        let mut guard = self.write()?;
        let state = &mut *guard;

        if !state.index.is_registered(user) {
            return Err(self.unknown_user("add_post", user));
        }

        let body = truncate_text(text, state.store.max_chars());
        let topics = extract_topics(body);
        let handle = state.store.append(user, body, topics.clone());
        let previous = state.index.record_post(user, handle, timestamp, &topics)?;

        self.sink.record(&IndexEvent::PostAdded {
            user: user.to_string(),
            handle,
            timestamp,
            topics,
            truncated: body.len() < text.len(),
        });
        if let Some(previous) = previous {
            self.sink.record(&IndexEvent::TimestampCollision {
                timestamp,
                previous,
                current: handle,
            });
        }
        Ok(())
    }

    fn delete_user(&self, user: &str) -> YodelrResult<()> {
        let mut guard = self.write()?;
        let IndexState { store, index } = &mut *guard;

        match index.delete_user(user, store) {
            Ok(posts) => {
                self.sink.record(&IndexEvent::UserDeleted {
                    user: user.to_string(),
                    posts,
                });
                Ok(())
            }
            Err(YodelrError::UnknownUser(_)) => Err(self.unknown_user("delete_user", user)),
            Err(e) => Err(e),
        }
    }

    fn get_posts_for_user(&self, user: &str) -> YodelrResult<Vec<String>> {
        let state = self.read()?;

        match state.index.posts_for_user(user, &state.store) {
            Ok(posts) => {
                tracing::debug!(user = %user, posts = posts.len(), "Fetched posts for user");
                Ok(posts.into_iter().map(|p| p.text.clone()).collect())
            }
            Err(YodelrError::UnknownUser(_)) => Err(self.unknown_user("get_posts_for_user", user)),
            Err(e) => Err(e),
        }
    }

    fn get_posts_for_topic(&self, topic: &str) -> YodelrResult<Vec<String>> {
        let state = self.read()?;
        let posts = state.index.posts_for_topic(topic, &state.store);

        tracing::debug!(topic = %topic, posts = posts.len(), "Fetched posts for topic");
        Ok(posts.into_iter().map(|p| p.text.clone()).collect())
    }

    fn get_trending_topics(&self, from: Timestamp, to: Timestamp) -> YodelrResult<Vec<String>> {
        Ok(self
            .get_trending_entries(from, to)?
            .into_iter()
            .map(|entry| entry.topic)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TimestampPolicy;
    use crate::service::events::MemorySink;
    use std::thread;

    const USER: &str = "Rxinui";

    fn sample_10_posts() -> Vec<&'static str> {
        vec![
            "My very #first #test post.",
            "Random #post for #test",
            "same here, no topic!",
            "still no topic in the post",
            "#post is posted",
            "a #test of #topic",
            "new #post of #topic inserted",
            "told you, none, nada!",
            "#full #topic #full #topic #full",
            "totally nothing here",
        ]
    }

    fn create_test_engine() -> (YodelrEngine, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new(256));
        let engine = YodelrEngine::with_sink(&IndexConfig::default(), sink.clone());
        (engine, sink)
    }

    fn engine_with_samples() -> YodelrEngine {
        let (engine, _) = create_test_engine();
        engine.add_user(USER).unwrap();
        for (i, text) in sample_10_posts().into_iter().enumerate() {
            engine.add_post(USER, text, i as Timestamp).unwrap();
        }
        engine
    }

    #[test]
    fn test_add_post_from_unknown_user() {
        let (engine, sink) = create_test_engine();

        let err = engine.add_post(USER, "throw an #error", 1).unwrap_err();
        assert_eq!(err, YodelrError::UnknownUser(USER.to_string()));
        assert_eq!(err.code(), YodelrError::UNKNOWN_USER);

        // Nothing stored, no handle consumed
        let stats = engine.stats().unwrap();
        assert_eq!(stats.posts_total, 0);
        assert_eq!(stats.topics, 0);
        assert!(engine.get_posts_for_topic("error").unwrap().is_empty());
        assert!(matches!(sink.events().last(), Some(IndexEvent::UnknownUser { .. })));
    }

    #[test]
    fn test_delete_unknown_user() {
        let (engine, _) = create_test_engine();
        assert!(matches!(
            engine.delete_user(USER),
            Err(YodelrError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_get_posts_for_unknown_user() {
        let (engine, _) = create_test_engine();
        assert!(matches!(
            engine.get_posts_for_user(USER),
            Err(YodelrError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_add_same_user_multiple_times() {
        let (engine, sink) = create_test_engine();
        engine.add_user(USER).unwrap();
        engine.add_post(USER, "keep me", 1).unwrap();
        engine.add_user(USER).unwrap();
        engine.add_user(USER).unwrap();

        assert!(engine.is_user_registered(USER).unwrap());
        assert_eq!(engine.get_posts_for_user(USER).unwrap(), vec!["keep me"]);
        assert_eq!(engine.users().unwrap(), vec![USER]);

        let created: Vec<bool> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                IndexEvent::UserRegistered { created, .. } => Some(created),
                _ => None,
            })
            .collect();
        assert_eq!(created, vec![true, false, false]);
    }

    #[test]
    fn test_add_post_over_chars_limit() {
        let (engine, sink) = create_test_engine();
        let post_text_140 = "dream #big work #hard stay focused. Every #small step counts. Believe in yourself embrace challenges and never give up. Success is a journey";
        let post_text_22 = " with #medium worries.";

        engine.add_user(USER).unwrap();
        engine
            .add_post(USER, &format!("{}{}", post_text_140, post_text_22), 1)
            .unwrap();

        let posts = engine.get_posts_for_user(USER).unwrap();
        assert_eq!(posts, vec![post_text_140]);
        assert!(posts[0].chars().count() <= 140);

        assert_eq!(engine.topics().unwrap(), vec!["big", "hard", "small"]);
        assert!(engine.get_posts_for_topic("medium").unwrap().is_empty());
        assert!(matches!(
            sink.events().last(),
            Some(IndexEvent::PostAdded { truncated: true, .. })
        ));
    }

    #[test]
    fn test_delete_user_with_zero_post() {
        let (engine, _) = create_test_engine();
        for user in ["u1", "u2", USER, "u3", "u4"] {
            engine.add_user(user).unwrap();
        }

        engine.delete_user(USER).unwrap();

        assert!(!engine.is_user_registered(USER).unwrap());
        assert_eq!(engine.users().unwrap(), vec!["u1", "u2", "u3", "u4"]);
    }

    #[test]
    fn test_delete_user_with_multi_post() {
        let (engine, sink) = create_test_engine();
        engine.add_user("u1").unwrap();
        engine.add_user(USER).unwrap();
        engine.add_post("u1", "#post from u1", 0).unwrap();
        for (i, text) in sample_10_posts()[1..4].iter().enumerate() {
            engine.add_post(USER, text, i as Timestamp + 1).unwrap();
        }

        engine.delete_user(USER).unwrap();

        assert!(!engine.is_user_registered(USER).unwrap());
        assert!(matches!(
            engine.get_posts_for_user(USER),
            Err(YodelrError::UnknownUser(_))
        ));
        assert!(matches!(
            engine.add_post(USER, "again", 9),
            Err(YodelrError::UnknownUser(_))
        ));
        assert_eq!(engine.get_posts_for_topic("post").unwrap(), vec!["#post from u1"]);
        assert!(engine.get_posts_for_topic("test").unwrap().is_empty());
        assert_eq!(engine.get_posts_in_range(0, 9).unwrap(), vec![(0, "#post from u1".to_string())]);
        assert_eq!(engine.post_count().unwrap(), 1);

        assert!(sink.events().contains(&IndexEvent::UserDeleted {
            user: USER.to_string(),
            posts: 3,
        }));
    }

    #[test]
    fn test_reregister_deleted_user_starts_empty() {
        let (engine, _) = create_test_engine();
        engine.add_user(USER).unwrap();
        engine.add_post(USER, "#old news", 1).unwrap();
        engine.delete_user(USER).unwrap();

        engine.add_user(USER).unwrap();
        assert!(engine.get_posts_for_user(USER).unwrap().is_empty());
        assert!(engine.get_posts_for_topic("old").unwrap().is_empty());

        engine.add_post(USER, "#fresh start", 2).unwrap();
        assert_eq!(engine.get_posts_for_user(USER).unwrap(), vec!["#fresh start"]);
    }

    #[test]
    fn test_get_posts_size_0_for_user() {
        let (engine, _) = create_test_engine();
        engine.add_user(USER).unwrap();
        assert!(engine.get_posts_for_user(USER).unwrap().is_empty());
    }

    #[test]
    fn test_get_posts_size_3_is_desc_sorted() {
        let (engine, _) = create_test_engine();
        let posts = sample_10_posts();
        engine.add_user("u1").unwrap();
        engine.add_post("u1", posts[0], 1).unwrap();
        engine.add_user(USER).unwrap();
        engine.add_post(USER, posts[1], 10).unwrap();
        engine.add_post(USER, posts[2], 20).unwrap();
        engine.add_post(USER, posts[3], 30).unwrap();

        assert_eq!(
            engine.get_posts_for_user(USER).unwrap(),
            vec![posts[3], posts[2], posts[1]]
        );
    }

    #[test]
    fn test_get_posts_size_0_for_topic() {
        let (engine, _) = create_test_engine();
        let posts = sample_10_posts();
        engine.add_user(USER).unwrap();
        engine.add_post(USER, posts[2], 1).unwrap();
        engine.add_post(USER, posts[3], 2).unwrap();
        engine.add_post(USER, posts[9], 5).unwrap();

        assert!(engine.get_posts_for_topic("topic").unwrap().is_empty());
    }

    #[test]
    fn test_get_posts_size_3_for_topic() {
        let (engine, _) = create_test_engine();
        let posts = sample_10_posts();
        engine.add_user(USER).unwrap();
        engine.add_post(USER, posts[8], 1).unwrap();
        engine.add_post(USER, posts[1], 12).unwrap();
        engine.add_post(USER, posts[6], 175).unwrap();

        assert_eq!(
            engine.get_posts_for_topic("topic").unwrap(),
            vec![posts[6], posts[8]]
        );
    }

    #[test]
    fn test_get_posts_case_sensitivity_topic() {
        let (engine, _) = create_test_engine();
        let lower = "My very #first post";
        let mixed = "#First and #first are not the same";
        engine.add_user(USER).unwrap();
        engine.add_post(USER, lower, 1).unwrap();
        engine.add_post(USER, mixed, 12).unwrap();

        assert_eq!(engine.get_posts_for_topic("First").unwrap(), vec![mixed]);
        assert_eq!(engine.get_posts_for_topic("first").unwrap(), vec![mixed, lower]);
    }

    #[test]
    fn test_get_trending_topics_oldest_to_latest() {
        let engine = engine_with_samples();
        assert_eq!(
            engine.get_trending_topics(0, 9).unwrap(),
            vec!["post", "test", "topic", "first", "full"]
        );
    }

    #[test]
    fn test_get_trending_topics_in_between_ts_count_focus() {
        let engine = engine_with_samples();
        assert_eq!(
            engine.get_trending_topics(1, 6).unwrap(),
            vec!["post", "test", "topic"]
        );
    }

    #[test]
    fn test_get_trending_topics_in_between_ts_alphabetic_focus() {
        let engine = engine_with_samples();
        assert_eq!(engine.get_trending_topics(7, 9).unwrap(), vec!["full", "topic"]);
    }

    #[test]
    fn test_get_trending_topics_in_timespan_with_one_topic() {
        let engine = engine_with_samples();
        assert_eq!(engine.get_trending_topics(3, 4).unwrap(), vec!["post"]);
    }

    #[test]
    fn test_get_trending_topics_in_timespan_without_topic() {
        let engine = engine_with_samples();
        assert!(engine.get_trending_topics(9, 9).unwrap().is_empty());
        assert!(engine.get_trending_topics(100, 200).unwrap().is_empty());
    }

    #[test]
    fn test_get_trending_topics_inverted_range() {
        let engine = engine_with_samples();
        assert_eq!(
            engine.get_trending_topics(6, 1).unwrap(),
            engine.get_trending_topics(1, 6).unwrap()
        );
    }

    #[test]
    fn test_trending_entries_carry_counts() {
        let engine = engine_with_samples();
        let entries = engine.get_trending_entries(0, 9).unwrap();

        assert_eq!(entries[0], TrendEntry::new("post", 3));
        assert_eq!(entries[4], TrendEntry::new("full", 1));
    }

    #[test]
    fn test_trending_skips_deleted_posts() {
        let engine = engine_with_samples();
        engine.add_user("u2").unwrap();
        engine.add_post("u2", "#full #full", 10).unwrap();

        assert_eq!(engine.get_trending_topics(8, 10).unwrap(), vec!["full", "topic"]);

        engine.delete_user(USER).unwrap();
        assert_eq!(engine.get_trending_topics(0, 10).unwrap(), vec!["full"]);
    }

    #[test]
    fn test_spec_scenario() {
        let (engine, _) = create_test_engine();
        engine.add_user(USER).unwrap();
        engine.add_post(USER, "#post is posted", 4).unwrap();
        engine.add_post(USER, "new #post of #topic inserted", 6).unwrap();
        engine.add_post(USER, "#full #topic #full #topic #full", 8).unwrap();

        assert_eq!(
            engine.get_trending_topics(0, 9).unwrap(),
            vec!["post", "topic", "full"]
        );
        assert_eq!(
            engine.get_posts_for_topic("topic").unwrap(),
            vec!["#full #topic #full #topic #full", "new #post of #topic inserted"]
        );
    }

    #[test]
    fn test_timestamp_collision_event() {
        let (engine, sink) = create_test_engine();
        engine.add_user(USER).unwrap();
        engine.add_post(USER, "#one", 1).unwrap();
        engine.add_post(USER, "#two", 1).unwrap();

        assert!(matches!(
            sink.events().last(),
            Some(IndexEvent::TimestampCollision { timestamp: 1, .. })
        ));
        assert_eq!(engine.get_trending_topics(0, 5).unwrap(), vec!["two"]);
        assert_eq!(engine.get_posts_for_user(USER).unwrap(), vec!["#two", "#one"]);
    }

    #[test]
    fn test_keep_all_policy() {
        let config = IndexConfig {
            timestamp_policy: TimestampPolicy::KeepAll,
            ..Default::default()
        };
        let engine = YodelrEngine::with_config(&config);
        engine.add_user(USER).unwrap();
        engine.add_post(USER, "#one", 1).unwrap();
        engine.add_post(USER, "#two #one", 1).unwrap();

        assert_eq!(engine.get_trending_topics(1, 1).unwrap(), vec!["one", "two"]);
        assert_eq!(engine.get_posts_in_range(1, 1).unwrap().len(), 2);
    }

    #[test]
    fn test_custom_post_limit() {
        let config = IndexConfig {
            max_post_chars: 10,
            ..Default::default()
        };
        let engine = YodelrEngine::with_config(&config);
        engine.add_user(USER).unwrap();
        engine.add_post(USER, "#short and #long", 1).unwrap();

        assert_eq!(engine.get_posts_for_user(USER).unwrap(), vec!["#short and"]);
        assert_eq!(engine.topics().unwrap(), vec!["short"]);
    }

    #[test]
    fn test_stats() {
        let engine = engine_with_samples();
        let stats = engine.stats().unwrap();

        assert_eq!(stats.users, 1);
        assert_eq!(stats.posts_live, 10);
        assert_eq!(stats.timestamps, 10);
        assert_eq!(stats.topics, 5);
        assert_eq!(engine.time_bounds().unwrap(), Some((0, 9)));
    }

    #[test]
    fn test_reads_see_whole_deletes() {
        let engine = Arc::new(YodelrEngine::with_sink(
            &IndexConfig::default(),
            Arc::new(MemorySink::new(0)),
        ));
        engine.add_user("victim").unwrap();
        engine.add_user("bystander").unwrap();
        for i in 0..50 {
            engine.add_post("victim", "#watched", i).unwrap();
        }

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let seen = engine.get_posts_for_topic("watched").unwrap().len();
                        assert!(seen == 50 || seen == 0, "partial delete observed: {}", seen);
                    }
                })
            })
            .collect();

        let writer = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..50 {
                    engine.add_post("bystander", "#other", 100 + i).unwrap();
                }
                engine.delete_user("victim").unwrap();
            })
        };

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert!(engine.get_posts_for_topic("watched").unwrap().is_empty());
        assert_eq!(engine.get_posts_for_user("bystander").unwrap().len(), 50);
    }
}
