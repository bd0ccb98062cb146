//! Synthetic Workloads
//!
//! Generates lorem-ipsum text where a fraction of the words are hashtags,
//! cuts it into posts of at most `max_post_chars` characters and spreads
//! them over a set of authors. Post `n` gets timestamp `n`.

use crate::config::WorkloadConfig;
use crate::service::{Yodelr, YodelrEngine};
use crate::storage::{Timestamp, YodelrResult, MAX_POST_CHARS};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

const LOREM_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "reprehenderit",
    "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint",
    "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia", "deserunt",
    "mollit", "anim", "id", "est", "laborum",
];

/// A post ready to be fed to `add_post`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPost {
    pub user: String,
    pub timestamp: Timestamp,
    pub text: String,
}

/// Seeded generator of random posts
pub struct WorkloadGenerator {
    words: usize,
    users: Vec<String>,
    topic_ratio: f64,
    max_post_chars: usize,
    rng: fastrand::Rng,
}

impl WorkloadGenerator {
    pub fn new(config: &WorkloadConfig, max_post_chars: usize) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        Self {
            words: config.words,
            users: config.users.clone(),
            topic_ratio: config.topic_ratio.clamp(0.0, 1.0),
            max_post_chars: max_post_chars.max(1),
            rng,
        }
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Space-separated random words, some prefixed with `#`
    pub fn text(&mut self) -> String {
        let mut text = String::new();
        for _ in 0..self.words {
            if self.rng.f64() < self.topic_ratio {
                text.push('#');
            }
            text.push_str(LOREM_WORDS[self.rng.usize(..LOREM_WORDS.len())]);
            text.push(' ');
        }
        text
    }

    /// Generate text and cut it into posts by random authors
    ///
    /// Chunk boundaries ignore word boundaries, so a hashtag may be split
    /// across two posts.
    pub fn posts(&mut self) -> Vec<GeneratedPost> {
        if self.users.is_empty() {
            return Vec::new();
        }

        let text = self.text();
        let chars: Vec<char> = text.chars().collect();

        chars
            .chunks(self.max_post_chars)
            .enumerate()
            .map(|(i, chunk)| GeneratedPost {
                user: self.users[self.rng.usize(..self.users.len())].clone(),
                timestamp: i as Timestamp,
                text: chunk.iter().collect(),
            })
            .collect()
    }
}

impl Default for WorkloadGenerator {
    fn default() -> Self {
        Self::new(&WorkloadConfig::default(), MAX_POST_CHARS)
    }
}

/// Timings of one performance run
#[derive(Debug, Clone, Serialize)]
pub struct PerfReport {
    pub posts: usize,
    pub users: usize,
    pub topics: usize,
    pub add_post: Duration,
    pub posts_for_user: Duration,
    pub posts_for_topic: Duration,
    pub trending: Duration,
}

impl fmt::Display for PerfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Posts: {}, Users: {}, Topics: {}",
            self.posts, self.users, self.topics
        )?;
        writeln!(f, "  add_post:            {:?}", self.add_post)?;
        writeln!(f, "  get_posts_for_user:  {:?}", self.posts_for_user)?;
        writeln!(f, "  get_posts_for_topic: {:?}", self.posts_for_topic)?;
        write!(f, "  get_trending_topics: {:?}", self.trending)
    }
}

/// Load generated posts into `engine` and time every query path
///
/// Users are registered first and are not part of the timings.
pub fn run_perf(
    engine: &YodelrEngine,
    users: &[String],
    posts: &[GeneratedPost],
) -> YodelrResult<PerfReport> {
    for user in users {
        engine.add_user(user)?;
    }

    let started = Instant::now();
    for post in posts {
        engine.add_post(&post.user, &post.text, post.timestamp)?;
    }
    let add_post = started.elapsed();

    let started = Instant::now();
    for user in users {
        engine.get_posts_for_user(user)?;
    }
    let posts_for_user = started.elapsed();

    let topics = engine.topics()?;
    let started = Instant::now();
    for topic in &topics {
        engine.get_posts_for_topic(topic)?;
    }
    let posts_for_topic = started.elapsed();

    let last = posts.last().map(|p| p.timestamp).unwrap_or(0);
    let started = Instant::now();
    engine.get_trending_topics(0, last)?;
    let trending = started.elapsed();

    let report = PerfReport {
        posts: posts.len(),
        users: users.len(),
        topics: topics.len(),
        add_post,
        posts_for_user,
        posts_for_topic,
        trending,
    };

    tracing::info!(
        posts = report.posts,
        topics = report.topics,
        add_post_ms = report.add_post.as_secs_f64() * 1000.0,
        trending_ms = report.trending.as_secs_f64() * 1000.0,
        "Performance run finished"
    );
    Ok(report)
}
