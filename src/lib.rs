//! # Yodelr
//!
//! An in-memory micro-blogging index: users publish short posts, posts carry
//! `#topics`, and the service answers per-user and per-topic timelines and
//! ranks trending topics over a timestamp window.
//!
//! ## Modules
//!
//! - [`storage`]: Post store, core types and errors
//! - [`index`]: User / topic / time indexes and trend ranking
//! - [`service`]: Thread-safe `Yodelr` facade and index events
//! - [`workload`]: Script replay, CSV import and synthetic workloads
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use yodelr::{Yodelr, YodelrEngine};
//!
//! fn main() -> Result<(), yodelr::YodelrError> {
//!     let engine = YodelrEngine::new();
//!
//!     engine.add_user("alice")?;
//!     engine.add_post("alice", "#post is posted", 4)?;
//!     engine.add_post("alice", "new #post of #topic inserted", 6)?;
//!     engine.add_post("alice", "#full #topic #full #topic #full", 8)?;
//!
//!     assert_eq!(
//!         engine.get_trending_topics(0, 9)?,
//!         vec!["post", "topic", "full"]
//!     );
//!     assert_eq!(engine.get_posts_for_topic("full")?.len(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod index;
pub mod service;
pub mod storage;
pub mod workload;

// Re-export top-level types for convenience
pub use storage::{
    Post, PostHandle, PostStore, TimeRange, Timestamp, Topic, UserId, YodelrError, YodelrResult,
    MAX_POST_CHARS,
};

pub use index::{CompositeIndex, IndexStats, TimestampPolicy, TrendEntry};

pub use service::{EventSink, IndexEvent, MemorySink, TeeSink, TracingSink, Yodelr, YodelrEngine};

pub use config::{Config, ConfigError, ConfigSource, IndexConfig, LoggingConfig, WorkloadConfig};

pub use workload::{CsvImporter, WorkloadError, WorkloadGenerator, WorkloadResult};
