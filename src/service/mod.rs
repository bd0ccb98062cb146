//! Yodelr Service
//!
//! The thread-safe facade over the post store and index, plus the event
//! sinks it reports to.

mod engine;
mod events;

pub use engine::{Yodelr, YodelrEngine};
pub use events::{EventSink, IndexEvent, MemorySink, TeeSink, TracingSink};
