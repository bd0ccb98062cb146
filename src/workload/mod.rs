//! Workloads
//!
//! Ways of feeding posts into a `Yodelr` from outside the API:
//! - Command scripts (line-oriented replay)
//! - CSV import (`user,timestamp,text`)
//! - Synthetic lorem-ipsum workloads for performance runs

mod csv_import;
mod generator;
mod script;

pub use csv_import::{CsvImportResult, CsvImporter};
pub use generator::{run_perf, GeneratedPost, PerfReport, WorkloadGenerator};
pub use script::{parse_script, replay, Command, CommandOutput, CommandResult, ReplayReport};

use crate::storage::YodelrError;

/// Errors that can occur while loading or replaying workloads
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Yodelr(#[from] YodelrError),
}

pub type WorkloadResult<T> = Result<T, WorkloadError>;
