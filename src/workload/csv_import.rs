//! CSV Import
//!
//! Bulk-loads posts from CSV rows of `user,timestamp,text`.
//! The header row is optional and detected when not configured.

use super::WorkloadResult;
use crate::service::Yodelr;
use crate::storage::{Timestamp, YodelrError};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Errors kept per import before the rest are summarised
const MAX_REPORTED_ERRORS: usize = 100;

/// Timestamp column names recognised when detecting a header row
const TIMESTAMP_HEADERS: &[&str] = &["timestamp", "ts", "time"];

/// CSV post importer with configurable column mapping
pub struct CsvImporter {
    /// Column index for the author (0-indexed)
    user_column: usize,
    /// Column index for the timestamp
    timestamp_column: usize,
    /// Column index where the post text starts
    text_column: usize,
    /// `None` treats the first row as a header when its timestamp cell is
    /// a known column name
    has_header: Option<bool>,
    /// Register unseen authors instead of rejecting their rows
    register_users: bool,
}

/// Result of a CSV import operation
#[derive(Debug, Default)]
pub struct CsvImportResult {
    pub rows_processed: usize,
    pub rows_failed: usize,
    /// Distinct authors seen in accepted rows
    pub users: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    /// Create a new CSV importer with default settings
    pub fn new() -> Self {
        Self {
            user_column: 0,
            timestamp_column: 1,
            text_column: 2,
            has_header: None,
            register_users: true,
        }
    }

    /// Set the author, timestamp and text column indices
    pub fn with_columns(mut self, user: usize, timestamp: usize, text: usize) -> Self {
        self.user_column = user;
        self.timestamp_column = timestamp;
        self.text_column = text;
        self
    }

    /// Set whether the CSV has a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    /// Set whether unseen authors are registered on the fly
    pub fn with_user_registration(mut self, register: bool) -> Self {
        self.register_users = register;
        self
    }

    /// Import posts from a CSV file
    pub fn import<Y: Yodelr + ?Sized>(&self, yodelr: &Y, path: &Path) -> WorkloadResult<CsvImportResult> {
        let file = std::fs::File::open(path)?;
        tracing::info!(path = %path.display(), "Importing posts from CSV");
        self.import_reader(yodelr, file)
    }

    /// Import from a CSV string (useful for testing)
    pub fn import_str<Y: Yodelr + ?Sized>(&self, yodelr: &Y, csv_data: &str) -> WorkloadResult<CsvImportResult> {
        self.import_reader(yodelr, csv_data.as_bytes())
    }

    fn import_reader<Y: Yodelr + ?Sized, R: Read>(&self, yodelr: &Y, source: R) -> WorkloadResult<CsvImportResult> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);

        let mut result = CsvImportResult::default();
        let mut seen_users = HashSet::new();
        let mut errors = Vec::new();

        for (idx, record) in reader.records().enumerate() {
            let line = idx + 1;

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    errors.push(format!("Line {}: {}", line, e));
                    result.rows_failed += 1;
                    continue;
                }
            };

            if idx == 0 && self.is_header(&record) {
                continue;
            }

            let (user, timestamp, text) = match self.parse_row(&record) {
                Ok(row) => row,
                Err(message) => {
                    errors.push(format!("Line {}: {}", line, message));
                    result.rows_failed += 1;
                    continue;
                }
            };

            if self.register_users && !seen_users.contains(user) {
                yodelr.add_user(user)?;
            }

            match yodelr.add_post(user, &text, timestamp) {
                Ok(()) => {
                    if seen_users.insert(user.to_string()) {
                        result.users.push(user.to_string());
                    }
                    result.rows_processed += 1;
                }
                Err(e @ YodelrError::UnknownUser(_)) => {
                    errors.push(format!("Line {}: {}", line, e));
                    result.rows_failed += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        // Truncate errors if too many
        if errors.len() > MAX_REPORTED_ERRORS {
            let total = errors.len();
            errors.truncate(MAX_REPORTED_ERRORS);
            errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
        }
        result.errors = errors;

        tracing::info!(
            processed = result.rows_processed,
            failed = result.rows_failed,
            users = result.users.len(),
            "CSV import finished"
        );
        Ok(result)
    }

    fn is_header(&self, record: &csv::StringRecord) -> bool {
        match self.has_header {
            Some(has_header) => has_header,
            None => record
                .get(self.timestamp_column)
                .map(|ts| {
                    let ts = ts.trim();
                    TIMESTAMP_HEADERS
                        .iter()
                        .any(|name| ts.eq_ignore_ascii_case(name))
                })
                .unwrap_or(false),
        }
    }

    fn parse_row<'r>(&self, record: &'r csv::StringRecord) -> Result<(&'r str, Timestamp, String), String> {
        let user = record
            .get(self.user_column)
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or("missing user column")?;

        let ts_str = record
            .get(self.timestamp_column)
            .map(str::trim)
            .ok_or("missing timestamp column")?;
        let timestamp: Timestamp = ts_str
            .parse()
            .map_err(|_| format!("Could not parse timestamp: {}", ts_str))?;

        if record.get(self.text_column).is_none() {
            return Err("missing text column".to_string());
        }
        // Unquoted commas split the text over trailing fields
        let text = record
            .iter()
            .skip(self.text_column)
            .collect::<Vec<_>>()
            .join(",");

        Ok((user, timestamp, text))
    }
}
