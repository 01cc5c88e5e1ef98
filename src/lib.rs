//! # keytally - JSON key frequency reports
//!
//! Reads newline-delimited JSON, flattens every record into dotted key paths
//! and counts how often each distinct scalar value appears under each path.
//! The result is written as a wide CSV in which every key path owns a
//! `[Value]` and an `[Instances]` column, most frequent value first.
//!
//! ## Modules
//!
//! - **loader**: read the input file with retry on permission errors
//! - **tabulate**: flatten records and build per-key histograms
//! - **pivot**: rank histograms and write the CSV report
//!
//! ## Quick Start
//!
//! ```rust
//! use keytally::pivot::{write_grid, PivotGrid};
//! use keytally::tabulate::Flattener;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let records = vec![
//!     json!({"user": {"id": 1, "tags": ["a", "a", "b"]}}),
//! ];
//!
//! let table = Flattener::default().tabulate(&records);
//! let mut csv = Vec::new();
//! write_grid(&PivotGrid::from_table(&table), &mut csv)?;
//!
//! assert!(String::from_utf8(csv)?.starts_with("user.id [Value],user.id [Instances]"));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod pivot;
pub mod tabulate;

// Re-export commonly used types for convenience
pub use config::{PipelineConfig, RetryPolicy};
pub use error::{LoadError, ReportError};
pub use pivot::{CsvReportWriter, PivotCell, PivotGrid};
pub use tabulate::{FlattenConfig, Flattener, FrequencyTable, JsonNumber, KeyPath, ScalarValue};

/// Summary of one report run
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub records_read: usize,
    pub decode_errors: usize,

    /// Distinct key paths observed
    pub keys: usize,

    /// Data rows in the report
    pub rows: usize,

    /// Where the CSV was written; `None` when there was nothing to write
    pub output: Option<PathBuf>,
}

/// Main entry point: load, tabulate and write one report.
///
/// Unreadable input and an empty aggregation are not errors: they produce an
/// outcome with `output: None`. Failing to create or write the report is.
pub fn build_report(config: &PipelineConfig) -> Result<ReportOutcome> {
    let loaded = loader::load_records(&config.input_path, &config.retry);

    let flattener = Flattener::new(FlattenConfig {
        separator: config.separator.clone(),
    });
    let table = flattener.tabulate(&loaded.records);

    let mut outcome = ReportOutcome {
        records_read: loaded.records.len(),
        decode_errors: loaded.decode_errors,
        keys: table.len(),
        rows: table.iter().map(|(_, histogram)| histogram.len()).max().unwrap_or(0),
        output: None,
    };
    // Records are no longer needed once counted
    drop(loaded);

    let writer = CsvReportWriter::new(&config.output_dir);
    let file_name = config.output_file_name(&chrono::Local::now());
    let path = match writer.write_table(&table, &file_name) {
        Ok(path) => path,
        Err(ReportError::EmptyAggregation) => return Ok(outcome),
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Cannot write report {} in {}",
                    file_name,
                    config.output_dir.display()
                )
            })
        }
    };

    info!("CSV file {} closed", path.display());
    outcome.output = Some(path);
    Ok(outcome)
}
