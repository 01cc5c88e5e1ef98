//! Input loading
//!
//! Reads a file holding one JSON value per line. A line holding an array
//! contributes each element as its own record. Read failures never abort the
//! run: they are logged and the file yields zero records.

use crate::config::RetryPolicy;
use crate::error::LoadError;
use serde_json::Value;
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

/// Records parsed from one input file
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<Value>,

    /// Lines skipped because they were not valid JSON
    pub decode_errors: usize,
}

/// Read and parse `path`, retrying on permission errors according to `retry`
pub fn load_records(path: &Path, retry: &RetryPolicy) -> LoadedRecords {
    info!("Processing JSON file: {}", path.display());

    let loaded = match read_with_retry(path, retry, |p| std::fs::read_to_string(p)) {
        Ok(text) => parse_lines(path, &text),
        Err(e) => {
            error!("{}", e);
            LoadedRecords::default()
        }
    };

    info!("Total records read: {}", loaded.records.len());
    loaded
}

/// Run `read` until it succeeds, fails with something other than a
/// permission error, or `retry.max_attempts` is used up.
pub fn read_with_retry<F>(path: &Path, retry: &RetryPolicy, mut read: F) -> Result<String, LoadError>
where
    F: FnMut(&Path) -> io::Result<String>,
{
    let max_attempts = retry.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        info!("Reading file: {}", path.display());
        match read(path) {
            Ok(text) => return Ok(text),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                attempts += 1;
                error!("Permission denied when accessing {}: {}", path.display(), e);
                if attempts >= max_attempts {
                    error!("Max retries reached for {}", path.display());
                    return Err(LoadError::AccessDenied {
                        path: path.to_path_buf(),
                        attempts,
                    });
                }
                warn!("Retrying... ({}/{})", attempts, max_attempts);
                std::thread::sleep(retry.delay());
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

/// Parse newline-delimited JSON. Blank lines are skipped; malformed lines
/// are logged with their 1-based line number and skipped.
pub fn parse_lines(source: &Path, text: &str) -> LoadedRecords {
    let mut loaded = LoadedRecords::default();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(Value::Array(items)) => loaded.records.extend(items),
            Ok(value) => loaded.records.push(value),
            Err(e) => {
                error!(
                    "Error decoding JSON in {} at line {}: {}",
                    source.display(),
                    idx + 1,
                    e
                );
                loaded.decode_errors += 1;
            }
        }
    }

    loaded
}
