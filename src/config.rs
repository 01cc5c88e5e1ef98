use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the loader retries when the input file cannot be accessed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Pause between attempts, in milliseconds
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}

/// Everything one report run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// File with one JSON value per line
    pub input_path: PathBuf,

    /// Directory that receives the CSV report
    pub output_dir: PathBuf,

    /// Report file names are `<file_prefix>-<timestamp>.csv`
    pub file_prefix: String,

    /// Separator between nested object keys in key paths
    pub separator: String,

    pub retry: RetryPolicy,

    /// Mirror diagnostics into this file as well as stderr
    pub log_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_path: PathBuf::from("input.json"),
            output_dir: PathBuf::from("."),
            file_prefix: String::from("dictionary"),
            separator: String::from("."),
            retry: RetryPolicy::default(),
            log_file: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Report file name for a run started at `now`
    pub fn output_file_name<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!("{}-{}.csv", self.file_prefix, now.format("%Y%m%d_%H%M%S"))
    }

    /// Full report path for a run started at `now`
    pub fn output_path<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        self.output_dir.join(self.output_file_name(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_output_path_embeds_timestamp() {
        let config = PipelineConfig {
            output_dir: PathBuf::from("out"),
            file_prefix: String::from("luma-dictionary"),
            ..PipelineConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

        assert_eq!(
            config.output_path(&now),
            PathBuf::from("out").join("luma-dictionary-20240309_070501.csv")
        );
    }

    #[test]
    fn test_partial_json_config_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"input_path": "data.jsonl", "retry": {"delay_ms": 10}}"#)
                .unwrap();

        assert_eq!(config.input_path, PathBuf::from("data.jsonl"));
        assert_eq!(config.separator, ".");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay(), Duration::from_millis(10));
    }
}
