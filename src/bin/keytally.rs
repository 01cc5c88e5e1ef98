//! keytally: Count distinct values per JSON key path and write a CSV report
//!
//! Usage:
//!   # Report on a file, writing into the current directory
//!   keytally records.jsonl
//!
//!   # Choose the output directory and file name prefix
//!   keytally records.jsonl --output-dir ./reports --prefix luma-dictionary
//!
//!   # Start from a JSON config file and mirror logs into a file
//!   keytally --config keytally.json --log-file ./reports/keytally.log

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use clap::Parser;
use keytally::{build_report, logging, PipelineConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keytally")]
#[command(about = "Tabulate value frequencies per JSON key path into a CSV report", long_about = None)]
struct Args {
    /// Input file with one JSON value per line
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Directory for the CSV report
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// JSON configuration file; flags given on the command line win
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report file name prefix (default: "dictionary")
    #[arg(long)]
    prefix: Option<String>,

    /// Separator between nested keys (default: ".")
    #[arg(long)]
    separator: Option<String>,

    /// Attempts to read the input when access is denied (default: 3)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Delay between read attempts in milliseconds (default: 2000)
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Also write diagnostics to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(prefix) = self.prefix {
            config.file_prefix = prefix;
        }
        if let Some(sep) = self.separator {
            config.separator = sep;
        }
        if let Some(attempts) = self.max_retries {
            config.retry.max_attempts = attempts;
        }
        if let Some(delay) = self.retry_delay_ms {
            config.retry.delay_ms = delay;
        }
        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let config = Args::parse().into_config()?;
    let _guard = logging::init(config.log_file.as_deref())?;

    let outcome = build_report(&config)?;

    if let Some(path) = outcome.output {
        println!("{}", path.display());
    }

    Ok(())
}
