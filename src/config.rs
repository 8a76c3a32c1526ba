//! CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Tally configuration
#[derive(Debug, Parser)]
#[command(name = "tally", about = "Price an order draft against a product catalog", long_about = None)]
pub struct Config {
    /// Fixture set to price: `catalogs/<name>.json` and `orders/<name>.yml`
    #[arg(short, long, env = "TALLY_FIXTURE", default_value = "cafe")]
    pub fixture: String,

    /// Directory holding the fixture sets
    #[arg(short = 'd', long, env = "TALLY_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Also print the submission payload as JSON
    #[arg(long)]
    pub submission: bool,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
