//! CLI parse: clap types for article-gen. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// article-gen - SEO article generation with per-field failure tracking
#[derive(Parser)]
#[command(name = "article-gen")]
#[command(about = "Generate articles for a keyword list and retry only the fields that failed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (default: ./article-gen.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate records for every keyword that has none yet
    Generate {
        /// Keywords CSV (keyword,category)
        #[arg(long)]
        keywords: Option<PathBuf>,
        /// Categories CSV (category,search term)
        #[arg(long)]
        categories: Option<PathBuf>,
        /// Items processed at once
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Retry the failed fields of every record with errors
    Regenerate {
        /// Categories CSV (category,search term)
        #[arg(long)]
        categories: Option<PathBuf>,
        /// Items processed at once
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Export error-free records to CSV
    Export {
        /// Output file (default: <export_dir>/<export_file>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show succeeded and failed record counts
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
