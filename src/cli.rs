use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediacompat")]
#[command(
    author,
    version,
    about = "Convert media files whose container or codecs are not on the compatibility list"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a file, or every file under a directory, where needed
    Convert {
        /// File or directory to process
        #[arg(required = true)]
        path: PathBuf,

        /// Show what would be converted without running ffmpeg
        #[arg(long)]
        dry_run: bool,

        /// Replace the original file with the converted one
        #[arg(long)]
        replace: bool,

        /// Number of files to process in parallel
        #[arg(short, long, default_value = "1")]
        jobs: usize,
    },

    /// Evaluate a single file and print its conversion plan
    Check {
        /// File to check
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective compatibility table and target encoding
    Table {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
