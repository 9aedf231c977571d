use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-transcript",
    about = "Fetch YouTube caption transcripts without official API access",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download and print the transcript for a video
    Fetch {
        /// Video id or YouTube URL
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Caption language code (platform default track if not specified)
        #[arg(short, long, value_name = "LANG")]
        lang: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Include cue timestamps in text output
        #[arg(long)]
        timestamps: bool,

        /// Use plain HTTP instead of HTTPS
        #[arg(long)]
        http: bool,

        /// Override the User-Agent header
        #[arg(long, value_name = "UA")]
        user_agent: Option<String>,

        /// Cache transcripts on disk under this directory
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,

        /// Cache time-to-live in seconds (implies --cache-dir's default location when set alone)
        #[arg(long, value_name = "SECONDS")]
        cache_ttl: Option<u64>,
    },

    /// Check whether a transcript exists without downloading it
    Check {
        /// Video id or YouTube URL
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Caption language code to check for
        #[arg(short, long, value_name = "LANG")]
        lang: Option<String>,
    },

    /// List the caption languages advertised for a video
    Languages {
        /// Video id or YouTube URL
        #[arg(value_name = "VIDEO")]
        video: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Plain text, one cue per line
    Text,
    /// JSON segment array with timings
    Json,
    /// SRT subtitle format
    Srt,
}
