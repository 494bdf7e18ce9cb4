// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};
use mp3_tagger::TagVersion;

/// mp3-tagger - ID3 tag CLI tool
#[derive(Parser, Debug)]
#[command(name = "mp3-tagger")]
#[command(about = "Read and edit ID3v1 and ID3v2 tags of MP3 files", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Tag versions to read and edit
    #[arg(short, long, global = true, value_enum, default_value = "both")]
    pub tags: TagSelection,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

impl Config {
    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// Output format for tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// Which tag versions commands look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TagSelection {
    V1,
    V2,
    #[default]
    Both,
}

impl From<TagSelection> for TagVersion {
    fn from(selection: TagSelection) -> Self {
        match selection {
            TagSelection::V1 => TagVersion::V1,
            TagSelection::V2 => TagVersion::V2,
            TagSelection::Both => TagVersion::Both,
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read tags from MP3 file(s)
    Read {
        /// MP3 file path(s) or glob pattern(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Set tag fields and save the file
    Set {
        /// MP3 file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Assignments such as `artist=Someone` or `track=5`
        #[arg(value_name = "FIELD=VALUE", required = true)]
        assignments: Vec<String>,
    },

    /// Clear tag fields and save the file
    Clear {
        /// MP3 file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Field names such as `comment`
        #[arg(value_name = "FIELD", required = true)]
        fields: Vec<String>,
    },

    /// Detect the ID3 version
    Detect {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Show file information
    Info {
        /// MP3 file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// List the parsed frames
        #[arg(short, long)]
        detailed: bool,
    },
}
