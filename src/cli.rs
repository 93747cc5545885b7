use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON); defaults to the platform config directory
    #[arg(short, long, global = true, env = "KOMIK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Raise the default log level (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recently updated series
    Latest {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Most popular series
    Popular {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search series by title
    Search { query: String },
    /// Series metadata and chapter list
    Detail {
        /// Series link, absolute or as printed by a listing
        link: String,
    },
    /// Reader page of a single chapter
    Chapter {
        /// Chapter link, absolute or as printed by a detail page
        link: String,
    },
    /// Download one chapter as a `.cbz`
    Download {
        link: String,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Download several chapters of one series into a single `.zip`
    Batch {
        /// Series link
        link: String,
        /// Chapter links to include
        #[arg(required = true)]
        chapters: Vec<String>,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Print progress with server-sent event framing instead of JSON lines
        #[arg(long)]
        sse: bool,
    },
}

impl Command {
    /// Default filter directive for the given verbosity.
    pub fn log_level(verbose: u8) -> &'static str {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
