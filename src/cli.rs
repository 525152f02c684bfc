//! Command-line interface definitions.
//!
//! Each subcommand runs one pipeline. Defaults come from the configuration
//! (see [`crate::config`]); flags override them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Topic resources as JSON
/// huberman_scrape resources
///
/// # Topic resources plus readable article text, custom output directory
/// huberman_scrape clean-text --output-dir ./data
///
/// # Podcast transcripts, visible browser window
/// huberman_scrape --headful transcripts
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "HUBERMAN_SCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    pub headful: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Collect topics and their cited resources into a JSON file
    Resources {
        /// Output directory for the JSON file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Like `resources`, also saving readable text for each linked resource
    CleanText {
        /// Output directory for the JSON file and article texts
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Download podcast episode transcripts
    Transcripts {
        /// Output directory for transcript files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}
