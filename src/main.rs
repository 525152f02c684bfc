//! # Huberman Scrape
//!
//! Browser-driven scrapers for the Huberman Lab topic pages and the
//! podscripts.co transcript archive.
//!
//! ## Features
//!
//! - Collects topic cards and the cited resources on each topic page,
//!   grouped by section heading
//! - Extracts readable article text for each cited resource with a
//!   Readability pass
//! - Downloads podcast transcripts page by page, skipping episodes already
//!   on disk and pages that are subscriber-only teasers
//!
//! ## Usage
//!
//! ```sh
//! huberman_scrape resources
//! huberman_scrape clean-text -o ./huberman_resources
//! huberman_scrape transcripts -o ./out
//! ```
//!
//! ## Architecture
//!
//! Each subcommand is a strictly sequential pipeline over one browser session:
//! 1. **Collection**: discover topic or episode URLs from listing pages
//! 2. **Extraction**: visit each URL, polling until its content renders
//! 3. **Output**: write text files as items complete and JSON at the end
//!
//! The browser session is closed on every exit path, including Ctrl-C.

use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;
mod wait;

use browser::BrowserSession;
use cli::{Cli, Command};
use config::ScrapeConfig;
use outputs::json;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("huberman_scrape starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = config::load_config(args.config.as_deref()).await?;
    if args.headful {
        config.browser.headless = false;
    }

    let output_dir = output_dir_for(&args.command, &config);
    if let Err(e) = ensure_writable_dir(&output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let mut session = BrowserSession::launch(&config.browser).await?;
    let outcome = tokio::select! {
        result = run_command(&mut session, &args.command, &config, &output_dir) => Some(result),
        _ = wait_for_interrupt(tokio::signal::ctrl_c()) => None,
    };
    session.close().await;

    match outcome {
        Some(result) => result?,
        None => {
            warn!("Interrupted; browser closed, partial output discarded");
            return Err("interrupted".into());
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Resolve once the user interrupts the process.
///
/// If the signal handler cannot be installed this never resolves, so the
/// pipeline runs to completion instead of being cancelled.
async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "Could not listen for Ctrl-C; interruption will not close the browser");
        std::future::pending::<()>().await;
    }
}

/// Output directory for a subcommand: the flag, else the configured default.
fn output_dir_for(command: &Command, config: &ScrapeConfig) -> PathBuf {
    match command {
        Command::Resources { output_dir } | Command::CleanText { output_dir } => output_dir
            .clone()
            .unwrap_or_else(|| config.topics.output_dir.clone()),
        Command::Transcripts { output_dir } => output_dir
            .clone()
            .unwrap_or_else(|| config.transcripts.output_dir.clone()),
    }
}

#[instrument(level = "info", skip(session, config))]
async fn run_command(
    session: &mut BrowserSession,
    command: &Command,
    config: &ScrapeConfig,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Resources { .. } => {
            let records =
                pipeline::collect_topic_records(session, &config.topics, &config.waits, None)
                    .await?;
            let path = output_dir.join(&config.topics.resources_file);
            json::write_topics(&records, &path).await?;
            info!(path = %path.display(), "Scraping complete");
        }
        Command::CleanText { .. } => {
            let texts_dir = output_dir.join(&config.topics.texts_subdir);
            let records = pipeline::collect_topic_records(
                session,
                &config.topics,
                &config.waits,
                Some(&texts_dir),
            )
            .await?;
            let path = output_dir.join(&config.topics.clean_text_file);
            json::write_topics(&records, &path).await?;
            info!(path = %path.display(), "Scraping complete");
        }
        Command::Transcripts { .. } => {
            let summary = scrapers::transcripts::run(
                session,
                &config.transcripts,
                &config.waits,
                output_dir,
            )
            .await?;
            info!(saved = summary.files_on_disk, "Saved transcripts");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_output_dir_defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(
            output_dir_for(&Command::Resources { output_dir: None }, &config),
            PathBuf::from("huberman_resources")
        );
        assert_eq!(
            output_dir_for(&Command::Transcripts { output_dir: None }, &config),
            PathBuf::from("out")
        );
    }

    #[tokio::test]
    async fn test_interrupt_resolves_on_signal() {
        let waited = tokio::time::timeout(
            Duration::from_millis(50),
            wait_for_interrupt(std::future::ready(Ok(()))),
        )
        .await;
        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn test_failed_signal_handler_never_interrupts() {
        let handler_error = std::io::Error::other("signal driver unavailable");
        let waited = tokio::time::timeout(
            Duration::from_millis(20),
            wait_for_interrupt(std::future::ready(Err(handler_error))),
        )
        .await;
        assert!(waited.is_err());
    }

    #[test]
    fn test_output_dir_flag_wins() {
        let config = ScrapeConfig::default();
        let command = Command::CleanText {
            output_dir: Some(PathBuf::from("/data")),
        };
        assert_eq!(output_dir_for(&command, &config), PathBuf::from("/data"));
    }
}
