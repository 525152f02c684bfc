//! Runtime configuration for the scraping pipelines.
//!
//! Every field has a default matching the sites this tool was written for, so
//! the binary runs with no configuration at all. A YAML file passed with
//! `--config` may override any subset of fields:
//!
//! ```yaml
//! topics:
//!   listing_url: https://www.hubermanlab.com/topics
//! transcripts:
//!   podcast_slug: huberman-lab
//!   min_transcript_chars: 800
//! waits:
//!   page_timeout_ms: 15000
//! ```

use crate::error::{Result, ScrapeError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrapeConfig {
    pub topics: TopicsConfig,
    pub transcripts: TranscriptsConfig,
    pub waits: WaitConfig,
    pub browser: BrowserConfig,
}

/// Topic listing and resource page settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TopicsConfig {
    /// Page listing every topic card.
    pub listing_url: String,
    /// Prefix for relative `href`s found on topic cards.
    pub base_domain: String,
    /// Selector for the topic card anchors.
    pub card_selector: String,
    /// Selector for the heading inside a card.
    pub card_title_selector: String,
    /// Selector for the container holding a topic's cited resources.
    pub resources_container_selector: String,
    /// Directory receiving the JSON output and extracted article texts.
    pub output_dir: PathBuf,
    /// Subdirectory of `output_dir` for clean article texts.
    pub texts_subdir: String,
    pub resources_file: String,
    pub clean_text_file: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://www.hubermanlab.com/topics".to_string(),
            base_domain: "https://www.hubermanlab.com".to_string(),
            card_selector: "a.topic-card".to_string(),
            card_title_selector: "h3".to_string(),
            resources_container_selector: "div.topics_resources-rich-text".to_string(),
            output_dir: PathBuf::from("huberman_resources"),
            texts_subdir: "resource_texts".to_string(),
            resources_file: "huberman_resources.json".to_string(),
            clean_text_file: "huberman_resources_with_clean_text.json".to_string(),
        }
    }
}

/// Podcast transcript site settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptsConfig {
    pub base_url: String,
    pub podcast_slug: String,
    /// Label of the tab revealing the transcript.
    pub tab_label: String,
    /// Selector for the transcript container.
    pub transcript_selector: String,
    /// Transcripts shorter than this many characters are treated as teasers.
    pub min_transcript_chars: usize,
    /// Lowercase phrase marking a subscriber-only page.
    pub premium_marker: String,
    pub output_dir: PathBuf,
}

impl Default for TranscriptsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://podscripts.co".to_string(),
            podcast_slug: "huberman-lab".to_string(),
            tab_label: "Transcript".to_string(),
            transcript_selector: "div[class*='podcast-transcript']".to_string(),
            min_transcript_chars: 500,
            premium_marker: "premium subscribers only".to_string(),
            output_dir: PathBuf::from("out"),
        }
    }
}

impl TranscriptsConfig {
    /// First page of the episode listing.
    pub fn starting_url(&self) -> String {
        format!(
            "{}/podcasts/{}",
            self.base_url.trim_end_matches('/'),
            self.podcast_slug
        )
    }

    /// Path fragment every episode link contains.
    pub fn episode_path_fragment(&self) -> String {
        format!("/podcasts/{}/", self.podcast_slug)
    }
}

/// Bounds for readiness polling.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaitConfig {
    /// Upper bound for a page's main content to render.
    pub page_timeout_ms: u64,
    /// Upper bound for optional elements such as the transcript tab.
    pub element_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            page_timeout_ms: 10_000,
            element_timeout_ms: 5_000,
            poll_interval_ms: 250,
        }
    }
}

impl WaitConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Chromium launch options.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Extra command line switches passed to Chromium.
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            args: vec![
                "--disable-blink-features=AutomationControlled".to_string(),
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
        }
    }
}

/// Load configuration from an optional YAML file, falling back to defaults.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&Path>) -> Result<ScrapeConfig> {
    let Some(path) = path else {
        return Ok(ScrapeConfig::default());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScrapeError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let config = parse_config(&raw).map_err(|e| ScrapeError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

fn parse_config(raw: &str) -> std::result::Result<ScrapeConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(ScrapeConfig::default());
    }
    serde_yaml::from_str(raw)
}
