//! Podcast transcript downloader for podscripts.co.
//!
//! # Phases
//!
//! 1. **Page count**: the largest purely numeric pagination link on the
//!    first listing page. Pagination that elides its last page number
//!    ("1 2 … 8" without "8") is undercounted; this is a known limitation.
//! 2. **Collection**: every listing page is scanned for episode links, which
//!    are deduplicated in an ordered set.
//! 3. **Download**: each episode is saved to `{slug}.txt` unless that file
//!    already exists. The transcript tab is clicked when present; the
//!    transcript container is preferred, with the page body as fallback.
//!
//! A failure on one episode is logged and never stops the run.

use crate::browser::PageDriver;
use crate::config::{TranscriptsConfig, WaitConfig};
use crate::error::Result;
use crate::models::Episode;
use crate::utils::{absolutize, normalize_whitespace, truncate_for_log, visible_text};
use crate::wait::{self, Readiness, parse_selector};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

static PAGE_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href*='?page=']").unwrap());
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Where saved transcript text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// The dedicated transcript container.
    Transcript,
    /// The whole page body.
    PageBody,
}

/// Result of processing one episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    Saved { path: PathBuf, source: TextSource },
    /// The output file exists from an earlier run; nothing was fetched.
    AlreadyPresent(PathBuf),
    /// The text was shorter than the configured minimum.
    TooShort { source: TextSource, chars: usize },
    /// The page is reserved for paying subscribers.
    PremiumOnly,
}

/// Whether the transcript tab was found and clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabOutcome {
    Clicked,
    NotFound,
}

/// Counts for one downloader run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub episodes: usize,
    pub saved: usize,
    pub already_present: usize,
    pub rejected: usize,
    pub failed: usize,
    /// `*.txt` files in the output directory at the end of the run.
    pub files_on_disk: usize,
}

/// URL of listing page `page` (1-based).
pub fn page_url(cfg: &TranscriptsConfig, page: u32) -> String {
    let start = cfg.starting_url();
    if page > 1 {
        format!("{start}?page={page}")
    } else {
        start
    }
}

/// Largest purely numeric pagination link text, or 1 when there is none.
pub fn detect_page_count(html: &str) -> u32 {
    let document = Html::parse_document(html);
    document
        .select(&PAGE_LINK)
        .filter_map(|link| {
            let text = normalize_whitespace(&link.text().collect::<String>());
            if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                text.parse::<u32>().ok()
            } else {
                None
            }
        })
        .fold(1, u32::max)
}

/// Episode links on one listing page, absolutized, excluding the listing root.
pub fn collect_episode_links(html: &str, cfg: &TranscriptsConfig) -> Result<Vec<String>> {
    let fragment = cfg.episode_path_fragment();
    let selector = parse_selector(&format!("a[href*='{fragment}']"))?;
    let start = cfg.starting_url();
    let start = start.trim_end_matches('/');
    let document = Html::parse_document(html);

    let mut links = Vec::new();
    for link in document.select(&selector) {
        let Some(href) = link.value().attr("href").map(str::trim) else {
            continue;
        };
        debug!(text = %normalize_whitespace(&link.text().collect::<String>()), %href, "Listing link");
        if href.is_empty() || !href.contains(&fragment) {
            continue;
        }
        let full_url = absolutize(href, &cfg.base_url);
        if full_url.trim_end_matches('/') == start {
            continue;
        }
        links.push(full_url);
    }
    Ok(links)
}

/// Load the first listing page and detect how many pages there are.
#[instrument(level = "info", skip_all)]
pub async fn discover_page_count<D: PageDriver>(
    driver: &mut D,
    cfg: &TranscriptsConfig,
    waits: &WaitConfig,
) -> Result<u32> {
    driver.goto(&cfg.starting_url()).await?;
    let readiness = wait_for_episode_links(driver, cfg, waits).await?;
    let pages = detect_page_count(&readiness.into_html());
    info!(pages, "Detected listing pages");
    Ok(pages)
}

/// Visit listing pages `1..=max_page` and gather unique episodes.
#[instrument(level = "info", skip(driver, cfg, waits))]
pub async fn collect_episodes<D: PageDriver>(
    driver: &mut D,
    cfg: &TranscriptsConfig,
    waits: &WaitConfig,
    max_page: u32,
) -> Result<BTreeSet<Episode>> {
    let mut urls = BTreeSet::new();
    for page in 1..=max_page {
        let url = page_url(cfg, page);
        info!(page, %url, "Fetching listing page");
        driver.goto(&url).await?;
        let readiness = wait_for_episode_links(driver, cfg, waits).await?;
        if !readiness.is_ready() {
            warn!(page, "No episode links rendered before timeout");
        }
        urls.extend(collect_episode_links(&readiness.into_html(), cfg)?);
    }

    let episodes: BTreeSet<Episode> = urls.into_iter().map(Episode::from_url).collect();
    info!(count = episodes.len(), "Total unique episodes found");
    Ok(episodes)
}

async fn wait_for_episode_links<D: PageDriver>(
    driver: &mut D,
    cfg: &TranscriptsConfig,
    waits: &WaitConfig,
) -> Result<Readiness> {
    let css = format!("a[href*='{}']", cfg.episode_path_fragment());
    wait::until_present(driver, &css, waits.page_timeout(), waits.poll_interval()).await
}

/// Click the `li` whose normalized text equals `label`, waiting for it first.
pub async fn open_transcript_tab<D: PageDriver>(
    driver: &mut D,
    label: &str,
    waits: &WaitConfig,
) -> Result<TabOutcome> {
    let readiness = wait::until(driver, waits.element_timeout(), waits.poll_interval(), |doc| {
        doc.select(&LIST_ITEM)
            .any(|li| normalize_whitespace(&li.text().collect::<String>()) == label)
    })
    .await?;
    if !readiness.is_ready() {
        return Ok(TabOutcome::NotFound);
    }

    let xpath = format!("//li[normalize-space()={}]", xpath_literal(label));
    if driver.click_xpath(&xpath).await? {
        Ok(TabOutcome::Clicked)
    } else {
        Ok(TabOutcome::NotFound)
    }
}

fn xpath_literal(s: &str) -> String {
    if s.contains('\'') {
        format!("\"{s}\"")
    } else {
        format!("'{s}'")
    }
}

/// Download one episode's transcript into `out_dir`.
#[instrument(level = "info", skip(driver, cfg, waits), fields(slug = %episode.slug))]
pub async fn download_transcript<D: PageDriver>(
    driver: &mut D,
    episode: &Episode,
    out_dir: &Path,
    cfg: &TranscriptsConfig,
    waits: &WaitConfig,
) -> Result<TranscriptOutcome> {
    let path = out_dir.join(episode.file_name());
    if fs::try_exists(&path).await? {
        debug!(path = %path.display(), "Transcript already saved");
        return Ok(TranscriptOutcome::AlreadyPresent(path));
    }

    driver.goto(&episode.url).await?;

    if open_transcript_tab(driver, &cfg.tab_label, waits).await? == TabOutcome::NotFound {
        info!(url = %episode.url, "No transcript tab; trying fallback scrape");
    }

    let container = parse_selector(&cfg.transcript_selector)?;
    let readiness = wait::until(driver, waits.element_timeout(), waits.poll_interval(), |doc| {
        doc.select(&container).next().is_some()
    })
    .await?;

    match readiness {
        Readiness::Ready(html) => {
            let text = first_visible_text(&html, &container);
            save_if_long_enough(&path, text.trim(), TextSource::Transcript, cfg).await
        }
        Readiness::TimedOut(html) => {
            info!(url = %episode.url, "No transcript container; falling back to page body");
            let page_text = first_visible_text(&html, &BODY);

            if page_text
                .to_lowercase()
                .contains(&cfg.premium_marker.to_lowercase())
            {
                info!(url = %episode.url, "Episode is premium-only; skipping");
                return Ok(TranscriptOutcome::PremiumOnly);
            }
            save_if_long_enough(&path, page_text.trim(), TextSource::PageBody, cfg).await
        }
    }
}

fn first_visible_text(html: &str, selector: &Selector) -> String {
    Html::parse_document(html)
        .select(selector)
        .next()
        .map(|el| visible_text(&el))
        .unwrap_or_default()
}

async fn save_if_long_enough(
    path: &Path,
    text: &str,
    source: TextSource,
    cfg: &TranscriptsConfig,
) -> Result<TranscriptOutcome> {
    let chars = text.chars().count();
    if chars < cfg.min_transcript_chars {
        info!(
            ?source,
            chars,
            preview = %truncate_for_log(text, 80),
            "Text suspiciously short; skipping"
        );
        return Ok(TranscriptOutcome::TooShort { source, chars });
    }
    fs::write(path, text).await?;
    info!(?source, path = %path.display(), "Saved transcript");
    Ok(TranscriptOutcome::Saved {
        path: path.to_path_buf(),
        source,
    })
}

/// Full downloader run: count pages, collect episodes, download each.
#[instrument(level = "info", skip_all, fields(out_dir = %out_dir.display()))]
pub async fn run<D: PageDriver>(
    driver: &mut D,
    cfg: &TranscriptsConfig,
    waits: &WaitConfig,
    out_dir: &Path,
) -> Result<RunSummary> {
    fs::create_dir_all(out_dir).await?;

    let max_page = discover_page_count(driver, cfg, waits).await?;
    let episodes = collect_episodes(driver, cfg, waits, max_page).await?;

    let mut summary = RunSummary {
        episodes: episodes.len(),
        ..Default::default()
    };
    for episode in &episodes {
        match download_transcript(driver, episode, out_dir, cfg, waits).await {
            Ok(TranscriptOutcome::Saved { .. }) => summary.saved += 1,
            Ok(TranscriptOutcome::AlreadyPresent(_)) => summary.already_present += 1,
            Ok(TranscriptOutcome::TooShort { .. } | TranscriptOutcome::PremiumOnly) => {
                summary.rejected += 1
            }
            Err(e) => {
                error!(url = %episode.url, error = %e, "Skipping episode");
                summary.failed += 1;
            }
        }
    }

    summary.files_on_disk = count_text_files(out_dir).await?;
    info!(
        saved = summary.saved,
        already_present = summary.already_present,
        rejected = summary.rejected,
        failed = summary.failed,
        files_on_disk = summary.files_on_disk,
        "Transcript download complete"
    );
    Ok(summary)
}

async fn count_text_files(dir: &Path) -> Result<usize> {
    let mut entries = fs::read_dir(dir).await?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.path().extension().is_some_and(|ext| ext == "txt") {
            count += 1;
        }
    }
    Ok(count)
}
