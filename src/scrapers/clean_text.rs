//! Readable article text for cited resources.
//!
//! Each resource link is opened in the browser, the rendered markup is passed
//! through `dom_smoothie`'s Readability port, and the main content is
//! flattened to one text line per text node.
//!
//! Extraction is best effort: a failure is logged with the offending URL and
//! leaves the resource's `clean_text_file` empty.

use crate::browser::PageDriver;
use crate::config::WaitConfig;
use crate::error::{Result, ScrapeError};
use crate::models::Resource;
use crate::utils::{joined_text, sanitize_title};
use crate::wait::{self, Readiness};
use dom_smoothie::Readability;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Run Readability over a full page and flatten the article to plain text.
pub fn extract_clean_text(page_html: &str, url: &str) -> Result<String> {
    let mut reader = Readability::new(page_html, Some(url), None)
        .map_err(|e| ScrapeError::Readability(e.to_string()))?;
    let article = reader
        .parse()
        .map_err(|e| ScrapeError::Readability(e.to_string()))?;

    let fragment = Html::parse_fragment(&article.content);
    let text = joined_text(&fragment.root_element(), "\n");
    if text.is_empty() {
        return Err(ScrapeError::Readability("no readable content".to_string()));
    }
    Ok(text)
}

/// Load `url`, extract its readable text, and write it to `{title_safe}.txt`.
///
/// Returns the written path, or `None` on any failure.
#[instrument(level = "info", skip(driver, waits))]
pub async fn download_clean_text<D: PageDriver>(
    driver: &mut D,
    url: &str,
    save_dir: &Path,
    title_safe: &str,
    waits: &WaitConfig,
) -> Option<PathBuf> {
    match try_download(driver, url, save_dir, title_safe, waits).await {
        Ok(path) => {
            info!(%url, path = %path.display(), "Clean text extracted");
            Some(path)
        }
        Err(e) => {
            error!(%url, error = %e, "Failed to extract clean text");
            None
        }
    }
}

async fn try_download<D: PageDriver>(
    driver: &mut D,
    url: &str,
    save_dir: &Path,
    title_safe: &str,
    waits: &WaitConfig,
) -> Result<PathBuf> {
    driver.goto(url).await?;
    let readiness = wait::until(driver, waits.page_timeout(), waits.poll_interval(), |doc| {
        doc.select(&BODY)
            .next()
            .is_some_and(|body| body.text().any(|t| !t.trim().is_empty()))
    })
    .await?;
    let html = match readiness {
        Readiness::Ready(html) => html,
        Readiness::TimedOut(_) => {
            return Err(ScrapeError::Timeout {
                what: format!("content at {url}"),
                waited_ms: waits.page_timeout().as_millis(),
            });
        }
    };

    let text = extract_clean_text(&html, url)?;
    let path = save_dir.join(format!("{title_safe}.txt"));
    fs::write(&path, text).await?;
    Ok(path)
}

/// Extract clean text for every linked resource, filling `clean_text_file`.
///
/// Returns how many files were written.
#[instrument(level = "info", skip_all, fields(save_dir = %save_dir.display()))]
pub async fn attach_clean_texts<D: PageDriver>(
    driver: &mut D,
    resources: &mut [Resource],
    save_dir: &Path,
    waits: &WaitConfig,
) -> Result<usize> {
    fs::create_dir_all(save_dir).await?;

    let mut written = 0;
    for resource in resources.iter_mut() {
        let Some((title, url)) = resource.link() else {
            continue;
        };
        let (title_safe, url) = (sanitize_title(title), url.to_string());
        resource.clean_text_file =
            download_clean_text(driver, &url, save_dir, &title_safe, waits).await;
        if resource.clean_text_file.is_some() {
            written += 1;
        }
    }
    Ok(written)
}
