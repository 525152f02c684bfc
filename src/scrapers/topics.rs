//! Topic listing and topic resource scraper.
//!
//! The topics listing renders client-side, so each stage waits for its
//! anchor elements before parsing the page markup.
//!
//! # Resource Layout
//!
//! A topic page lists its citations inside a rich-text container: `h4`
//! headings followed by `ul` lists. Every `li` becomes one [`Resource`] tagged
//! with the most recent heading.

use crate::browser::PageDriver;
use crate::config::{TopicsConfig, WaitConfig};
use crate::error::Result;
use crate::models::{Resource, Topic};
use crate::utils::{absolutize, joined_text, normalize_whitespace};
use crate::wait::{self, Readiness, parse_selector};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

/// Title used when a card has no heading.
pub const UNTITLED: &str = "Untitled";

static SECTION_OR_LIST: Lazy<Selector> = Lazy::new(|| Selector::parse("h4, ul").unwrap());
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static EMPHASIS: Lazy<Selector> = Lazy::new(|| Selector::parse("em").unwrap());

/// Load the topics listing and collect every topic card.
///
/// If no card renders before the timeout, the outcome is logged and whatever
/// the page holds is parsed, which normally yields no topics.
#[instrument(level = "info", skip_all, fields(url = %cfg.listing_url))]
pub async fn collect_topic_links<D: PageDriver>(
    driver: &mut D,
    cfg: &TopicsConfig,
    waits: &WaitConfig,
) -> Result<Vec<Topic>> {
    driver.goto(&cfg.listing_url).await?;
    let readiness = wait::until_present(
        driver,
        &cfg.card_selector,
        waits.page_timeout(),
        waits.poll_interval(),
    )
    .await?;
    if !readiness.is_ready() {
        warn!(selector = %cfg.card_selector, "Topic cards did not render before timeout");
    }

    let topics = parse_topic_cards(&readiness.into_html(), cfg)?;
    info!(count = topics.len(), "Found topics");
    Ok(topics)
}

/// Extract topics from listing markup, in document order.
pub fn parse_topic_cards(html: &str, cfg: &TopicsConfig) -> Result<Vec<Topic>> {
    let card_selector = parse_selector(&cfg.card_selector)?;
    let title_selector = parse_selector(&cfg.card_title_selector)?;
    let document = Html::parse_document(html);

    let mut topics = Vec::new();
    for card in document.select(&card_selector) {
        let href = card.value().attr("href").map(str::trim).unwrap_or_default();
        let title = match card.select(&title_selector).next() {
            Some(heading) => normalize_whitespace(&heading.text().collect::<String>()),
            None => UNTITLED.to_string(),
        };

        if href.is_empty() || title.is_empty() {
            debug!(%href, %title, "Skipping incomplete topic card");
            continue;
        }
        topics.push(Topic {
            title,
            url: absolutize(href, &cfg.base_domain),
        });
    }
    Ok(topics)
}

/// Load a topic page and extract its cited resources.
///
/// A page without the resources container yields an empty list.
#[instrument(level = "info", skip_all, fields(topic = %topic.title, url = %topic.url))]
pub async fn scrape_resources<D: PageDriver>(
    driver: &mut D,
    topic: &Topic,
    cfg: &TopicsConfig,
    waits: &WaitConfig,
) -> Result<Vec<Resource>> {
    driver.goto(&topic.url).await?;
    let readiness = wait::until_present(
        driver,
        &cfg.resources_container_selector,
        waits.page_timeout(),
        waits.poll_interval(),
    )
    .await?;

    let resources = match readiness {
        Readiness::Ready(html) => parse_resources(&html, &cfg.resources_container_selector)?,
        Readiness::TimedOut(_) => {
            warn!("No resources container on topic page");
            Vec::new()
        }
    };
    info!(count = resources.len(), "Found resources for topic");
    Ok(resources)
}

/// Walk the resources container of a topic page.
///
/// Headings and lists are visited in document order. Each heading replaces
/// the current section; each list contributes one [`Resource`] per `li`.
pub fn parse_resources(html: &str, container_css: &str) -> Result<Vec<Resource>> {
    let container_selector = parse_selector(container_css)?;
    let document = Html::parse_document(html);
    let Some(container) = document.select(&container_selector).next() else {
        return Ok(Vec::new());
    };

    let mut current_section: Option<String> = None;
    let mut resources = Vec::new();
    for elem in container.select(&SECTION_OR_LIST) {
        match elem.value().name() {
            "h4" => current_section = Some(joined_text(&elem, "")),
            _ => {
                for item in elem.select(&LIST_ITEM) {
                    resources.push(resource_from_item(&item, current_section.clone()));
                }
            }
        }
    }
    Ok(resources)
}

fn resource_from_item(item: &ElementRef<'_>, section: Option<String>) -> Resource {
    let mut resource = Resource {
        section,
        full_text: joined_text(item, " "),
        ..Default::default()
    };

    if let Some(link) = item.select(&ANCHOR).next() {
        resource.title = Some(joined_text(&link, ""));
        resource.url = link.value().attr("href").map(str::to_string);
    }
    if let Some(em) = item.select(&EMPHASIS).next() {
        resource.source_info = Some(joined_text(&em, ""));
    }
    resource
}
