//! Topic pipeline: listing → resources → optional clean text.
//!
//! Stages run strictly in sequence. All topics are collected before any
//! topic page is visited.

use crate::browser::PageDriver;
use crate::config::{TopicsConfig, WaitConfig};
use crate::error::Result;
use crate::models::TopicRecord;
use crate::scrapers::{clean_text, topics};
use std::path::Path;
use tracing::{error, info, instrument};

/// Collect every topic and its resources.
///
/// When `texts_dir` is set, readable text for each linked resource is written
/// there and recorded in `clean_text_file`. A topic whose page fails to load
/// is logged and kept with no resources.
#[instrument(level = "info", skip_all, fields(clean_text = texts_dir.is_some()))]
pub async fn collect_topic_records<D: PageDriver>(
    driver: &mut D,
    cfg: &TopicsConfig,
    waits: &WaitConfig,
    texts_dir: Option<&Path>,
) -> Result<Vec<TopicRecord>> {
    let topic_list = topics::collect_topic_links(driver, cfg, waits).await?;

    let mut records = Vec::with_capacity(topic_list.len());
    for topic in topic_list {
        let mut resources = match topics::scrape_resources(driver, &topic, cfg, waits).await {
            Ok(resources) => resources,
            Err(e) => {
                error!(url = %topic.url, error = %e, "Failed to scrape topic; recording no resources");
                Vec::new()
            }
        };

        if let Some(dir) = texts_dir {
            let written = clean_text::attach_clean_texts(driver, &mut resources, dir, waits).await?;
            info!(topic = %topic.title, written, "Clean texts written");
        }
        records.push(TopicRecord::new(topic, resources));
    }

    let resource_count: usize = records.iter().map(|r| r.resources.len()).sum();
    info!(topics = records.len(), resources = resource_count, "Topic pipeline complete");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeDriver;

    const LISTING: &str = "https://www.hubermanlab.com/topics";

    fn fast_waits() -> WaitConfig {
        WaitConfig {
            page_timeout_ms: 20,
            element_timeout_ms: 20,
            poll_interval_ms: 1,
        }
    }

    fn listing() -> &'static str {
        r#"<html><body>
            <a class="topic-card" href="/topics/sleep"><h3>Sleep</h3></a>
            <a class="topic-card" href="/topics/broken"><h3>Broken</h3></a>
            <a class="topic-card" href="/topics/focus"><h3>Focus</h3></a>
        </body></html>"#
    }

    fn topic_page(items: &str) -> String {
        format!(
            "<html><body><div class=\"topics_resources-rich-text\"><h4>Articles</h4><ul>{items}</ul></div></body></html>"
        )
    }

    #[tokio::test]
    async fn test_records_follow_topic_order_and_keep_failed_topics() {
        let mut driver = FakeDriver::new()
            .page(LISTING, listing())
            .page(
                "https://www.hubermanlab.com/topics/sleep",
                &topic_page("<li>One</li><li>Two</li>"),
            )
            .page(
                "https://www.hubermanlab.com/topics/focus",
                &topic_page("<li>Three</li>"),
            );

        let records =
            collect_topic_records(&mut driver, &TopicsConfig::default(), &fast_waits(), None)
                .await
                .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].topic_title, "Sleep");
        assert_eq!(records[0].resources.len(), 2);
        assert_eq!(records[1].topic_title, "Broken");
        assert_eq!(records[1].topic_url, "https://www.hubermanlab.com/topics/broken");
        assert!(records[1].resources.is_empty());
        assert_eq!(records[2].topic_title, "Focus");
        assert_eq!(records[2].resources[0].section.as_deref(), Some("Articles"));
    }

    #[tokio::test]
    async fn test_one_record_per_topic_when_no_page_loads() {
        let mut driver = FakeDriver::new().page(
            LISTING,
            r#"<a class="topic-card" href="/topics/a"><h3>A</h3></a>
               <a class="topic-card" href="/topics/b"><h3>B</h3></a>"#,
        );

        let records =
            collect_topic_records(&mut driver, &TopicsConfig::default(), &fast_waits(), None)
                .await
                .unwrap();

        let titles: Vec<_> = records.iter().map(|r| r.topic_title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(records.iter().all(|r| r.resources.is_empty()));
    }

    #[tokio::test]
    async fn test_clean_text_failures_leave_field_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let mut driver = FakeDriver::new()
            .page(
                LISTING,
                r#"<a class="topic-card" href="/topics/sleep"><h3>Sleep</h3></a>"#,
            )
            .page(
                "https://www.hubermanlab.com/topics/sleep",
                &topic_page("<li><a href=\"https://unreachable.example/paper\">Paper</a></li><li>Plain</li>"),
            );

        let records = collect_topic_records(
            &mut driver,
            &TopicsConfig::default(),
            &fast_waits(),
            Some(tmp.path()),
        )
        .await
        .unwrap();

        assert_eq!(records[0].resources.len(), 2);
        assert!(records[0].resources.iter().all(|r| r.clean_text_file.is_none()));
        assert!(driver.visited.contains(&"https://unreachable.example/paper".to_string()));
    }
}
