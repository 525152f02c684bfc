//! Bounded readiness polling.
//!
//! Instead of sleeping a fixed amount after navigation, callers poll the
//! rendered markup until a condition holds or a timeout expires. A timeout is
//! an ordinary outcome ([`Readiness::TimedOut`]), not an error; only driver
//! failures are errors.

use crate::browser::PageDriver;
use crate::error::{Result, ScrapeError};
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Outcome of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The condition held; carries the markup it held on.
    Ready(String),
    /// The condition never held; carries the last markup seen.
    TimedOut(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }

    /// The markup from the last poll, whatever the outcome.
    pub fn into_html(self) -> String {
        match self {
            Readiness::Ready(html) | Readiness::TimedOut(html) => html,
        }
    }
}

/// Poll the page until `condition` holds on the parsed document.
///
/// The page is always checked at least once, even with a zero timeout.
pub async fn until<D, F>(
    driver: &mut D,
    timeout: Duration,
    interval: Duration,
    mut condition: F,
) -> Result<Readiness>
where
    D: PageDriver,
    F: FnMut(&Html) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut polls = 0u32;
    loop {
        let html = driver.page_source().await?;
        polls += 1;
        if condition(&Html::parse_document(&html)) {
            debug!(polls, "Page ready");
            return Ok(Readiness::Ready(html));
        }
        if Instant::now() >= deadline {
            debug!(polls, timeout_ms = timeout.as_millis(), "Page not ready before timeout");
            return Ok(Readiness::TimedOut(html));
        }
        sleep(interval).await;
    }
}

/// Poll until at least one element matches `css`.
pub async fn until_present<D: PageDriver>(
    driver: &mut D,
    css: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<Readiness> {
    let selector = parse_selector(css)?;
    until(driver, timeout, interval, |doc| doc.select(&selector).next().is_some()).await
}

/// Parse a CSS selector, mapping failures into [`ScrapeError::Selector`].
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeDriver;

    const URL: &str = "https://example.com/";
    const TICK: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_ready_after_rendering() {
        let mut driver = FakeDriver::new().page_sequence(
            URL,
            &[
                "<html><body>loading</body></html>",
                "<html><body>loading</body></html>",
                "<html><body><div class='card'>x</div></body></html>",
            ],
        );
        driver.goto(URL).await.unwrap();

        let readiness = until_present(&mut driver, "div.card", Duration::from_secs(2), TICK)
            .await
            .unwrap();
        assert!(readiness.is_ready());
        assert!(readiness.into_html().contains("card"));
    }

    #[tokio::test]
    async fn test_times_out_with_last_snapshot() {
        let mut driver = FakeDriver::new().page(URL, "<html><body>empty</body></html>");
        driver.goto(URL).await.unwrap();

        let readiness = until_present(&mut driver, "div.card", Duration::from_millis(20), TICK)
            .await
            .unwrap();
        assert!(!readiness.is_ready());
        assert!(readiness.into_html().contains("empty"));
    }

    #[tokio::test]
    async fn test_zero_timeout_checks_once() {
        let mut driver = FakeDriver::new().page(URL, "<div class='card'></div>");
        driver.goto(URL).await.unwrap();

        let readiness = until_present(&mut driver, ".card", Duration::ZERO, TICK)
            .await
            .unwrap();
        assert!(readiness.is_ready());
    }

    #[tokio::test]
    async fn test_invalid_selector() {
        let mut driver = FakeDriver::new().page(URL, "<p></p>");
        driver.goto(URL).await.unwrap();

        let err = until_present(&mut driver, "div[", Duration::ZERO, TICK)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Selector(_)));
    }
}
