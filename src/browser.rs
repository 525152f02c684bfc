//! Browser session and the page-driving abstraction used by every pipeline.
//!
//! The pipelines never talk to Chromium directly; they take a [`PageDriver`],
//! which lets tests substitute scripted HTML snapshots for a live browser.
//! [`BrowserSession`] is the production implementation, backed by
//! `chromiumoxide`. A session owns the browser process and its CDP event
//! handler task, and must be closed with [`BrowserSession::close`]. Dropping
//! an unclosed session still aborts the handler task.

use crate::config::BrowserConfig;
use crate::error::{Result, ScrapeError};
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::{Handler, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Minimal page operations the scrapers need.
pub trait PageDriver {
    /// Navigate the page to `url` and wait for the load to finish.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Current rendered markup of the whole document.
    async fn page_source(&mut self) -> Result<String>;

    /// Click the first element matching `xpath`.
    ///
    /// Returns `false` when no element matches.
    async fn click_xpath(&mut self, xpath: &str) -> Result<bool>;
}

/// A launched Chromium instance with a single working tab.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    closed: bool,
}

impl BrowserSession {
    /// Launch Chromium with the given options and open one blank tab.
    #[instrument(level = "info", skip_all, fields(headless = options.headless))]
    pub async fn launch(options: &BrowserConfig) -> Result<Self> {
        let mut builder = LaunchConfig::builder()
            .window_size(options.window_width, options.window_height)
            .args(options.args.iter().map(String::as_str));
        if !options.headless {
            builder = builder.with_head();
        }
        let launch_config = builder.build().map_err(ScrapeError::Browser)?;

        let (browser, handler) = Browser::launch(launch_config).await?;
        let handler_task = spawn_handler_task(handler);
        let page = browser.new_page("about:blank").await?;

        info!("Browser session started");
        Ok(Self {
            browser,
            page,
            handler_task,
            closed: false,
        })
    }

    /// Close the browser and stop the handler task.
    #[instrument(level = "info", skip_all)]
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Waiting for browser exit failed");
        }
        self.handler_task.abort();
        self.closed = true;
        info!("Browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Browser session dropped without close; aborting handler");
            self.handler_task.abort();
        }
    }
}

impl PageDriver for BrowserSession {
    #[instrument(level = "debug", skip(self))]
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    #[instrument(level = "debug", skip(self))]
    async fn click_xpath(&mut self, xpath: &str) -> Result<bool> {
        let script = format!(
            "(() => {{ const el = document.evaluate({}, document, null, \
             XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue; \
             if (!el) return false; el.click(); return true; }})()",
            serde_json::to_string(xpath)?
        );
        let clicked = self
            .page
            .evaluate(script)
            .await?
            .into_value::<bool>()
            .unwrap_or(false);
        debug!(clicked, "Evaluated click");
        Ok(clicked)
    }
}

fn spawn_handler_task(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!(error = %e, "CDP handler event error");
            }
        }
    })
}
