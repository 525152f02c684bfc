//! JSON output for collected topic records.
//!
//! The document is an array with one object per topic:
//!
//! ```text
//! [
//!   {
//!     "topic_title": "Sleep",
//!     "topic_url": "https://www.hubermanlab.com/topics/sleep",
//!     "resources": [ { "section": "Articles", "title": ..., ... } ]
//!   }
//! ]
//! ```

use crate::models::TopicRecord;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `records` as pretty-printed JSON (two-space indent) to `path`.
///
/// Parent directories are created as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), topics = records.len()))]
pub async fn write_topics(records: &[TopicRecord], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    info!("Writing JSON");
    fs::write(path, json).await?;
    info!("Wrote topic records");
    Ok(())
}
