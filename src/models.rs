//! Data models produced by the scraping pipelines.
//!
//! - [`Topic`]: a category page found on the topics listing
//! - [`Resource`]: one cited reference on a topic page
//! - [`TopicRecord`]: a topic together with its resources, as written to JSON
//! - [`Episode`]: a podcast episode URL and the slug used as its filename

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A topic card collected from the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Topic {
    pub title: String,
    /// Absolute URL of the topic page.
    pub url: String,
}

/// A cited reference found in a topic's resources container.
///
/// `title` and `url` are only set when the list item contains a link.
/// `clean_text_file` is only set by the clean-text pipeline after the
/// article text was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Resource {
    /// Text of the closest preceding heading, if any.
    pub section: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    /// Citation text, taken from the item's `<em>`.
    pub source_info: Option<String>,
    /// All of the item's text, space-joined.
    pub full_text: String,
    pub clean_text_file: Option<PathBuf>,
}

impl Resource {
    /// Title and URL, when the item is a navigable link with a title.
    pub fn link(&self) -> Option<(&str, &str)> {
        match (self.title.as_deref(), self.url.as_deref()) {
            (Some(title), Some(url)) if !title.is_empty() && !url.is_empty() => Some((title, url)),
            _ => None,
        }
    }
}

/// One element of the top-level JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TopicRecord {
    pub topic_title: String,
    pub topic_url: String,
    pub resources: Vec<Resource>,
}

impl TopicRecord {
    pub fn new(topic: Topic, resources: Vec<Resource>) -> Self {
        Self {
            topic_title: topic.title,
            topic_url: topic.url,
            resources,
        }
    }
}

/// A podcast episode page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Episode {
    pub url: String,
    pub slug: String,
}

impl Episode {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let slug = crate::utils::slug_from_url(&url);
        Self { url, slug }
    }

    /// File name the transcript is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.slug)
    }
}
