//! Helpers for text cleanup, file naming, URL handling, and file system checks.
//!
//! - Title sanitization and slug derivation for output file names
//! - Text flattening of parsed HTML elements
//! - Output directory validation

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Maximum length of a sanitized title used as a file stem.
pub const MAX_TITLE_CHARS: usize = 80;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Elements whose text never renders.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

/// Elements that start a new line in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Turn a resource title into a file stem.
///
/// Every character outside `[A-Za-z0-9]` becomes `_` and the result is
/// truncated to [`MAX_TITLE_CHARS`] characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_title("Sleep & Dopamine: Part 1!"), "Sleep___Dopamine__Part_1_");
/// ```
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// Last path segment of a URL with any query string removed.
pub fn slug_from_url(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(segment) = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        {
            return segment.to_string();
        }
    }
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.split('?').next().unwrap_or(last).to_string()
}

/// Prefix a relative `href` with `base`; absolute URLs pass through.
pub fn absolutize(href: &str, base: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    let base = base.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

/// Text nodes of `element`, each trimmed, empties dropped, joined by `sep`.
pub fn joined_text(element: &ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join(sep)
}

/// Approximate the rendered text of an element.
///
/// Hidden elements are skipped, runs of whitespace collapse to one space, and
/// block-level elements break lines. Blank lines are dropped.
pub fn visible_text(element: &ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible(element, &mut out);
    out.lines()
        .map(|line| WHITESPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .join("\n")
}

fn push_visible(element: &ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if HIDDEN_TAGS.contains(&name) {
        return;
    }
    let block = BLOCK_TAGS.contains(&name);
    if block {
        out.push('\n');
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&WHITESPACE.replace_all(text, " ")),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_visible(&child_el, out);
                }
            }
            _ => {}
        }
    }
    if block {
        out.push('\n');
    }
}

/// Collapse all whitespace runs to single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped characters.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", kept, total - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(css).unwrap()).next().unwrap()
    }

    #[test]
    fn test_sanitize_title_replaces_punctuation() {
        let safe = sanitize_title("Sleep & Dopamine: Part 1!");
        assert_eq!(safe, "Sleep___Dopamine__Part_1_");
        assert!(safe.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_sanitize_title_truncates() {
        let safe = sanitize_title(&"ab".repeat(100));
        assert_eq!(safe.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_sanitize_title_non_ascii() {
        let safe = sanitize_title("Café—naïve");
        assert_eq!(safe, "Caf__na_ve");
    }

    #[test]
    fn test_slug_from_url() {
        assert_eq!(
            slug_from_url("https://podscripts.co/podcasts/huberman-lab/ep-12-focus/"),
            "ep-12-focus"
        );
        assert_eq!(
            slug_from_url("https://podscripts.co/podcasts/huberman-lab/ep-12?ref=list"),
            "ep-12"
        );
        assert_eq!(slug_from_url("not a url/segment?x=1"), "segment");
    }

    #[test]
    fn test_absolutize() {
        let base = "https://www.hubermanlab.com";
        assert_eq!(absolutize("/topics/sleep", base), "https://www.hubermanlab.com/topics/sleep");
        assert_eq!(absolutize("topics/sleep", "https://x.com/"), "https://x.com/topics/sleep");
        assert_eq!(absolutize("https://other.org/a", base), "https://other.org/a");
    }

    #[test]
    fn test_joined_text() {
        let doc = Html::parse_fragment("<li> Walker M. <a> Why We Sleep </a> <em>Scribner</em></li>");
        let li = first(&doc, "li");
        assert_eq!(joined_text(&li, " "), "Walker M. Why We Sleep Scribner");
        assert_eq!(joined_text(&li, ""), "Walker M.Why We SleepScribner");
    }

    #[test]
    fn test_visible_text_skips_scripts_and_breaks_blocks() {
        let doc = Html::parse_document(
            "<html><head><title>t</title></head><body><script>var x = 1;</script>\
             <h1>Title</h1><p>First   line\n of text</p><div>Second <b>bold</b></div></body></html>",
        );
        let body = first(&doc, "body");
        assert_eq!(visible_text(&body), "Title\nFirst line of text\nSecond bold");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "é".repeat(50);
        let out = truncate_for_log(&long, 10);
        assert!(out.starts_with(&"é".repeat(10)));
        assert!(out.ends_with("(+40 chars)"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
