//! Site scrapers, one module per pipeline stage.
//!
//! # Stages
//!
//! | Stage | Module | Site | Output |
//! |-------|--------|------|--------|
//! | Topic links and resources | [`topics`] | hubermanlab.com | [`Topic`](crate::models::Topic), [`Resource`](crate::models::Resource) |
//! | Readable article text | [`clean_text`] | any cited resource | `{title}.txt` |
//! | Episode transcripts | [`transcripts`] | podscripts.co | `{slug}.txt` |
//!
//! # Common Patterns
//!
//! Every stage takes a [`PageDriver`](crate::browser::PageDriver), polls for
//! the elements it needs instead of sleeping, and parses the rendered markup
//! with `scraper`. Per-item failures are logged and skipped.

pub mod clean_text;
pub mod topics;
pub mod transcripts;
