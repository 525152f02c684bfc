//! Output generation.
//!
//! - [`json`]: writes the collected topic records as one JSON document
//!
//! Text files for articles and transcripts are written by their scrapers as
//! each item completes.
//!
//! # Output Structure
//!
//! ```text
//! huberman_resources/
//! ├── huberman_resources.json
//! ├── huberman_resources_with_clean_text.json
//! └── resource_texts/
//!     └── Sleep_and_memory.txt
//! out/
//! └── episode-slug.txt
//! ```

pub mod json;
