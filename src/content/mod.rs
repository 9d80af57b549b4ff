//! Content renderer
//!
//! Turns the site's content document into markup for the page's section
//! containers. Every content-sourced string is escaped on the way in.

pub mod document;
pub mod gallery;
pub mod page;
pub mod schema;
pub mod sections;
pub mod viewer;

pub use document::ContentDocument;
pub use page::{render_page, FormStatus, PageOptions};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("content document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("content document must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("structured data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("structured data must be a JSON object")]
    NotAnObject,
}
