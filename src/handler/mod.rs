//! Request handler module
//!
//! Responsible for request routing dispatch: the rendered home page, static
//! files from the site root, and the JSON API.

mod page;
pub mod router;
mod static_files;

// Re-export main entry point
pub use router::handle_request;
