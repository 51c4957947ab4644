//! Utility modules for web, DOM, and formatting operations.
//!
//! Provides:
//! - [`markdown_to_html`] - Markdown rendering with XSS sanitization
//! - [`format`] - Sizes, dates, word counts and recycle bin badges
//! - [`file_types`] - Editable extensions and MIME lookup
//! - [`download`] - Blob construction and browser downloads
//! - [`log`] - `tracing` subscriber writing to the browser console

pub mod dom;
pub mod download;
pub mod file_types;
pub mod format;
pub mod log;
mod markdown;
pub mod time;

pub use markdown::{markdown_to_html, sanitize_html, text_to_html};
