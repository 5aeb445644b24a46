//! secret-edit - edit Google Cloud Secret Manager secrets in your editor.
//!
//! The latest version of a secret is fetched, converted from JSON to YAML
//! and opened in `$EDITOR`. When the editor exits the document is parsed
//! back, compared with the original and published as a new version only if
//! it changed. The temporary file never outlives the process.

pub mod cleaner;
pub mod codec;
pub mod config;
pub mod editor;
pub mod error;
pub mod list;
pub mod prompt;
pub mod session;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
