//! The transient edit session and its backing temporary file.
//!
//! # Security
//!
//! - The file is created by `tempfile` (mode 0600 on Unix) in the system
//!   temp directory as `scts-<random>.yml`
//! - It is registered with a [`CleanupGuard`] before any payload is written
//! - Dropping the session removes it; so does the interrupt watcher

use crate::cleaner::CleanupGuard;
use crate::codec;
use crate::error::{Error, Result};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temp file name prefix
pub const FILE_PREFIX: &str = "scts-";

/// Temp file name suffix
pub const FILE_SUFFIX: &str = ".yml";

/// One editing round trip for one secret.
#[derive(Debug)]
pub struct EditSession {
    original_payload: Vec<u8>,
    original: Value,
    original_text: String,
    current_text: String,
    valid: bool,
    path: PathBuf,
    guard: CleanupGuard,
}

impl EditSession {
    /// Decode `payload`, render it as YAML and write it to a fresh temp file.
    pub fn create(payload: Vec<u8>, guard: &CleanupGuard) -> Result<Self> {
        let original = codec::decode_payload(&payload)?;
        let original_text = codec::to_editable(&original)?;

        let mut file = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .suffix(FILE_SUFFIX)
            .tempfile()
            .map_err(|e| Error::io("failed to create temp file", e))?;
        guard.arm(file.path().to_path_buf());

        file.write_all(original_text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| Error::io("failed to write YAML to temp file", e))?;

        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| Error::io("failed to keep temp file", e.error))?;
        tracing::debug!(path = %path.display(), "edit session created");

        Ok(Self {
            original_payload: payload,
            original,
            current_text: original_text.clone(),
            original_text,
            valid: true,
            path,
            guard: guard.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Payload bytes exactly as fetched.
    pub fn original_payload(&self) -> &[u8] {
        &self.original_payload
    }

    pub fn original(&self) -> &Value {
        &self.original
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    /// Whether the text read by the last [`reload`](Self::reload) decoded.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Re-read the temp file and decode it.
    ///
    /// Returns [`Error::DecodeInvalid`] if the text is not valid YAML (or
    /// not valid UTF-8); the session stays usable for another attempt.
    pub fn reload(&mut self) -> Result<Value> {
        let bytes = fs::read(&self.path).map_err(|e| Error::io("failed to read temp file", e))?;

        let decoded = String::from_utf8(bytes)
            .map_err(|_| Error::DecodeInvalid("edited file is not valid UTF-8".to_string()))
            .and_then(|text| {
                let value = codec::from_editable(&text);
                self.current_text = text;
                value
            });

        self.valid = decoded.is_ok();
        decoded
    }

    /// True when `edited` differs from the original at the canonical level.
    pub fn is_changed(&self, edited: &Value) -> bool {
        codec::canonical(edited) != codec::canonical(&self.original)
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        self.guard.cleanup();
    }
}
