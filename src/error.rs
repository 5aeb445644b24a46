//! Error kinds surfaced by the secret store, the edit session and the CLI.

use std::io;
use thiserror::Error;

/// Errors produced by the library.
///
/// Every variant renders as a user-readable message. Only
/// [`Error::DecodeInvalid`] is recoverable, through the retry prompt.
#[derive(Error, Debug)]
pub enum Error {
    #[error("secret {0:?} not found")]
    SecretNotFound(String),

    /// The secret exists but the requested version does not.
    #[error("secret {secret:?} has no version {version:?}")]
    VersionNotFound { secret: String, version: String },

    #[error("secret manager unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("{context}: {source}")]
    LocalIo {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid document: {0}")]
    DecodeInvalid(String),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::LocalIo {
            context: context.into(),
            source,
        }
    }

    /// True for both not-found kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SecretNotFound(_) | Error::VersionNotFound { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
