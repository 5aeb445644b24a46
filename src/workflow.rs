//! The edit round trip: fetch a secret, let the operator edit it as YAML,
//! publish a new version only if something changed.
//!
//! ```text
//! Resolving -> Fetching -> AwaitingEdit -> Validating -> DiffChecking -> Publishing -> Done
//!                              ^               |
//!                              +-- retry ------+--> Aborted
//! ```
//!
//! `Aborted` is also reached when resolving or fetching fails or the
//! editor cannot be launched. Every exit path removes the temp file.

use crate::cleaner::CleanupGuard;
use crate::codec;
use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::prompt::RetryPrompt;
use crate::session::EditSession;
use crate::store::{validate_secret_id, SecretStore, VersionSelector};
use serde_json::Value;
use std::time::Duration;

/// Pause before opening an empty secret, so the operator notices that a
/// first version is about to be created.
pub const BOOTSTRAP_PAUSE: Duration = Duration::from_secs(3);

/// How an edit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new version was created
    Published { version: String },
    /// The edited document matched the original
    Unchanged,
    /// The operator declined to fix an invalid document
    Aborted,
}

/// One edit of one secret.
pub struct EditWorkflow<S, E, P> {
    store: S,
    editor: E,
    prompt: P,
    guard: CleanupGuard,
    version: VersionSelector,
    bootstrap_pause: Duration,
}

impl<S: SecretStore, E: Editor, P: RetryPrompt> EditWorkflow<S, E, P> {
    pub fn new(store: S, editor: E, prompt: P) -> Self {
        Self {
            store,
            editor,
            prompt,
            guard: CleanupGuard::new(),
            version: VersionSelector::Latest,
            bootstrap_pause: BOOTSTRAP_PAUSE,
        }
    }

    /// Share the cleanup guard with an interrupt watcher.
    pub fn with_guard(mut self, guard: CleanupGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Start from a specific version instead of `latest`.
    pub fn with_version(mut self, version: VersionSelector) -> Self {
        self.version = version;
        self
    }

    pub fn with_bootstrap_pause(mut self, pause: Duration) -> Self {
        self.bootstrap_pause = pause;
        self
    }

    /// Run the whole round trip for `secret_id`.
    pub fn run(mut self, secret_id: &str) -> Result<Outcome> {
        let result = self.edit(secret_id);
        self.guard.cleanup();
        result
    }

    fn edit(&mut self, secret_id: &str) -> Result<Outcome> {
        tracing::debug!(secret = secret_id, "resolving");
        validate_secret_id(secret_id)?;
        self.store.get_secret_info(secret_id)?;

        tracing::debug!(secret = secret_id, version = %self.version, "fetching");
        let payload = self.fetch(secret_id)?;

        let mut session = EditSession::create(payload, &self.guard)?;
        let Some(edited) = self.edit_until_valid(&mut session)? else {
            tracing::debug!("aborted by user");
            return Ok(Outcome::Aborted);
        };

        tracing::debug!("diff checking");
        if !session.is_changed(&edited) {
            return Ok(Outcome::Unchanged);
        }

        tracing::debug!(secret = secret_id, "publishing");
        let version = self
            .store
            .create_secret_version(secret_id, &codec::canonical(&edited))?;
        Ok(Outcome::Published { version })
    }

    /// Payload of the selected version. A secret with no versions at all
    /// yields an empty payload so its first version can be written.
    fn fetch(&self, secret_id: &str) -> Result<Vec<u8>> {
        match self.store.get_secret_data(secret_id, self.version) {
            Ok(payload) => Ok(payload),
            Err(Error::VersionNotFound { secret, version }) => {
                if self.version != VersionSelector::Latest
                    || !self.store.list_secret_versions(secret_id)?.is_empty()
                {
                    return Err(Error::VersionNotFound { secret, version });
                }
                eprintln!(
                    "⚠️  No versions found, creating new version for secret {:?}",
                    secret_id
                );
                std::thread::sleep(self.bootstrap_pause);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Loop between the editor and the decoder until the document parses
    /// or the operator gives up (`None`).
    fn edit_until_valid(&mut self, session: &mut EditSession) -> Result<Option<Value>> {
        loop {
            tracing::debug!("awaiting edit");
            self.editor.edit(session.path())?;

            tracing::debug!("validating");
            match session.reload() {
                Ok(value) => return Ok(Some(value)),
                Err(Error::DecodeInvalid(message)) => {
                    if !self.prompt.ask_retry(&message)? {
                        return Ok(None);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
