//! In-process secret store.
//!
//! Mirrors the semantics of the real service (ordered listing, append-only
//! versions, distinct not-found kinds) without any network access. Intended
//! for tests and dry runs; prefer [`super::GcloudStore`] for real projects.

use super::{secret_path, Secret, SecretStore, SecretVersion, VersionSelector};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct Entry {
    secret: Secret,
    versions: Vec<Vec<u8>>,
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<Entry>,
    unavailable: bool,
    create_calls: usize,
}

/// Secret store held entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    project: String,
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Add a secret with no versions.
    pub fn add_secret(
        &self,
        secret_id: &str,
        labels: BTreeMap<String, String>,
        create_time: Option<DateTime<Utc>>,
    ) {
        self.lock().entries.push(Entry {
            secret: Secret {
                name: secret_path(&self.project, secret_id),
                labels,
                create_time,
            },
            versions: Vec::new(),
        });
    }

    /// Add a secret whose first version holds `payload`.
    pub fn with_secret(self, secret_id: &str, payload: &[u8]) -> Self {
        self.add_secret(secret_id, BTreeMap::new(), None);
        self.push_version(secret_id, payload);
        self
    }

    /// Append a version directly, bypassing the create counter.
    pub fn push_version(&self, secret_id: &str, payload: &[u8]) {
        let name = secret_path(&self.project, secret_id);
        if let Some(entry) = self.lock().entries.iter_mut().find(|e| e.secret.name == name) {
            entry.versions.push(payload.to_vec());
        }
    }

    /// Make every call fail with [`Error::RemoteUnavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Number of successful [`SecretStore::create_secret_version`] calls.
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    /// All payloads of a secret, oldest first.
    pub fn versions(&self, secret_id: &str) -> Vec<Vec<u8>> {
        let name = secret_path(&self.project, secret_id);
        self.lock()
            .entries
            .iter()
            .find(|e| e.secret.name == name)
            .map(|e| e.versions.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Plain data, safe to reuse after a poisoning panic
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_entry<T>(
        &self,
        secret_id: &str,
        f: impl FnOnce(&mut Entry, &mut usize) -> Result<T>,
    ) -> Result<T> {
        let name = secret_path(&self.project, secret_id);
        let mut state = self.lock();
        if state.unavailable {
            return Err(Error::RemoteUnavailable("memory store offline".to_string()));
        }
        let State {
            entries,
            create_calls,
            ..
        } = &mut *state;
        let entry = entries
            .iter_mut()
            .find(|e| e.secret.name == name)
            .ok_or_else(|| Error::SecretNotFound(secret_id.to_string()))?;
        f(entry, create_calls)
    }
}

impl SecretStore for MemoryStore {
    fn list_secrets(&self) -> Result<Vec<Secret>> {
        let state = self.lock();
        if state.unavailable {
            return Err(Error::RemoteUnavailable("memory store offline".to_string()));
        }
        Ok(state.entries.iter().map(|e| e.secret.clone()).collect())
    }

    fn get_secret_info(&self, secret_id: &str) -> Result<Secret> {
        self.with_entry(secret_id, |entry, _| Ok(entry.secret.clone()))
    }

    fn list_secret_versions(&self, secret_id: &str) -> Result<Vec<SecretVersion>> {
        self.with_entry(secret_id, |entry, _| {
            Ok((1..=entry.versions.len())
                .rev()
                .map(|n| SecretVersion {
                    name: format!("{}/versions/{}", entry.secret.name, n),
                    state: Some("ENABLED".to_string()),
                    create_time: None,
                })
                .collect())
        })
    }

    fn get_secret_data(&self, secret_id: &str, version: VersionSelector) -> Result<Vec<u8>> {
        self.with_entry(secret_id, |entry, _| {
            let payload = match version {
                VersionSelector::Latest => entry.versions.last(),
                VersionSelector::Number(n) => usize::try_from(n)
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|idx| entry.versions.get(idx)),
            };
            payload.cloned().ok_or_else(|| Error::VersionNotFound {
                secret: secret_id.to_string(),
                version: version.to_string(),
            })
        })
    }

    fn create_secret_version(&self, secret_id: &str, payload: &[u8]) -> Result<String> {
        self.with_entry(secret_id, |entry, create_calls| {
            entry.versions.push(payload.to_vec());
            *create_calls += 1;
            Ok(entry.versions.len().to_string())
        })
    }
}
