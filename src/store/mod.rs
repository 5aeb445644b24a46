//! Secret Manager client layer.
//!
//! # Resource hierarchy
//!
//! ```text
//! projects/<project>/secrets/<secret>/versions/<version>
//! ```
//!
//! Every store is bound to a single project. Versions are append-only:
//! nothing in this crate updates or destroys an existing version.
//!
//! # Backends
//!
//! - [`GcloudStore`] drives the `gcloud secrets` CLI
//! - [`MemoryStore`] keeps everything in process

pub mod gcloud;
pub mod memory;

pub use gcloud::GcloudStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Secret metadata as returned by Secret Manager.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    /// Fully qualified resource name, `projects/<p>/secrets/<id>`
    pub name: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
}

impl Secret {
    /// The secret id with the `projects/<p>/secrets/` prefix stripped.
    pub fn short_name(&self) -> &str {
        self.name.splitn(4, '/').nth(3).unwrap_or(&self.name)
    }
}

/// One immutable payload snapshot of a secret.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVersion {
    /// `projects/<p>/secrets/<id>/versions/<n>`
    pub name: String,

    /// ENABLED, DISABLED or DESTROYED
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
}

impl SecretVersion {
    /// The version ordinal, i.e. the last path segment.
    pub fn id(&self) -> &str {
        version_id_from_name(&self.name)
    }
}

/// Last segment of a version resource name.
pub fn version_id_from_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Which version of a secret to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionSelector {
    #[default]
    Latest,
    Number(u64),
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Latest => write!(f, "latest"),
            VersionSelector::Number(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for VersionSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(VersionSelector::Latest);
        }
        match s.parse::<u64>() {
            Ok(n) if n > 0 => Ok(VersionSelector::Number(n)),
            _ => Err(format!(
                "invalid version '{}': expected 'latest' or a positive number",
                s
            )),
        }
    }
}

/// Operations against one project's secrets.
///
/// Implementations never retry; every failure is returned to the caller.
pub trait SecretStore {
    /// All secrets of the project, in the order the service returns them.
    fn list_secrets(&self) -> Result<Vec<Secret>>;

    /// Metadata for one secret. [`Error::SecretNotFound`] if it does not exist.
    fn get_secret_info(&self, secret_id: &str) -> Result<Secret>;

    /// Every version of a secret, newest first.
    fn list_secret_versions(&self, secret_id: &str) -> Result<Vec<SecretVersion>>;

    /// Raw payload of a version. [`Error::VersionNotFound`] if the secret
    /// exists but has no such version.
    fn get_secret_data(&self, secret_id: &str, version: VersionSelector) -> Result<Vec<u8>>;

    /// Append a new version and return its id.
    fn create_secret_version(&self, secret_id: &str, payload: &[u8]) -> Result<String>;
}

impl<S: SecretStore + ?Sized> SecretStore for &S {
    fn list_secrets(&self) -> Result<Vec<Secret>> {
        (**self).list_secrets()
    }

    fn get_secret_info(&self, secret_id: &str) -> Result<Secret> {
        (**self).get_secret_info(secret_id)
    }

    fn list_secret_versions(&self, secret_id: &str) -> Result<Vec<SecretVersion>> {
        (**self).list_secret_versions(secret_id)
    }

    fn get_secret_data(&self, secret_id: &str, version: VersionSelector) -> Result<Vec<u8>> {
        (**self).get_secret_data(secret_id, version)
    }

    fn create_secret_version(&self, secret_id: &str, payload: &[u8]) -> Result<String> {
        (**self).create_secret_version(secret_id, payload)
    }
}

/// `projects/<project>/secrets/<id>`
pub fn secret_path(project: &str, secret_id: &str) -> String {
    format!("projects/{}/secrets/{}", project, secret_id)
}

/// Reject ids the service would refuse anyway, before any remote call.
pub fn validate_secret_id(secret_id: &str) -> Result<()> {
    let valid = !secret_id.is_empty()
        && secret_id.len() <= 255
        && secret_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::SecretNotFound(secret_id.to_string()))
    }
}
