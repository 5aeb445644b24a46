//! Secret Manager access through the gcloud CLI (NOT the REST API).
//!
//! # Authentication
//!
//! Reuses whatever credentials gcloud already holds (`gcloud auth login` or
//! application default credentials). Nothing is cached locally.
//!
//! # gcloud commands used
//!
//! - `gcloud secrets list` - enumerate secrets
//! - `gcloud secrets describe <id>` - secret metadata
//! - `gcloud secrets versions list <id>` - version history
//! - `gcloud secrets versions access <version> --secret=<id>` - raw payload
//! - `gcloud secrets versions add <id> --data-file=-` - new version, payload on stdin
//!
//! # Security
//!
//! Payloads travel over stdin/stdout only and are never logged.

use super::{version_id_from_name, Secret, SecretStore, SecretVersion, VersionSelector};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::io::Write;
use std::process::{Command, Stdio};

/// Why a gcloud invocation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The service answered NOT_FOUND
    NotFound(String),
    /// Anything else: auth, quota, network, missing binary
    Unavailable(String),
}

/// Store backed by the `gcloud` executable.
#[derive(Debug, Clone)]
pub struct GcloudStore {
    program: String,
    project: String,
}

impl GcloudStore {
    /// # Arguments
    ///
    /// * `program` - gcloud executable name or path
    /// * `project` - GCP project ID every call is scoped to
    pub fn new(program: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            project: project.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Run `gcloud secrets <args...>` and capture stdout.
    fn run(&self, args: &[&str], stdin: Option<&[u8]>) -> std::result::Result<Vec<u8>, Failure> {
        tracing::debug!(program = %self.program, ?args, project = %self.project, "running gcloud");

        let mut command = Command::new(&self.program);
        command
            .arg("secrets")
            .args(args)
            .arg(format!("--project={}", self.project))
            .arg("--quiet")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = command.spawn().map_err(|e| {
            Failure::Unavailable(format!(
                "failed to run '{}': {}. Install the Google Cloud CLI and run 'gcloud auth login'",
                self.program, e
            ))
        })?;

        if let (Some(data), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(data).map_err(|e| {
                Failure::Unavailable(format!("failed to write payload to gcloud stdin: {}", e))
            })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Failure::Unavailable(format!("failed to wait for gcloud: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(status = ?output.status.code(), "gcloud failed");
            return Err(classify_failure(&stderr));
        }

        Ok(output.stdout)
    }
}

impl SecretStore for GcloudStore {
    fn list_secrets(&self) -> Result<Vec<Secret>> {
        let stdout = self
            .run(&["list", "--format=json"], None)
            .map_err(|f| unavailable(f, "failed to list secrets"))?;
        parse_json(&stdout, "secret list")
    }

    fn get_secret_info(&self, secret_id: &str) -> Result<Secret> {
        self.run(&["describe", secret_id, "--format=json"], None)
            .map_err(|f| match f {
                Failure::NotFound(_) => Error::SecretNotFound(secret_id.to_string()),
                other => unavailable(other, "failed to get secret info"),
            })
            .and_then(|stdout| parse_json(&stdout, "secret metadata"))
    }

    fn list_secret_versions(&self, secret_id: &str) -> Result<Vec<SecretVersion>> {
        self.run(&["versions", "list", secret_id, "--format=json"], None)
            .map_err(|f| match f {
                Failure::NotFound(_) => Error::SecretNotFound(secret_id.to_string()),
                other => unavailable(other, "failed to list secret versions"),
            })
            .and_then(|stdout| parse_json(&stdout, "version list"))
    }

    fn get_secret_data(&self, secret_id: &str, version: VersionSelector) -> Result<Vec<u8>> {
        let version_arg = version.to_string();
        let secret_arg = format!("--secret={}", secret_id);

        self.run(&["versions", "access", &version_arg, &secret_arg], None)
            .map_err(|f| match f {
                Failure::NotFound(_) => Error::VersionNotFound {
                    secret: secret_id.to_string(),
                    version: version_arg.clone(),
                },
                other => unavailable(other, "failed to access secret version"),
            })
    }

    fn create_secret_version(&self, secret_id: &str, payload: &[u8]) -> Result<String> {
        #[derive(Deserialize)]
        struct Created {
            name: String,
        }

        let stdout = self
            .run(
                &["versions", "add", secret_id, "--data-file=-", "--format=json"],
                Some(payload),
            )
            .map_err(|f| match f {
                Failure::NotFound(_) => Error::SecretNotFound(secret_id.to_string()),
                other => unavailable(other, "failed to add secret version"),
            })?;

        let created: Created = parse_json(&stdout, "created version")?;
        Ok(version_id_from_name(&created.name).to_string())
    }
}

/// Classify a gcloud error from its stderr.
///
/// gcloud reports API errors as `ERROR: (gcloud.secrets.<cmd>) <STATUS>: <message>`.
pub fn classify_failure(stderr: &str) -> Failure {
    let message = stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("Unknown error")
        .to_string();

    if stderr.contains("NOT_FOUND") || stderr.contains("was not found") {
        Failure::NotFound(message)
    } else {
        Failure::Unavailable(message)
    }
}

fn unavailable(failure: Failure, context: &str) -> Error {
    match failure {
        Failure::NotFound(msg) | Failure::Unavailable(msg) => {
            Error::RemoteUnavailable(format!("{}: {}", context, msg))
        }
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(stdout: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(stdout).map_err(|e| {
        Error::RemoteUnavailable(format!("unexpected gcloud output for {}: {}", what, e))
    })
}
