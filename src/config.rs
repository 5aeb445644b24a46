// secret-edit configuration
//
// Optional defaults loaded from ~/.config/secret-edit/config.yaml. Command
// line flags and environment variables always take precedence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Editor used when neither `$EDITOR` nor the config names one
pub const DEFAULT_EDITOR: &str = "vim";

/// gcloud executable used when the config does not name one
pub const DEFAULT_GCLOUD: &str = "gcloud";

/// Main configuration structure
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default GCP project ID
    #[serde(default)]
    pub project: Option<String>,

    /// Editor command, used when $EDITOR is unset
    #[serde(default)]
    pub editor: Option<String>,

    /// Path or name of the gcloud executable
    #[serde(default)]
    pub gcloud: Option<String>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Parse configuration from YAML text. An empty document yields defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file, or the default location when `path` is None.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("project", &self.project),
            ("editor", &self.editor),
            ("gcloud", &self.gcloud),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                anyhow::bail!("Config field '{}' cannot be empty", field);
            }
        }
        Ok(())
    }

    /// Project from the command line wins over the config file
    pub fn project(&self, from_cli: Option<String>) -> Option<String> {
        from_cli
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.project.clone())
    }

    /// Editor command: `$EDITOR`, then the config, then [`DEFAULT_EDITOR`]
    pub fn editor(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|e| !e.trim().is_empty())
            .or_else(|| self.editor.clone())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
    }

    pub fn gcloud(&self) -> &str {
        self.gcloud.as_deref().unwrap_or(DEFAULT_GCLOUD)
    }
}

/// `~/.config/secret-edit/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("secret-edit").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_yaml("project: my-proj\neditor: nano\ngcloud: /opt/gcloud\n").unwrap();

        assert_eq!(config.project.as_deref(), Some("my-proj"));
        assert_eq!(config.editor.as_deref(), Some("nano"));
        assert_eq!(config.gcloud(), "/opt/gcloud");
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::default().gcloud(), DEFAULT_GCLOUD);
    }

    #[test]
    fn test_config_validation_empty_field() {
        assert!(Config::from_yaml("project: ''\n").is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::from_yaml("projet: typo\n").is_err());
    }

    #[test]
    fn test_project_precedence() {
        let config = Config {
            project: Some("from-config".to_string()),
            ..Default::default()
        };

        assert_eq!(config.project(Some("from-cli".to_string())).as_deref(), Some("from-cli"));
        assert_eq!(config.project(None).as_deref(), Some("from-config"));
        assert_eq!(Config::default().project(None), None);
    }

    #[test]
    fn test_editor_precedence() {
        let config = Config {
            editor: Some("nano".to_string()),
            ..Default::default()
        };

        assert_eq!(config.editor(Some("code --wait".to_string())), "code --wait");
        assert_eq!(config.editor(Some(String::new())), "nano");
        assert_eq!(Config::default().editor(None), DEFAULT_EDITOR);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"project: from-file\n").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.project.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        assert!(Config::load(Some(Path::new("/nonexistent/secret-edit.yaml"))).is_err());
    }
}
