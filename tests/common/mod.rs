//! Common testing utilities for secret-edit integration tests.

use secret_edit::editor::Editor;
use secret_edit::prompt::RetryPrompt;
use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test context that manages temporary files and directories.
pub struct TestContext {
    /// Path to temporary directory
    pub temp_path: PathBuf,
    /// The temporary directory (kept to prevent early deletion)
    _temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with a temporary directory.
    #[allow(dead_code)]
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path().to_path_buf();

        Ok(Self {
            temp_path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a test file with content.
    #[allow(dead_code)]
    pub fn create_file(&self, name: &str, content: &str) -> anyhow::Result<PathBuf> {
        let file_path = self.temp_path.join(name);
        let mut file = fs::File::create(&file_path)?;
        file.write_all(content.as_bytes())?;
        Ok(file_path)
    }
}

/// What the scripted operator does on one editor launch.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Action {
    /// Save the file untouched
    Keep,
    /// Replace the whole document
    Write(String),
    /// Editor fails to start
    Fail,
}

/// Editor double that replays a script and records what it saw.
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    script: VecDeque<Action>,
    /// Temp file paths, one per launch
    pub paths: Vec<PathBuf>,
    /// File contents as opened, one per launch
    pub opened: Vec<String>,
}

impl ScriptedEditor {
    pub fn new(script: Vec<Action>) -> Self {
        Self {
            script: script.into(),
            ..Default::default()
        }
    }

    #[allow(dead_code)]
    pub fn launches(&self) -> usize {
        self.paths.len()
    }
}

impl Editor for ScriptedEditor {
    fn edit(&mut self, path: &Path) -> secret_edit::Result<()> {
        self.paths.push(path.to_path_buf());
        self.opened.push(fs::read_to_string(path).unwrap_or_default());

        match self.script.pop_front().unwrap_or(Action::Keep) {
            Action::Keep => Ok(()),
            Action::Write(text) => {
                fs::write(path, text).map_err(|e| secret_edit::Error::LocalIo {
                    context: "scripted editor".to_string(),
                    source: e,
                })
            }
            Action::Fail => Err(secret_edit::Error::LocalIo {
                context: "failed to run editor 'scripted'".to_string(),
                source: std::io::Error::other("editor exited with exit status: 1"),
            }),
        }
    }
}

/// Prompt double answering from a fixed list. Panics if asked too often.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    /// Error messages shown to the operator
    pub errors: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<bool>) -> Self {
        Self {
            answers: answers.into(),
            errors: Vec::new(),
        }
    }
}

impl RetryPrompt for ScriptedPrompt {
    fn ask_retry(&mut self, error: &str) -> secret_edit::Result<bool> {
        self.errors.push(error.to_string());
        Ok(self
            .answers
            .pop_front()
            .expect("prompt asked more often than scripted"))
    }
}

/// Temp files left behind by edit sessions, i.e. `scts-*.yml` files that
/// still exist among `paths`.
#[allow(dead_code)]
pub fn surviving(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().filter(|p| p.exists()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_context_create_file() {
        let ctx = TestContext::new().unwrap();
        let file_path = ctx.create_file("test.txt", "Hello, World!").unwrap();

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_scripted_editor_replays() {
        let ctx = TestContext::new().unwrap();
        let path = ctx.create_file("doc.yml", "a: 1\n").unwrap();
        let mut editor = ScriptedEditor::new(vec![Action::Write("a: 2\n".to_string()), Action::Fail]);

        editor.edit(&path).unwrap();
        assert!(editor.edit(&path).is_err());

        assert_eq!(editor.opened, vec!["a: 1\n".to_string(), "a: 2\n".to_string()]);
        assert_eq!(editor.launches(), 2);
    }
}
