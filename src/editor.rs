//! Hand the session file to the operator's editor.

use crate::error::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Something that lets the operator modify a file in place.
pub trait Editor {
    /// Block until the file has been edited.
    fn edit(&mut self, path: &Path) -> Result<()>;
}

impl<E: Editor + ?Sized> Editor for &mut E {
    fn edit(&mut self, path: &Path) -> Result<()> {
        (**self).edit(path)
    }
}

/// An external editor process attached to the terminal.
///
/// The command may carry arguments (`code --wait`); the file path is always
/// appended last.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Split the command and resolve the program through PATH.
    fn resolve(&self) -> Result<(PathBuf, Vec<&str>)> {
        let mut words = self.command.split_whitespace();
        let program = words.next().ok_or_else(|| {
            Error::io(
                "failed to run editor",
                io::Error::new(io::ErrorKind::InvalidInput, "editor command is empty"),
            )
        })?;

        let resolved = which::which(program).map_err(|e| {
            Error::io(
                format!("failed to run editor '{}'", program),
                io::Error::new(io::ErrorKind::NotFound, e.to_string()),
            )
        })?;

        Ok((resolved, words.collect()))
    }
}

impl Editor for ExternalEditor {
    fn edit(&mut self, path: &Path) -> Result<()> {
        let (program, args) = self.resolve()?;
        tracing::debug!(editor = %program.display(), file = %path.display(), "launching editor");

        // stdin/stdout/stderr are inherited from the terminal
        let status = Command::new(&program)
            .args(&args)
            .arg(path)
            .status()
            .map_err(|e| Error::io(format!("failed to run editor '{}'", self.command), e))?;

        if !status.success() {
            return Err(Error::io(
                format!("failed to run editor '{}'", self.command),
                io::Error::other(format!("editor exited with {}", status)),
            ));
        }

        Ok(())
    }
}
