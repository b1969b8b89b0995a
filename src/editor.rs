//! External editor launch.
//!
//! The editor runs as a child process sharing this terminal. `hostess` waits
//! for it to exit before returning, so `create` can print its confirmation
//! after the user has finished editing.

use crate::error::{HostessError, Result};
use std::path::Path;
use std::process::Command;

/// An editor command line such as `vi` or `code --wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: String,
    args: Vec<String>,
}

impl Editor {
    /// Parses an `$EDITOR` value.
    ///
    /// If the whole (trimmed) value names an existing file it is used as the
    /// program, so paths containing spaces work unquoted. Otherwise it is
    /// split on whitespace: the first word is the program, the rest are
    /// passed before the file path. Shell quoting is not interpreted.
    #[must_use]
    pub fn new(command: &str) -> Self {
        let trimmed = command.trim();
        if trimmed.contains(char::is_whitespace) && Path::new(trimmed).is_file() {
            return Self {
                program: trimmed.to_string(),
                args: Vec::new(),
            };
        }

        let mut words = command.split_whitespace().map(str::to_string);
        Self {
            program: words.next().unwrap_or_default(),
            args: words.collect(),
        }
    }

    /// The program that will be spawned.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Leading arguments placed before the file path.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Opens `path` in the editor and blocks until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::EditorFailed`] if the program cannot be spawned
    /// or exits with a non-zero status.
    pub fn open(&self, path: &Path) -> Result<()> {
        tracing::debug!(
            editor = %self.program,
            path = %path.display(),
            "Launching editor"
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|e| self.failed(e.to_string()))?;

        if !status.success() {
            return Err(self.failed(status.to_string()));
        }
        Ok(())
    }

    fn failed(&self, reason: String) -> HostessError {
        let mut editor = self.program.clone();
        for arg in &self.args {
            editor.push(' ');
            editor.push_str(arg);
        }
        HostessError::EditorFailed { editor, reason }
    }
}
