//! Error types.
//!
//! Every failure is fatal at the CLI boundary. The library only returns
//! [`HostessError`]; the binary turns it into a message, an optional hint and
//! a per-kind exit code (see [`HostessError::exit_code`]).

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for hostess operations.
pub type Result<T> = std::result::Result<T, HostessError>;

/// Errors returned by hostess operations.
#[derive(Debug, Error)]
pub enum HostessError {
    /// Filesystem I/O failed (typically `PermissionDenied` on the live file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is unset or empty.
    #[error("Missing {variable} environment variable.")]
    InvalidEnvironment {
        /// Name of the first missing variable.
        variable: String,
    },

    /// The store path exists but is not a directory.
    #[error("Configuration path {} exists, but is not a directory.", .path.display())]
    DirectoryIsAFile {
        /// The store path.
        path: PathBuf,
    },

    /// The store directory could not be created.
    #[error("Failed to create configuration directory at {}: {reason}", .path.display())]
    DirectoryCreateFailed {
        /// The store path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A command was invoked with the wrong number of arguments.
    #[error("Wrong number of arguments for {command} (expected {expected}, got {actual}).")]
    WrongArgumentCount {
        /// The command name.
        command: String,
        /// Declared arity.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// No command is registered under this name.
    #[error("Unknown command {command}.")]
    UnknownCommand {
        /// The requested name.
        command: String,
    },

    /// A command name was registered twice, or collides with `printUsage`.
    #[error("Command named {command} already exists.")]
    DuplicateCommand {
        /// The offending name.
        command: String,
    },

    /// The named set is not in the store.
    #[error("There is no set called {name}.")]
    SetNotFound {
        /// The set name.
        name: String,
    },

    /// A set with this name already exists.
    #[error("There is already a set called {name}.")]
    SetAlreadyExists {
        /// The set name.
        name: String,
    },

    /// Activating a set requires root.
    #[error("Activating a set requires root privileges.")]
    NotRoot {
        /// The set the caller tried to activate.
        name: String,
    },

    /// The editor could not be launched or exited unsuccessfully.
    #[error("Editor {editor} failed: {reason}")]
    EditorFailed {
        /// The editor command line.
        editor: String,
        /// Spawn error or exit status.
        reason: String,
    },

    /// The set name is not usable as a file name.
    #[error("Invalid set name {name:?}: {reason}")]
    InvalidSetName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl HostessError {
    /// Process exit code for this error kind. Distinct per variant.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) => 1,
            Self::InvalidEnvironment { .. } => 2,
            Self::DirectoryIsAFile { .. } => 3,
            Self::DirectoryCreateFailed { .. } => 4,
            Self::WrongArgumentCount { .. } => 5,
            Self::SetNotFound { .. } => 6,
            Self::SetAlreadyExists { .. } => 7,
            Self::NotRoot { .. } => 8,
            Self::UnknownCommand { .. } => 9,
            Self::DuplicateCommand { .. } => 10,
            Self::EditorFailed { .. } => 11,
            Self::InvalidSetName { .. } => 12,
        }
    }

    /// Suggested remediation command, if there is an obvious one.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::SetNotFound { name } => Some(format!("Try 'hostess create {name}' first?")),
            Self::SetAlreadyExists { name } => Some(format!("Try 'hostess edit {name}' instead?")),
            Self::NotRoot { name } => Some(format!("Try 'sudo hostess use {name}' instead.")),
            _ if self.is_permission_denied() => {
                Some("Check the file permissions, or retry with sudo.".to_string())
            }
            _ => None,
        }
    }

    /// Whether the binary should follow this error with the full usage text.
    #[must_use]
    pub const fn wants_usage(&self) -> bool {
        matches!(
            self,
            Self::WrongArgumentCount { .. } | Self::UnknownCommand { .. }
        )
    }

    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn every_kind() -> Vec<HostessError> {
        vec![
            HostessError::Io(std::io::Error::other("boom")),
            HostessError::InvalidEnvironment {
                variable: "EDITOR".into(),
            },
            HostessError::DirectoryIsAFile {
                path: PathBuf::from("/tmp/x"),
            },
            HostessError::DirectoryCreateFailed {
                path: PathBuf::from("/tmp/x"),
                reason: "nope".into(),
            },
            HostessError::WrongArgumentCount {
                command: "show".into(),
                expected: 1,
                actual: 0,
            },
            HostessError::UnknownCommand {
                command: "frob".into(),
            },
            HostessError::DuplicateCommand {
                command: "list".into(),
            },
            HostessError::SetNotFound { name: "a".into() },
            HostessError::SetAlreadyExists { name: "a".into() },
            HostessError::NotRoot { name: "a".into() },
            HostessError::EditorFailed {
                editor: "vi".into(),
                reason: "exit status: 1".into(),
            },
            HostessError::InvalidSetName {
                name: "a/b".into(),
                reason: "contains a path separator",
            },
        ]
    }

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let codes: Vec<u8> = every_kind().iter().map(HostessError::exit_code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        let unique: HashSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn hints_name_the_set() {
        let err = HostessError::SetNotFound {
            name: "work".into(),
        };
        assert_eq!(err.hint().unwrap(), "Try 'hostess create work' first?");

        let err = HostessError::NotRoot {
            name: "work".into(),
        };
        assert_eq!(err.hint().unwrap(), "Try 'sudo hostess use work' instead.");

        assert!(HostessError::UnknownCommand { command: "x".into() }.hint().is_none());
    }

    #[test]
    fn wrong_argument_count_names_command() {
        let err = HostessError::WrongArgumentCount {
            command: "show".into(),
            expected: 1,
            actual: 3,
        };
        assert!(err.to_string().contains("show"));
        assert!(err.wants_usage());
    }

    #[test]
    fn permission_denied_detection() {
        let err = HostessError::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(err.is_permission_denied());
        assert_eq!(
            err.hint().unwrap(),
            "Check the file permissions, or retry with sudo."
        );
        assert!(!HostessError::NotRoot { name: "a".into() }.is_permission_denied());
        assert!(HostessError::Io(std::io::Error::other("boom")).hint().is_none());
    }
}
