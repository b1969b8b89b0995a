//! Environment configuration.

use crate::error::{HostessError, Result};
use std::path::PathBuf;

/// Editor program used by `edit` and `create`.
pub const EDITOR_VAR: &str = "EDITOR";

/// Home directory; the store defaults to `$HOME/.hostess`.
pub const HOME_VAR: &str = "HOME";

/// Explicit store directory override.
pub const STORE_DIR_VAR: &str = "HOSTESS_DIR";

/// Live hosts file override.
pub const HOSTS_FILE_VAR: &str = "HOSTESS_HOSTS_FILE";

/// Default live hosts file.
pub const DEFAULT_HOSTS_FILE: &str = "/etc/hosts";

/// Store directory name under `$HOME`.
const DEFAULT_STORE_DIR_NAME: &str = ".hostess";

/// Resolved environment inputs.
///
/// # Example
///
/// ```
/// use hostess::Config;
///
/// let config = Config::from_lookup(|key| match key {
///     "EDITOR" => Some("vi".to_string()),
///     "HOME" => Some("/home/ops".to_string()),
///     _ => None,
/// })
/// .unwrap();
///
/// assert_eq!(config.editor, "vi");
/// assert_eq!(config.store_dir, std::path::Path::new("/home/ops/.hostess"));
/// assert_eq!(config.hosts_file, std::path::Path::new("/etc/hosts"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Editor command line (program plus optional leading arguments).
    pub editor: String,

    /// Directory holding the `.set` files and the README marker.
    pub store_dir: PathBuf,

    /// The live hosts file that `use` overwrites.
    pub hosts_file: PathBuf,
}

impl Config {
    /// Creates a config with the default live hosts file.
    #[must_use]
    pub fn new(editor: impl Into<String>, store_dir: impl Into<PathBuf>) -> Self {
        Self {
            editor: editor.into(),
            store_dir: store_dir.into(),
            hosts_file: PathBuf::from(DEFAULT_HOSTS_FILE),
        }
    }

    /// Resolves the config through `lookup`.
    ///
    /// `EDITOR` is required. The store directory is `HOSTESS_DIR` if set,
    /// otherwise `$HOME/.hostess`. Empty and whitespace-only values count as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::InvalidEnvironment`] naming the first missing
    /// variable (`EDITOR`, then `HOME`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let editor = get(EDITOR_VAR).ok_or_else(|| missing(EDITOR_VAR))?;

        let store_dir = match get(STORE_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = get(HOME_VAR).ok_or_else(|| missing(HOME_VAR))?;
                PathBuf::from(home).join(DEFAULT_STORE_DIR_NAME)
            }
        };

        let mut config = Self::new(editor, store_dir);
        if let Some(hosts) = get(HOSTS_FILE_VAR) {
            config.hosts_file = PathBuf::from(hosts);
        }
        Ok(config)
    }
}

fn missing(variable: &str) -> HostessError {
    HostessError::InvalidEnvironment {
        variable: variable.to_string(),
    }
}
