//! File-backed store of named hosts sets.
//!
//! Each set lives at `<store>/<name>.set`. The store also holds a `README`
//! marker. Activating a set copies it over the live hosts file.

use crate::editor::Editor;
use crate::error::{HostessError, Result};
use crate::util::is_elevated;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extension of set files. Never part of a set's logical name.
pub const SET_FILE_EXTENSION: &str = "set";

/// Name of the set seeded from the live hosts file on first run.
pub const ORIGINAL_SET_NAME: &str = "original";

/// README marker written into a freshly created store.
pub const README_FILENAME: &str = "README";

/// Content of every newly created set.
pub const TEMPLATE_SET: &str = "# Host set created by hostess
127.0.0.1 localhost
255.255.255.255 broadcasthost
::1             localhost
fe80::1%lo0 localhost";

const TEMPLATE_README: &str = "Created by Hostess\nhttps://github.com/shinypb/hostess\n";

/// Manages a directory of `.set` files and the live hosts file they replace.
///
/// # Lifecycle
///
/// 1. [`ensure_store_exists`](Self::ensure_store_exists) creates the store on
///    first use and seeds the `original` set from the live file.
/// 2. [`create_set`](Self::create_set) adds a set from a fixed template.
/// 3. [`activate_set`](Self::activate_set) overwrites the live file (root only).
/// 4. [`delete_set`](Self::delete_set) removes a set without confirmation.
///
/// # Concurrency
///
/// Only serialized, single-process use is supported. Two invocations racing
/// on `create`/`delete` against one store may observe each other's partial
/// work.
///
/// # Example
///
/// ```rust,no_run
/// use hostess::SetStore;
///
/// let store = SetStore::new("/home/ops/.hostess");
/// store.ensure_store_exists()?;
/// store.create_set("staging")?;
/// store.activate_set("staging")?; // requires root
/// # Ok::<(), hostess::HostessError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SetStore {
    dir: PathBuf,
    live_file: PathBuf,
    privileged: fn() -> bool,
}

impl SetStore {
    /// Creates a store rooted at `dir`, targeting `/etc/hosts`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            live_file: PathBuf::from(crate::config::DEFAULT_HOSTS_FILE),
            privileged: is_elevated,
        }
    }

    /// Overrides the live hosts file (useful for testing).
    #[must_use]
    pub fn live_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.live_file = path.into();
        self
    }

    /// Overrides the privilege check consulted by [`activate_set`](Self::activate_set).
    #[must_use]
    pub fn privilege_check(mut self, check: fn() -> bool) -> Self {
        self.privileged = check;
        self
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the live hosts file path.
    #[must_use]
    pub fn live_file_path(&self) -> &Path {
        &self.live_file
    }

    /// Path of the file backing `name`.
    #[must_use]
    pub fn set_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{SET_FILE_EXTENSION}"))
    }

    /// Creates the store on first use.
    ///
    /// The README and the `original` set are written into a staging directory
    /// beside the store, which is then renamed into place. A failure part-way
    /// leaves no store behind, so the next run starts over.
    ///
    /// Returns `true` if this call created the store, `false` if it already
    /// existed.
    ///
    /// # Errors
    ///
    /// - [`HostessError::DirectoryIsAFile`] if the path exists but is not a
    ///   directory.
    /// - [`HostessError::DirectoryCreateFailed`] if the directory cannot be
    ///   created.
    /// - [`HostessError::Io`] if the live file cannot be read or the seed
    ///   files cannot be written.
    pub fn ensure_store_exists(&self) -> Result<bool> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => return Ok(false),
            Ok(_) => {
                return Err(HostessError::DirectoryIsAFile {
                    path: self.dir.clone(),
                });
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        if let Some(parent) = self.dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.create_failed(&e))?;
        }

        self.sweep_stale_staging();
        let staging = self.staging_dir();
        fs::create_dir(&staging).map_err(|e| self.create_failed(&e))?;

        if let Err(e) = self.seed(&staging) {
            remove_staging(&staging);
            return Err(e);
        }

        if let Err(e) = fs::rename(&staging, &self.dir) {
            remove_staging(&staging);
            if self.dir.is_dir() {
                tracing::debug!(dir = %self.dir.display(), "Store appeared concurrently");
                return Ok(false);
            }
            return Err(self.create_failed(&e));
        }

        if !self.dir.is_dir() {
            return Err(HostessError::DirectoryCreateFailed {
                path: self.dir.clone(),
                reason: "directory missing after creation".to_string(),
            });
        }

        tracing::info!(
            dir = %self.dir.display(),
            live_file = %self.live_file.display(),
            "Created hostess store and seeded original set"
        );
        Ok(true)
    }

    /// Lists the names of all persisted sets, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::Io`] if the store cannot be read.
    pub fn available_sets(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = set_name_of(&path) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Returns `true` if a set called `name` is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::Io`] if the store cannot be read.
    pub fn set_exists(&self, name: &str) -> Result<bool> {
        Ok(self.available_sets()?.iter().any(|n| n == name))
    }

    /// Fails unless a set called `name` is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::SetNotFound`] if it is absent.
    pub fn ensure_set_exists(&self, name: &str) -> Result<()> {
        if self.set_exists(name)? {
            Ok(())
        } else {
            tracing::debug!(set = %name, "Set lookup failed");
            Err(HostessError::SetNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Writes a new set from [`TEMPLATE_SET`] and returns its path.
    ///
    /// Opening the new set in an editor is left to the caller; the `create`
    /// command chains into `edit`.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::InvalidSetName`] for names that are not
    /// filesystem-safe, [`HostessError::SetAlreadyExists`] if the name is
    /// taken, or [`HostessError::Io`] on write failure.
    pub fn create_set(&self, name: &str) -> Result<PathBuf> {
        validate_set_name(name)?;
        if self.set_exists(name)? {
            return Err(HostessError::SetAlreadyExists {
                name: name.to_string(),
            });
        }

        let path = self.set_path(name);
        fs::write(&path, TEMPLATE_SET)?;
        tracing::info!(set = %name, path = %path.display(), "Created set");
        Ok(path)
    }

    /// Removes the set immediately. There is no confirmation and no undo.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::SetNotFound`] or [`HostessError::Io`].
    pub fn delete_set(&self, name: &str) -> Result<()> {
        self.ensure_set_exists(name)?;
        fs::remove_file(self.set_path(name))?;
        tracing::info!(set = %name, "Deleted set");
        Ok(())
    }

    /// Opens the set in `editor` (by absolute path) and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::SetNotFound`] or [`HostessError::EditorFailed`].
    pub fn edit_set(&self, name: &str, editor: &Editor) -> Result<()> {
        self.ensure_set_exists(name)?;
        editor.open(&std::path::absolute(self.set_path(name))?)
    }

    /// Returns the set's raw bytes. Sets copied from a live file need not be
    /// valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::SetNotFound`] or [`HostessError::Io`].
    pub fn get_set_data(&self, name: &str) -> Result<Vec<u8>> {
        self.ensure_set_exists(name)?;
        Ok(fs::read(self.set_path(name))?)
    }

    /// Overwrites the live hosts file with the set's bytes.
    ///
    /// The set itself is unchanged. The privilege check runs before the live
    /// file is touched.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::SetNotFound`], [`HostessError::NotRoot`] when
    /// the caller is not root, or [`HostessError::Io`].
    pub fn activate_set(&self, name: &str) -> Result<()> {
        self.ensure_set_exists(name)?;
        if !(self.privileged)() {
            tracing::debug!(set = %name, "Refusing to activate set without root");
            return Err(HostessError::NotRoot {
                name: name.to_string(),
            });
        }

        let data = self.get_set_data(name)?;
        fs::write(&self.live_file, &data)?;
        tracing::info!(
            set = %name,
            live_file = %self.live_file.display(),
            bytes = data.len(),
            "Activated set"
        );
        Ok(())
    }

    fn seed(&self, staging: &Path) -> Result<()> {
        fs::write(staging.join(README_FILENAME), TEMPLATE_README)?;
        let original = fs::read(&self.live_file)?;
        fs::write(
            staging.join(format!("{ORIGINAL_SET_NAME}.{SET_FILE_EXTENSION}")),
            original,
        )?;
        Ok(())
    }

    /// Removes `<store>.staging-*` leftovers from bootstraps that were killed
    /// part-way, whatever PID they belonged to.
    fn sweep_stale_staging(&self) {
        let Some(store_name) = self.dir.file_name() else {
            return;
        };
        let prefix = format!("{}.staging-", store_name.to_string_lossy());
        let parent = match self.dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let Ok(entries) = fs::read_dir(parent) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with(&prefix) && entry.path().is_dir() {
                tracing::debug!(path = %entry.path().display(), "Removing stale staging directory");
                remove_staging(&entry.path());
            }
        }
    }

    fn staging_dir(&self) -> PathBuf {
        let mut name = OsString::from(self.dir.as_os_str());
        name.push(format!(".staging-{}", std::process::id()));
        PathBuf::from(name)
    }

    fn create_failed(&self, e: &std::io::Error) -> HostessError {
        HostessError::DirectoryCreateFailed {
            path: self.dir.clone(),
            reason: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Name helpers
// ---------------------------------------------------------------------------

/// Strips the `.set` extension from a store entry, if it has one.
fn set_name_of(path: &Path) -> Option<&str> {
    if path.extension()?.to_str()? != SET_FILE_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str().filter(|s| !s.is_empty())
}

/// Rejects names that would escape the store or hide from listing.
fn validate_set_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(['/', '\\']) {
        "contains a path separator"
    } else if name.contains('\0') {
        "contains a NUL byte"
    } else if name.starts_with('.') {
        "starts with a dot"
    } else {
        return Ok(());
    };
    Err(HostessError::InvalidSetName {
        name: name.to_string(),
        reason,
    })
}

fn remove_staging(staging: &Path) {
    if let Err(e) = fs::remove_dir_all(staging) {
        tracing::warn!(
            path = %staging.display(),
            error = %e,
            "Failed to remove staging directory"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIVE: &str = "127.0.0.1 localhost\n10.0.0.5 db.internal\n";

    fn store_in(root: &Path) -> SetStore {
        let live = root.join("hosts");
        fs::write(&live, LIVE).unwrap();
        SetStore::new(root.join("store"))
            .live_file(live)
            .privilege_check(|| true)
    }

    fn bootstrapped(root: &Path) -> SetStore {
        let store = store_in(root);
        assert!(store.ensure_store_exists().unwrap());
        store
    }

    #[test]
    fn bootstrap_seeds_original_and_readme() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());

        assert_eq!(store.available_sets().unwrap(), vec![ORIGINAL_SET_NAME]);
        assert_eq!(store.get_set_data(ORIGINAL_SET_NAME).unwrap(), LIVE.as_bytes());
        let readme = fs::read_to_string(store.dir().join(README_FILENAME)).unwrap();
        assert_eq!(readme, TEMPLATE_README);
        assert!(!store.staging_dir().exists());
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());

        // Change everything the first run wrote; a second run must not redo it.
        fs::write(store.set_path(ORIGINAL_SET_NAME), "edited").unwrap();
        fs::write(store.dir().join(README_FILENAME), "mine").unwrap();
        fs::write(store.live_file_path(), "changed live").unwrap();

        assert!(!store.ensure_store_exists().unwrap());
        assert_eq!(store.get_set_data(ORIGINAL_SET_NAME).unwrap(), b"edited");
        assert_eq!(
            fs::read_to_string(store.dir().join(README_FILENAME)).unwrap(),
            "mine"
        );
    }

    #[test]
    fn bootstrap_rejects_file_at_store_path() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        fs::write(store.dir(), "not a dir").unwrap();

        let err = store.ensure_store_exists().unwrap_err();
        assert!(matches!(err, HostessError::DirectoryIsAFile { .. }));
    }

    #[test]
    fn bootstrap_failure_leaves_no_store() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SetStore::new(tmp.path().join("store")).live_file(tmp.path().join("missing"));

        let err = store.ensure_store_exists().unwrap_err();
        assert!(matches!(err, HostessError::Io(_)));
        assert!(!store.dir().exists());
        assert!(!store.staging_dir().exists());

        // Once the live file appears, the next run completes the bootstrap.
        fs::write(tmp.path().join("missing"), LIVE).unwrap();
        assert!(store.ensure_store_exists().unwrap());
        assert_eq!(store.get_set_data(ORIGINAL_SET_NAME).unwrap(), LIVE.as_bytes());
    }

    #[test]
    fn bootstrap_sweeps_stale_staging_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        let stale = tmp.path().join("store.staging-999999999");
        fs::create_dir(&stale).unwrap();
        fs::write(stale.join(README_FILENAME), "half-written").unwrap();
        let unrelated = tmp.path().join("other.staging-1");
        fs::create_dir(&unrelated).unwrap();

        assert!(store.ensure_store_exists().unwrap());
        assert!(!stale.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn symlinked_store_dir_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("dotfiles-hostess");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("work.set"), "10.0.0.1 work\n").unwrap();
        std::os::unix::fs::symlink(&real, tmp.path().join("store")).unwrap();

        let store = store_in(tmp.path());
        assert!(!store.ensure_store_exists().unwrap());
        assert_eq!(store.available_sets().unwrap(), vec!["work"]);
        assert!(!real.join(format!("{ORIGINAL_SET_NAME}.set")).exists());
    }

    #[test]
    fn set_data_is_raw_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let live = tmp.path().join("hosts");
        fs::write(&live, b"# caf\xe9 router\n127.0.0.1 localhost\n").unwrap();
        let store = SetStore::new(tmp.path().join("store")).live_file(live);

        store.ensure_store_exists().unwrap();
        assert_eq!(
            store.get_set_data(ORIGINAL_SET_NAME).unwrap(),
            b"# caf\xe9 router\n127.0.0.1 localhost\n"
        );
    }

    #[test]
    fn bootstrap_creates_missing_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let live = tmp.path().join("hosts");
        fs::write(&live, LIVE).unwrap();
        let store = SetStore::new(tmp.path().join("a/b/store")).live_file(live);
        assert!(store.ensure_store_exists().unwrap());
        assert!(store.dir().is_dir());
    }

    #[test]
    fn create_lists_without_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());

        let path = store.create_set("foo").unwrap();
        assert_eq!(path, store.dir().join("foo.set"));

        let sets = store.available_sets().unwrap();
        assert!(sets.contains(&"foo".to_string()));
        assert!(sets.iter().all(|s| !s.ends_with(".set")));
        assert!(store.set_exists("foo").unwrap());
    }

    #[test]
    fn create_seeds_template() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());
        store.create_set("x").unwrap();
        assert_eq!(store.get_set_data("x").unwrap(), TEMPLATE_SET.as_bytes());
    }

    #[test]
    fn create_existing_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());
        let err = store.create_set(ORIGINAL_SET_NAME).unwrap_err();
        assert!(matches!(err, HostessError::SetAlreadyExists { ref name } if name == "original"));
        assert_eq!(store.get_set_data(ORIGINAL_SET_NAME).unwrap(), LIVE.as_bytes());
    }

    #[test]
    fn create_rejects_unsafe_names() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());
        for name in ["", "../etc", "a/b", ".hidden", "..", "nul\0"] {
            let err = store.create_set(name).unwrap_err();
            assert!(
                matches!(err, HostessError::InvalidSetName { .. }),
                "{name:?} accepted"
            );
        }
    }

    #[test]
    fn listing_ignores_foreign_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());
        fs::write(store.dir().join("notes.txt"), "").unwrap();
        fs::write(store.dir().join(".set"), "").unwrap();
        fs::create_dir(store.dir().join("dir.set")).unwrap();

        assert_eq!(store.available_sets().unwrap(), vec![ORIGINAL_SET_NAME]);
    }

    #[test]
    fn delete_removes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());
        store.create_set("gone").unwrap();
        store.delete_set("gone").unwrap();
        assert!(!store.set_path("gone").exists());
        assert!(!store.set_exists("gone").unwrap());
    }

    #[test]
    fn missing_set_operations_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());

        assert!(matches!(
            store.delete_set("nope").unwrap_err(),
            HostessError::SetNotFound { .. }
        ));
        assert!(matches!(
            store.get_set_data("nope").unwrap_err(),
            HostessError::SetNotFound { .. }
        ));
        assert!(matches!(
            store.activate_set("nope").unwrap_err(),
            HostessError::SetNotFound { .. }
        ));
        assert!(matches!(
            store.edit_set("nope", &Editor::new("true")).unwrap_err(),
            HostessError::SetNotFound { .. }
        ));
    }

    #[test]
    fn activate_copies_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());
        store.create_set("alpha").unwrap();
        fs::write(store.set_path("alpha"), b"10.1.1.1 alpha\n\xff\n").unwrap();

        store.activate_set("alpha").unwrap();
        assert_eq!(
            fs::read(store.live_file_path()).unwrap(),
            b"10.1.1.1 alpha\n\xff\n"
        );
        assert_eq!(
            fs::read(store.set_path("alpha")).unwrap(),
            b"10.1.1.1 alpha\n\xff\n"
        );
    }

    #[test]
    fn activate_requires_privilege() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path()).privilege_check(|| false);
        store.create_set("alpha").unwrap();

        let err = store.activate_set("alpha").unwrap_err();
        assert!(matches!(err, HostessError::NotRoot { .. }));
        assert_eq!(fs::read_to_string(store.live_file_path()).unwrap(), LIVE);
    }

    #[test]
    fn edit_runs_editor_on_set_path() {
        let tmp = tempfile::tempdir().unwrap();
        let store = bootstrapped(tmp.path());
        store.edit_set(ORIGINAL_SET_NAME, &Editor::new("true")).unwrap();

        let err = store
            .edit_set(ORIGINAL_SET_NAME, &Editor::new("false"))
            .unwrap_err();
        assert!(matches!(err, HostessError::EditorFailed { .. }));
    }
}
