//! Internal utilities.

/// Checks whether the process runs with an effective UID of root.
///
/// Uses `geteuid()`, so `sudo hostess use ...` counts as elevated while a
/// setuid-less login shell of the same user does not.
#[must_use]
pub fn is_elevated() -> bool {
    // SAFETY: `geteuid()` has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}
