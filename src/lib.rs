//! # hostess
//!
//! Keep several named versions ("sets") of `/etc/hosts` and switch between
//! them.
//!
//! Sets live as `<name>.set` files in a store directory (`$HOSTESS_DIR`, or
//! `~/.hostess`). On first use the store is created and the current
//! `/etc/hosts` is saved as the set `original`, so there is always a way back.
//!
//! ## Quick start
//!
//! ```bash
//! hostess create staging      # opens $EDITOR on a fresh template
//! hostess list                # original, staging
//! hostess show staging
//! sudo hostess use staging    # copy it over /etc/hosts
//! sudo hostess use original   # and back
//! hostess delete staging
//! ```
//!
//! ## Library use
//!
//! ```rust,no_run
//! use hostess::Dispatcher;
//!
//! let dispatcher = Dispatcher::new()?;
//! dispatcher.run("list", &[], &mut std::io::stdout())?;
//! # Ok::<(), hostess::HostessError>(())
//! ```
//!
//! Commands are declared through [`registry::CommandBuilder`], which enforces
//! an exact argument count per command and renders the usage text.
//!
//! ## Permissions
//!
//! Only `use` touches `/etc/hosts` and it refuses to run unless the effective
//! user is root. Everything else works on the caller's own store.
//!
//! ## Concurrency
//!
//! A store is meant to be used by one `hostess` process at a time. Concurrent
//! runs may race on `create`/`delete`; only the first-run bootstrap is atomic.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod registry;
pub mod set_store;
pub mod util;

pub use config::Config;
pub use dispatcher::{Dispatcher, Session};
pub use editor::Editor;
pub use error::{HostessError, Result};
pub use set_store::SetStore;
