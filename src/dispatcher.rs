//! Binds set operations to CLI commands and runs them.

use crate::config::Config;
use crate::editor::Editor;
use crate::error::Result;
use crate::registry::{CommandBuilder, CommandTable};
use crate::set_store::SetStore;
use crate::util::is_elevated;
use std::io::Write;

/// Per-run state shared by every command handler.
#[derive(Debug)]
pub struct Session {
    /// The bootstrapped store.
    pub store: SetStore,
    /// The editor resolved from `$EDITOR`.
    pub editor: Editor,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Entry point for `hostess <command> [args...]`.
///
/// Holds the frozen command table. Every [`run`](Self::run) re-reads the
/// environment, bootstraps the store if needed, then dispatches.
pub struct Dispatcher {
    table: CommandTable<Session>,
    lookup: EnvLookup,
    privileged: fn() -> bool,
}

impl Dispatcher {
    /// Creates a dispatcher reading the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::DuplicateCommand`](crate::HostessError::DuplicateCommand)
    /// if the command table is inconsistent.
    pub fn new() -> Result<Self> {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a dispatcher resolving environment variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Ok(Self {
            table: commands()?,
            lookup: Box::new(lookup),
            privileged: is_elevated,
        })
    }

    /// Overrides the root check used by `use`.
    #[must_use]
    pub fn privilege_check(mut self, check: fn() -> bool) -> Self {
        self.privileged = check;
        self
    }

    /// The full usage text.
    #[must_use]
    pub fn usage(&self) -> String {
        self.table.usage()
    }

    /// The command table.
    #[must_use]
    pub const fn table(&self) -> &CommandTable<Session> {
        &self.table
    }

    /// Validates the environment, ensures the store exists, then runs
    /// `command` with `args`. User-facing output goes to `out`.
    ///
    /// # Errors
    ///
    /// Any [`HostessError`](crate::HostessError). Environment and bootstrap
    /// failures are reported before the command name is looked up.
    pub fn run(&self, command: &str, args: &[String], out: &mut dyn Write) -> Result<()> {
        let config = Config::from_lookup(&self.lookup)?;
        let store = SetStore::new(&config.store_dir)
            .live_file(&config.hosts_file)
            .privilege_check(self.privileged);
        store.ensure_store_exists()?;

        let session = Session {
            store,
            editor: Editor::new(&config.editor),
        };
        self.table.invoke(command, &session, out, args)
    }
}

fn commands() -> Result<CommandTable<Session>> {
    let mut builder = CommandBuilder::<Session>::new();

    builder.define_command(
        "create",
        "hostess create [name] : creates a new /etc/hosts set with the given name",
        1,
        |inv, args| {
            let name = &args[0];
            inv.context().store.create_set(name)?;
            inv.call("edit", args)?;

            let out = inv.out();
            writeln!(out, "Created a new set called {name}.")?;
            writeln!(out, "Use 'hostess use {name}' to activate it.")?;
            Ok(())
        },
    )?;

    builder.define_command(
        "delete",
        "hostess delete [name] : deletes the /etc/hosts set with the given name",
        1,
        |inv, args| inv.context().store.delete_set(&args[0]),
    )?;

    builder.define_command(
        "edit",
        "hostess edit [name]   : edits the /etc/hosts set with the given name",
        1,
        |inv, args| {
            let session = inv.context();
            session.store.edit_set(&args[0], &session.editor)
        },
    )?;

    builder.define_command(
        "list",
        "hostess list          : shows all available set names",
        0,
        |inv, _| {
            let mut sets = inv.context().store.available_sets()?;
            sets.sort();
            let out = inv.out();
            for set in sets {
                writeln!(out, "{set}")?;
            }
            Ok(())
        },
    )?;

    builder.define_command(
        "show",
        "hostess show [name]   : prints the contents of the given /etc/hosts set",
        1,
        |inv, args| {
            let data = inv.context().store.get_set_data(&args[0])?;
            let out = inv.out();
            out.write_all(&data)?;
            if data.last() != Some(&b'\n') {
                out.write_all(b"\n")?;
            }
            Ok(())
        },
    )?;

    builder.define_command(
        "use",
        "hostess use [name]    : uses the /etc/hosts set with the given name",
        1,
        |inv, args| inv.context().store.activate_set(&args[0]),
    )?;

    Ok(builder.build())
}
