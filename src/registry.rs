//! Command registration and dispatch.
//!
//! A [`CommandBuilder`] collects named commands, each with an exact argument
//! count and a usage line. [`CommandBuilder::build`] freezes them into a
//! [`CommandTable`] that checks arity before running a handler and can render
//! usage text in registration order.
//!
//! ```
//! use hostess::registry::CommandBuilder;
//! use std::io::Write;
//!
//! let mut builder = CommandBuilder::<()>::new();
//! builder
//!     .define_command("greet", "greet [name] : says hello", 1, |inv, args| {
//!         writeln!(inv.out(), "Hello, {}", args[0])?;
//!         Ok(())
//!     })
//!     .unwrap();
//! let table = builder.build();
//!
//! let mut out = Vec::new();
//! table.invoke("greet", &(), &mut out, &["Ada".to_string()]).unwrap();
//! assert_eq!(out, b"Hello, Ada\n");
//!
//! // Wrong arity never reaches the handler.
//! assert!(table.invoke("greet", &(), &mut out, &[]).is_err());
//! ```

use crate::error::{HostessError, Result};
use std::collections::HashMap;
use std::io::Write;

/// Reserved name of the synthesized usage command.
pub const PRINT_USAGE_COMMAND_NAME: &str = "printUsage";

/// First line of the usage text.
pub const USAGE_BANNER: &str = "usage: hostess [command] ...";

/// A command body. Receives the invocation (context, output, sibling
/// commands) and exactly `arity` arguments.
pub type Handler<C> = Box<dyn Fn(&mut Invocation<'_, C>, &[String]) -> Result<()>>;

struct Command<C> {
    name: String,
    usage_hint: String,
    arity: usize,
    handler: Handler<C>,
}

/// Accumulates command definitions until [`build`](Self::build).
pub struct CommandBuilder<C> {
    commands: Vec<Command<C>>,
}

impl<C> CommandBuilder<C> {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Registers a command.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::DuplicateCommand`] if `name` is already
    /// registered or is the reserved `printUsage`.
    pub fn define_command<F>(
        &mut self,
        name: &str,
        usage_hint: &str,
        arity: usize,
        handler: F,
    ) -> Result<&mut Self>
    where
        F: Fn(&mut Invocation<'_, C>, &[String]) -> Result<()> + 'static,
    {
        if name == PRINT_USAGE_COMMAND_NAME || self.commands.iter().any(|c| c.name == name) {
            return Err(HostessError::DuplicateCommand {
                command: name.to_string(),
            });
        }

        self.commands.push(Command {
            name: name.to_string(),
            usage_hint: usage_hint.to_string(),
            arity,
            handler: Box::new(handler),
        });
        Ok(self)
    }

    /// Freezes the registered commands into a callable table.
    #[must_use]
    pub fn build(self) -> CommandTable<C> {
        let index = self
            .commands
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        CommandTable {
            commands: self.commands,
            index,
        }
    }
}

impl<C> Default for CommandBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable name → command lookup, plus the synthesized `printUsage`.
pub struct CommandTable<C> {
    commands: Vec<Command<C>>,
    index: HashMap<String, usize>,
}

impl<C> CommandTable<C> {
    /// Runs `name` with `args` against `ctx`, writing output to `out`.
    ///
    /// # Errors
    ///
    /// - [`HostessError::UnknownCommand`] if nothing is registered as `name`.
    /// - [`HostessError::WrongArgumentCount`] if `args.len()` differs from the
    ///   command's arity. The handler is not run.
    /// - Whatever the handler returns.
    pub fn invoke(&self, name: &str, ctx: &C, out: &mut dyn Write, args: &[String]) -> Result<()> {
        if name == PRINT_USAGE_COMMAND_NAME {
            check_arity(name, 0, args)?;
            return self.print_usage(out);
        }

        let command = self
            .index
            .get(name)
            .map(|&i| &self.commands[i])
            .ok_or_else(|| HostessError::UnknownCommand {
                command: name.to_string(),
            })?;
        check_arity(name, command.arity, args)?;

        tracing::debug!(command = %name, args = ?args, "Dispatching command");
        let mut invocation = Invocation {
            table: self,
            ctx,
            out,
        };
        (command.handler)(&mut invocation, args)
    }

    /// Registered command names in registration order, without `printUsage`.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    /// Renders the banner followed by every usage hint in registration order.
    #[must_use]
    pub fn usage(&self) -> String {
        let mut text = format!("{USAGE_BANNER}\n\nCommands:\n");
        for command in &self.commands {
            text.push_str("  ");
            text.push_str(&command.usage_hint);
            text.push('\n');
        }
        text.push('\n');
        text
    }

    /// Writes [`usage`](Self::usage) to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`HostessError::Io`] if writing fails.
    pub fn print_usage(&self, out: &mut dyn Write) -> Result<()> {
        out.write_all(self.usage().as_bytes())?;
        Ok(())
    }
}

fn check_arity(name: &str, expected: usize, args: &[String]) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(HostessError::WrongArgumentCount {
            command: name.to_string(),
            expected,
            actual: args.len(),
        })
    }
}

/// What a running handler can reach: its context, the output stream, and the
/// table it was dispatched from.
pub struct Invocation<'a, C> {
    table: &'a CommandTable<C>,
    ctx: &'a C,
    out: &'a mut dyn Write,
}

impl<C> Invocation<'_, C> {
    /// The shared context the table was invoked with.
    #[must_use]
    pub const fn context(&self) -> &C {
        self.ctx
    }

    /// Output stream for user-facing text.
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Invokes a sibling command with the same context and output, including
    /// its arity check.
    ///
    /// # Errors
    ///
    /// Same as [`CommandTable::invoke`].
    pub fn call(&mut self, name: &str, args: &[String]) -> Result<()> {
        self.table.invoke(name, self.ctx, &mut *self.out, args)
    }
}
