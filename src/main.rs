//! `hostess` command-line entry point.

use std::io::Write;
use std::process::ExitCode;

use hostess::{Dispatcher, HostessError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the tracing subscriber.
///
/// `RUST_LOG` wins if set; otherwise only warnings from this crate are shown.
/// Logs go to stderr so they never mix with `list`/`show` output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hostess=warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn report(err: &HostessError, usage: Option<&str>) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "error: {err}");
    if let Some(hint) = err.hint() {
        let _ = writeln!(stderr, "{hint}");
    }
    if let Some(usage) = usage.filter(|_| err.wants_usage()) {
        let _ = writeln!(stderr);
        let _ = write!(stderr, "{usage}");
    }
}

fn main() -> ExitCode {
    init_tracing();

    let dispatcher = match Dispatcher::new() {
        Ok(d) => d,
        Err(e) => {
            report(&e, None);
            return ExitCode::from(e.exit_code());
        }
    };

    let mut argv = std::env::args().skip(1);
    let Some(command) = argv.next() else {
        print!("{}", dispatcher.usage());
        return ExitCode::SUCCESS;
    };
    let args: Vec<String> = argv.collect();
    tracing::debug!(command = %command, args = ?args, "hostess starting");

    let mut stdout = std::io::stdout().lock();
    match dispatcher.run(&command, &args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = stdout.flush();
            report(&e, Some(dispatcher.usage().as_str()));
            ExitCode::from(e.exit_code())
        }
    }
}
