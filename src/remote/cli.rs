//! Process-level front shared by the `ssh-stress` and `ssh-exec` binaries.
//!
//! This is the only code that turns errors into an exit status. The library
//! below it returns `Result`s and never terminates the process.

use std::io::{self, Write};
use std::process::ExitCode;

use dotenv::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::remote::auth::TerminalPrompt;
use crate::remote::client::SshConnector;
use crate::remote::compose::ScriptTemplate;
use crate::remote::config::TransportConfig;
use crate::remote::error::Error;
use crate::remote::profile::LoadProfile;
use crate::remote::run::run;
use crate::remote::types::{ExecutionResult, InvocationShape};

/// Install the tracing subscriber: `RUST_LOG` filter, `info` by default, on stderr.
pub fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Run the binary for `shape` with the process arguments and report the outcome.
pub async fn main_with(shape: InvocationShape) -> ExitCode {
    dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let connector = SshConnector::new(TransportConfig::from_env());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = run(
        &args,
        shape,
        &ScriptTemplate::load_test(),
        LoadProfile::default(),
        &TerminalPrompt,
        &connector,
        &mut out,
    )
    .await;

    report(outcome, &mut out, &mut io::stderr())
}

/// Print the combined output and any error, and pick the exit status.
///
/// The error goes to `err` once. It is only logged when `err` itself cannot
/// be written.
pub(crate) fn report(
    outcome: Result<ExecutionResult, Error>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> ExitCode {
    match outcome.and_then(|result| print_result(result, out)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Err(write_err) = writeln!(err, "{}", e) {
                error!("{} (stderr unavailable: {})", e, write_err);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

/// Write the combined output, then surface an execution failure as an [`Error`].
fn print_result(result: ExecutionResult, out: &mut dyn Write) -> Result<(), Error> {
    out.write_all(&result.output)?;
    if !result.output.is_empty() && !result.output.ends_with(b"\n") {
        writeln!(out)?;
    }
    out.flush()?;

    match result.error {
        None => Ok(()),
        Some(e) => Err(Error::Execution(e)),
    }
}
