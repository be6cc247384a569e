//! Error taxonomy for a remote script run.
//!
//! Every failure is terminal to the run; nothing in this crate retries. The
//! variants are grouped by the stage that produces them:
//!
//! 1. **Usage**: wrong number of positional arguments.
//! 2. **Credential**: key file unreadable or not a private key, or the password
//!    prompt could not read from the terminal.
//! 3. **Connect**: address, dial, authentication or channel-open failures.
//! 4. **Composition**: a template could not be rendered. Raised before any
//!    network traffic.
//! 5. **Execution**: the remote invocation failed. Carried inside
//!    [`ExecutionResult`](crate::remote::types::ExecutionResult) so the output
//!    gathered so far is never lost, and raised as [`Error::Execution`] once
//!    that output has been printed.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures while turning the key-file argument or the terminal into a credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to read private key from {path:?}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse private key from {path:?}: {reason}")]
    KeyParse { path: PathBuf, reason: String },

    #[error("Failed to read password: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Failures while establishing the connection or its single channel.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to connect: {0}")]
    Dial(String),

    #[error("{method} authentication failed: {reason}")]
    Auth {
        method: &'static str,
        reason: String,
    },

    #[error("Authentication rejected for user {username} ({method})")]
    AuthRejected {
        username: String,
        method: &'static str,
    },

    #[error("Failed to open channel: {0}")]
    ChannelOpen(String),
}

/// Failures while rendering command templates into a script.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Unresolved placeholder {{{{{field}}}}} in template {template:?}")]
    UnresolvedPlaceholder { field: String, template: String },

    #[error("Unterminated placeholder in template {template:?}")]
    UnterminatedPlaceholder { template: String },

    #[error("No command templates to compose")]
    EmptyScript,

    #[error("Failed to build parameters: {0}")]
    Parameters(String),
}

/// Failures reported by the remote invocation itself.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Process exited with status {0}")]
    NonZeroExit(u32),

    #[error("Process killed by signal {signal}{}", core_suffix(.core_dumped))]
    Signal { signal: String, core_dumped: bool },

    #[error("Remote command exited without exit status")]
    MissingExitStatus,

    #[error("Failed to execute command: {0}")]
    Transport(String),

    #[error("Session channel was already used for an invocation")]
    ChannelConsumed,
}

fn core_suffix(core_dumped: &bool) -> &'static str {
    if *core_dumped { " (core dumped)" } else { "" }
}

/// Any failure of a run, as surfaced to the binaries.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Process exit status the binaries report for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
