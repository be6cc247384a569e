//! Plain data types shared by the run stages.

use std::path::PathBuf;

use crate::remote::error::ExecutionError;

/// Positional argument layout accepted by a binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationShape {
    /// `<user> <host:port> [keyfile]`: runs the built-in templated script.
    Batch,
    /// `<user> <host:port> <command> [keyfile]`: runs one command verbatim.
    AdHoc,
}

impl InvocationShape {
    /// Argument count (program name included) when no key file is given.
    pub(crate) fn base_len(self) -> usize {
        match self {
            InvocationShape::Batch => 3,
            InvocationShape::AdHoc => 4,
        }
    }

    /// Usage line naming the expected positional arguments.
    pub fn usage(self, program: &str) -> String {
        match self {
            InvocationShape::Batch => format!(
                "Usage: {} <user> <host:port> <(optional) location of private key file>",
                program
            ),
            InvocationShape::AdHoc => format!(
                "Usage: {} <user> <host:port> <command> <(optional) location of private key file>",
                program
            ),
        }
    }
}

/// Already-validated positional arguments of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub username: String,
    /// Remote endpoint in `host:port` form.
    pub address: String,
    /// Verbatim remote command for ad-hoc runs; `None` in batch mode.
    pub command: Option<String>,
    /// Private key file; `None` means password authentication.
    pub key_path: Option<PathBuf>,
}

/// Outcome of the single remote invocation.
///
/// `output` holds stdout and stderr interleaved in arrival order. It is kept
/// even when `error` is set so the operator can see how far the script got.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    pub output: Vec<u8>,
    pub exit_status: Option<u32>,
    pub error: Option<ExecutionError>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
