//! Single remote invocation over a session channel.
//!
//! The whole script goes out as one `exec` request. Standard output and
//! standard error (extended data type 1) are appended to one buffer in the
//! order the server sends them, matching what an operator would see on a
//! terminal. The call returns once the server closes the channel; there is no
//! timeout.

use russh::{ChannelMsg, client};
use tracing::{debug, info, warn};

use crate::remote::error::ExecutionError;
use crate::remote::types::ExecutionResult;

/// SSH extended data type code for stderr.
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// Accumulates channel events into an [`ExecutionResult`].
#[derive(Debug, Default)]
pub(crate) struct OutputCollector {
    output: Vec<u8>,
    exit_status: Option<u32>,
    signal: Option<(String, bool)>,
    eof: bool,
}

impl OutputCollector {
    pub(crate) fn new() -> Self {
        Self {
            output: Vec::with_capacity(4096),
            ..Default::default()
        }
    }

    pub(crate) fn on_data(&mut self, data: &[u8]) {
        self.output.extend_from_slice(data);
    }

    pub(crate) fn on_extended_data(&mut self, data: &[u8], ext: u32) {
        if ext == SSH_EXTENDED_DATA_STDERR {
            self.output.extend_from_slice(data);
        }
    }

    pub(crate) fn on_exit_status(&mut self, exit_status: u32) {
        self.exit_status = Some(exit_status);
    }

    pub(crate) fn on_exit_signal(&mut self, signal: String, core_dumped: bool) {
        self.signal = Some((signal, core_dumped));
    }

    pub(crate) fn on_eof(&mut self) {
        self.eof = true;
    }

    /// Whether the remote side has said everything it is going to say.
    pub(crate) fn is_complete(&self) -> bool {
        self.eof && (self.exit_status.is_some() || self.signal.is_some())
    }

    /// Finish after the channel closed normally.
    pub(crate) fn finish(self) -> ExecutionResult {
        let error = match (self.exit_status, self.signal) {
            (Some(0), _) => None,
            (Some(code), _) => Some(ExecutionError::NonZeroExit(code)),
            (None, Some((signal, core_dumped))) => Some(ExecutionError::Signal {
                signal,
                core_dumped,
            }),
            (None, None) => Some(ExecutionError::MissingExitStatus),
        };

        ExecutionResult {
            output: self.output,
            exit_status: self.exit_status,
            error,
        }
    }

    /// Finish with a transport failure, keeping whatever output arrived.
    pub(crate) fn fail(self, error: ExecutionError) -> ExecutionResult {
        ExecutionResult {
            output: self.output,
            exit_status: self.exit_status,
            error: Some(error),
        }
    }
}

/// Execute `script` on `channel` and block until the remote shell exits.
pub(crate) async fn execute_on_channel(
    channel: &mut russh::Channel<client::Msg>,
    script: &str,
) -> ExecutionResult {
    let mut collector = OutputCollector::new();

    if let Err(e) = channel.exec(true, script).await {
        return collector.fail(ExecutionError::Transport(e.to_string()));
    }
    info!("Submitted script ({} bytes), waiting for remote shell", script.len());

    loop {
        match channel.wait().await {
            Some(ChannelMsg::Data { data }) => {
                collector.on_data(&data);
            }
            Some(ChannelMsg::ExtendedData { data, ext }) => {
                collector.on_extended_data(&data, ext);
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                collector.on_exit_status(exit_status);
                if collector.is_complete() {
                    break;
                }
            }
            Some(ChannelMsg::ExitSignal {
                signal_name,
                core_dumped,
                ..
            }) => {
                collector.on_exit_signal(format!("{:?}", signal_name), core_dumped);
                if collector.is_complete() {
                    break;
                }
            }
            Some(ChannelMsg::Eof) => {
                // Continue to wait for exit status if not received yet
                collector.on_eof();
                if collector.is_complete() {
                    break;
                }
            }
            Some(ChannelMsg::Failure) => {
                let _ = channel.close().await;
                return collector.fail(ExecutionError::Transport(
                    "server refused the exec request".to_string(),
                ));
            }
            Some(ChannelMsg::Close) | None => {
                break;
            }
            Some(_) => {}
        }
    }

    let _ = channel.close().await;

    let result = collector.finish();
    match &result.error {
        None => debug!("Remote shell exited cleanly ({} bytes)", result.output.len()),
        Some(e) => warn!("Remote shell failed: {} ({} bytes)", e, result.output.len()),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_exit_has_no_error() {
        let mut collector = OutputCollector::new();
        collector.on_data(b"hello\n");
        collector.on_exit_status(0);
        collector.on_eof();

        let result = collector.finish();
        assert_eq!(result.output, b"hello\n");
        assert_eq!(result.exit_status, Some(0));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_non_zero_exit_keeps_output() {
        let mut collector = OutputCollector::new();
        collector.on_data(b"[running wrk2]\n");
        collector.on_extended_data(b"wrk2: not found\n", SSH_EXTENDED_DATA_STDERR);
        collector.on_exit_status(127);

        let result = collector.finish();
        assert_eq!(result.output, b"[running wrk2]\nwrk2: not found\n");
        assert!(matches!(result.error, Some(ExecutionError::NonZeroExit(127))));
    }

    #[test]
    fn test_stdout_and_stderr_interleave_in_arrival_order() {
        let mut collector = OutputCollector::new();
        collector.on_data(b"a");
        collector.on_extended_data(b"b", SSH_EXTENDED_DATA_STDERR);
        collector.on_data(b"c");
        collector.on_exit_status(0);
        assert_eq!(collector.finish().output, b"abc");
    }

    #[test]
    fn test_unknown_extended_data_is_ignored() {
        let mut collector = OutputCollector::new();
        collector.on_extended_data(b"ignored", 7);
        collector.on_exit_status(0);
        assert!(collector.finish().output.is_empty());
    }

    #[test]
    fn test_signal_without_status() {
        let mut collector = OutputCollector::new();
        collector.on_data(b"partial");
        collector.on_exit_signal("KILL".to_string(), false);

        let result = collector.finish();
        assert_eq!(result.output, b"partial");
        assert_eq!(result.exit_status, None);
        assert!(matches!(
            result.error,
            Some(ExecutionError::Signal { ref signal, core_dumped: false }) if signal == "KILL"
        ));
    }

    #[test]
    fn test_missing_exit_status() {
        let mut collector = OutputCollector::new();
        collector.on_data(b"out");
        collector.on_eof();
        let result = collector.finish();
        assert!(matches!(result.error, Some(ExecutionError::MissingExitStatus)));
        assert_eq!(result.output, b"out");
    }

    #[test]
    fn test_fail_keeps_partial_output() {
        let mut collector = OutputCollector::new();
        collector.on_data(b"before the break");
        let result = collector.fail(ExecutionError::Transport("reset".to_string()));
        assert_eq!(result.output, b"before the break");
        assert!(matches!(result.error, Some(ExecutionError::Transport(_))));
    }

    #[test]
    fn test_completion_needs_eof_and_status() {
        let mut collector = OutputCollector::new();
        assert!(!collector.is_complete());
        collector.on_exit_status(0);
        assert!(!collector.is_complete());
        collector.on_eof();
        assert!(collector.is_complete());
    }

    #[test]
    fn test_completion_with_signal() {
        let mut collector = OutputCollector::new();
        collector.on_eof();
        assert!(!collector.is_complete());
        collector.on_exit_signal("TERM".to_string(), false);
        assert!(collector.is_complete());
    }
}
