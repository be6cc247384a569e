//! Transport configuration for the single SSH connection.
//!
//! Values resolve with a three-tier priority system:
//!
//! 1. **Parameter** - Explicitly provided value (highest priority)
//! 2. **Environment Variable** - Value from environment variable
//! 3. **Default** - Built-in default value (lowest priority)
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SSH_CONNECT_TIMEOUT` | 30s | Dial, handshake and authentication timeout in seconds |
//! | `SSH_COMPRESSION` | true | Enable zlib compression |
//! | `SSH_KEEPALIVE_INTERVAL` | 30s | Keepalive interval in seconds while the script runs |
//!
//! There is no command timeout: a run lasts as long as the remote shell takes.

use std::env;
use std::time::Duration;

/// Default SSH connection timeout in seconds
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default keepalive interval in seconds
pub(crate) const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 30;

/// Keepalives that may go unanswered before the transport gives up
pub(crate) const KEEPALIVE_MAX: usize = 3;

/// Environment variable name for SSH connection timeout
pub(crate) const CONNECT_TIMEOUT_ENV_VAR: &str = "SSH_CONNECT_TIMEOUT";

/// Environment variable name for SSH compression
pub(crate) const COMPRESSION_ENV_VAR: &str = "SSH_COMPRESSION";

/// Environment variable name for the keepalive interval
pub(crate) const KEEPALIVE_INTERVAL_ENV_VAR: &str = "SSH_KEEPALIVE_INTERVAL";

/// Resolved transport settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub keepalive_interval: Duration,
    pub compress: bool,
}

impl TransportConfig {
    /// Resolve every setting from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            connect_timeout: Duration::from_secs(resolve_connect_timeout(None)),
            keepalive_interval: Duration::from_secs(resolve_keepalive_interval(None)),
            compress: resolve_compression(None),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            keepalive_interval: Duration::from_secs(DEFAULT_KEEPALIVE_INTERVAL_SECS),
            compress: true,
        }
    }
}

/// Resolve the connection timeout value with priority: parameter -> env var -> default
pub(crate) fn resolve_connect_timeout(timeout_param: Option<u64>) -> u64 {
    resolve_u64(timeout_param, CONNECT_TIMEOUT_ENV_VAR, DEFAULT_CONNECT_TIMEOUT_SECS)
}

/// Resolve the keepalive interval with priority: parameter -> env var -> default
pub(crate) fn resolve_keepalive_interval(interval_param: Option<u64>) -> u64 {
    resolve_u64(
        interval_param,
        KEEPALIVE_INTERVAL_ENV_VAR,
        DEFAULT_KEEPALIVE_INTERVAL_SECS,
    )
}

fn resolve_u64(param: Option<u64>, env_var: &str, default: u64) -> u64 {
    if let Some(value) = param {
        return value;
    }

    if let Ok(env_value) = env::var(env_var)
        && let Ok(value) = env_value.parse::<u64>()
    {
        return value;
    }

    default
}

/// Resolve the compression setting with priority: parameter -> env var -> default (true)
pub(crate) fn resolve_compression(compress_param: Option<bool>) -> bool {
    if let Some(compress) = compress_param {
        return compress;
    }

    if let Ok(env_compress) = env::var(COMPRESSION_ENV_VAR) {
        return env_compress.eq_ignore_ascii_case("true") || env_compress == "1";
    }

    true
}
