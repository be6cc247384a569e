//! SSH connection establishment for a single run.
//!
//! ## Connection Lifecycle
//!
//! 1. **Address Parsing**: `host:port`, with port 22 when none is given.
//!
//! 2. **Client Configuration**: keepalive and compression from
//!    [`TransportConfig`]; no inactivity timeout, since the remote script may
//!    run silently for the whole load test.
//!
//! 3. **Dial**: TCP connect and SSH handshake, bounded by the connect timeout.
//!
//! 4. **Authentication**: exactly one strategy, built from the run's
//!    [`Credential`]. No fallback chain and no retry.
//!
//! 5. **Channel**: one session channel. If it cannot be opened the connection
//!    is disconnected before the error is returned.
//!
//! The caller owns the returned [`RemoteSession`] and must call
//! [`RemoteSession::close`] on every path.

use std::sync::Arc;

use async_trait::async_trait;
use russh::{Disconnect, client};
use tracing::{debug, error, info};

use crate::remote::auth::Credential;
use crate::remote::config::{KEEPALIVE_MAX, TransportConfig};
use crate::remote::error::{ConnectError, ExecutionError};
use crate::remote::executor::execute_on_channel;
use crate::remote::session::SshClientHandler;
use crate::remote::types::ExecutionResult;

/// An authenticated connection with one unused execution channel.
#[async_trait]
pub trait RemoteSession: Send {
    /// Run `script` as one remote invocation and wait for it to finish.
    ///
    /// The channel is one-shot: a second call yields
    /// [`ExecutionError::ChannelConsumed`].
    async fn execute(&mut self, script: &str) -> ExecutionResult;

    /// Release the connection. Calling it again does nothing.
    async fn close(&mut self);
}

/// Opens a [`RemoteSession`] for a user, address and credential.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        username: &str,
        address: &str,
        credential: Credential,
    ) -> Result<Box<dyn RemoteSession>, ConnectError>;
}

/// Build russh client configuration from the transport settings.
///
/// - No inactivity timeout
/// - Keepalive at the configured interval, [`KEEPALIVE_MAX`] unanswered at most
/// - Compression preference based on `compress` (ZLIB if enabled, NONE if disabled)
pub(crate) fn build_client_config(transport: &TransportConfig) -> Arc<client::Config> {
    let compression = if transport.compress {
        (&[russh::compression::ZLIB, russh::compression::NONE][..]).into()
    } else {
        (&[russh::compression::NONE][..]).into()
    };

    let preferred = russh::Preferred {
        compression,
        ..Default::default()
    };

    Arc::new(client::Config {
        inactivity_timeout: None,
        keepalive_interval: Some(transport.keepalive_interval),
        keepalive_max: KEEPALIVE_MAX,
        preferred,
        ..Default::default()
    })
}

/// Parse address string into host and port components.
///
/// Uses `rsplit_once` so that bracketed IPv6 addresses (`[::1]:22`) keep
/// their inner colons in the host part.
pub(crate) fn parse_address(address: &str) -> Result<(String, u16), ConnectError> {
    if let Some((host, port_str)) = address.rsplit_once(':') {
        let port = port_str
            .parse::<u16>()
            .map_err(|e| ConnectError::InvalidAddress {
                address: address.to_string(),
                reason: format!("Invalid port number: {}", e),
            })?;
        Ok((host.to_string(), port))
    } else {
        Ok((address.to_string(), 22))
    }
}

/// [`Connector`] backed by russh.
pub struct SshConnector {
    transport: TransportConfig,
}

impl SshConnector {
    pub fn new(transport: TransportConfig) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        username: &str,
        address: &str,
        credential: Credential,
    ) -> Result<Box<dyn RemoteSession>, ConnectError> {
        let (host, port) = parse_address(address)?;
        let config = build_client_config(&self.transport);
        let timeout = self.transport.connect_timeout;

        let connect_future = client::connect(config, (host.as_str(), port), SshClientHandler);
        let mut handle = tokio::time::timeout(timeout, connect_future)
            .await
            .map_err(|_| ConnectError::Timeout(timeout))?
            .map_err(|e| {
                error!("SSH connection to {}@{} failed: {}", username, address, e);
                ConnectError::Dial(e.to_string())
            })?;
        debug!("Transport established to {}:{}", host, port);

        let strategy = credential.into_strategy();
        let method = strategy.name();
        match strategy.authenticate(&mut handle, username).await {
            Ok(true) => {}
            Ok(false) => {
                disconnect(&handle).await;
                return Err(ConnectError::AuthRejected {
                    username: username.to_string(),
                    method,
                });
            }
            Err(e) => {
                disconnect(&handle).await;
                return Err(e);
            }
        }
        info!("Authenticated to {}@{} with {}", username, address, method);

        let channel = match handle.channel_open_session().await {
            Ok(channel) => channel,
            Err(e) => {
                disconnect(&handle).await;
                return Err(ConnectError::ChannelOpen(e.to_string()));
            }
        };

        Ok(Box::new(SshSession {
            handle: Some(handle),
            channel: Some(channel),
        }))
    }
}

async fn disconnect(handle: &client::Handle<SshClientHandler>) {
    if let Err(e) = handle
        .disconnect(Disconnect::ByApplication, "", "English")
        .await
    {
        debug!("Error while disconnecting: {}", e);
    }
}

/// Live russh connection plus its single session channel.
struct SshSession {
    handle: Option<client::Handle<SshClientHandler>>,
    channel: Option<russh::Channel<client::Msg>>,
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn execute(&mut self, script: &str) -> ExecutionResult {
        let Some(mut channel) = self.channel.take() else {
            return ExecutionResult {
                error: Some(ExecutionError::ChannelConsumed),
                ..Default::default()
            };
        };
        execute_on_channel(&mut channel, script).await
    }

    async fn close(&mut self) {
        self.channel = None;
        if let Some(handle) = self.handle.take() {
            disconnect(&handle).await;
            debug!("Connection closed");
        }
    }
}
