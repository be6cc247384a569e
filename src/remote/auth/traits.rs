//! Authentication strategy trait definition.

use async_trait::async_trait;
use russh::client;

use crate::remote::error::ConnectError;
use crate::remote::session::SshClientHandler;

/// Trait for SSH authentication strategies.
///
/// A run authenticates with exactly one strategy, built from its
/// [`Credential`](super::Credential). There is no fallback to other methods.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Attempt to authenticate with the SSH server.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Authentication succeeded
    /// * `Ok(false)` - Authentication failed (credentials rejected)
    /// * `Err(ConnectError::Auth)` - Error during the authentication exchange
    async fn authenticate(
        &self,
        handle: &mut client::Handle<SshClientHandler>,
        username: &str,
    ) -> Result<bool, ConnectError>;

    /// Get the name of this authentication strategy.
    ///
    /// Used for logging and error messages.
    fn name(&self) -> &'static str;
}
