//! russh client handler for the run's single connection.
//!
//! `SshClientHandler` accepts every host key, matching `StrictHostKeyChecking=no`
//! in OpenSSH. Load-test targets are usually freshly provisioned VMs whose host
//! keys are not yet in any known_hosts file.

use russh::{client, keys};
use tracing::debug;

/// Client handler for russh that accepts all host keys.
///
/// # Security Note
///
/// No host key verification is performed, so the connection is open to
/// man-in-the-middle attacks on untrusted networks.
pub struct SshClientHandler;

impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!("Accepting server host key: {:?}", server_public_key.algorithm());
        Ok(true)
    }
}
