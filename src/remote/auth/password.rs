//! Password-based SSH authentication.

use async_trait::async_trait;
use russh::client;

use crate::remote::error::ConnectError;
use crate::remote::session::SshClientHandler;

use super::traits::AuthStrategy;

/// Password authentication strategy.
pub struct PasswordAuth {
    password: String,
}

impl PasswordAuth {
    /// Create a new password authentication strategy.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

#[async_trait]
impl AuthStrategy for PasswordAuth {
    async fn authenticate(
        &self,
        handle: &mut client::Handle<SshClientHandler>,
        username: &str,
    ) -> Result<bool, ConnectError> {
        let result = handle
            .authenticate_password(username, &self.password)
            .await
            .map_err(|e| ConnectError::Auth {
                method: self.name(),
                reason: e.to_string(),
            })?;

        Ok(result.success())
    }

    fn name(&self) -> &'static str {
        "password"
    }
}
