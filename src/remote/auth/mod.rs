//! Authentication for the run's single connection.
//!
//! A run resolves its command-line arguments into exactly one [`Credential`]
//! (see [`resolver`]). The connector turns that credential into one
//! [`AuthStrategy`] and tries nothing else.
//!
//! # Available Strategies
//!
//! - [`PasswordAuth`]: Password-based authentication
//! - [`KeyAuth`]: Private key authentication

mod key;
mod password;
pub mod resolver;
mod traits;

use std::fmt;
use std::sync::Arc;

use russh::keys;

pub use key::{KeyAuth, load_private_key};
pub use password::PasswordAuth;
pub use resolver::{PasswordPrompt, TerminalPrompt, resolve_credential, resolve_invocation};
pub use traits::AuthStrategy;

#[cfg(test)]
pub(crate) use key::tests as key_fixtures;

/// Authentication material for one run. Consumed by the connector.
pub enum Credential {
    Password(String),
    KeyPair(Arc<keys::PrivateKey>),
}

impl Credential {
    /// Name of the authentication method this credential drives.
    pub fn method(&self) -> &'static str {
        match self {
            Credential::Password(_) => "password",
            Credential::KeyPair(_) => "key",
        }
    }

    pub(crate) fn into_strategy(self) -> Box<dyn AuthStrategy> {
        match self {
            Credential::Password(password) => Box::new(PasswordAuth::new(password)),
            Credential::KeyPair(key) => Box::new(KeyAuth::new(key)),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret material.
        match self {
            Credential::Password(_) => f.write_str("Credential::Password(***)"),
            Credential::KeyPair(_) => f.write_str("Credential::KeyPair(***)"),
        }
    }
}
