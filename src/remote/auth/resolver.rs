//! Turns raw command-line arguments into an [`Invocation`] and a [`Credential`].
//!
//! The argument count is the only branch point:
//!
//! | Shape | Without key file | With key file |
//! |-------|------------------|---------------|
//! | batch | 3 → password prompt | 4 → key auth |
//! | ad-hoc | 4 → password prompt | 5 → key auth |
//!
//! Any other count is a usage error. Key files are read and decoded here, so a
//! bad key fails the run before any network traffic.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::remote::error::{CredentialError, Error};
use crate::remote::types::{Invocation, InvocationShape};

use super::{Credential, load_private_key};

/// Source of the password when no key file is given.
pub trait PasswordPrompt {
    fn read_password(&self, prompt: &str) -> io::Result<String>;
}

/// Reads the password from the controlling terminal without echo.
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }
}

/// Validate the argument count for `shape` and split the positional arguments.
///
/// `args` includes the program name at index 0, as `std::env::args` yields it.
pub fn resolve_invocation(args: &[String], shape: InvocationShape) -> Result<Invocation, Error> {
    let program = args.first().map(String::as_str).unwrap_or("ssh-stress");
    let base = shape.base_len();

    if args.len() != base && args.len() != base + 1 {
        return Err(Error::Usage(shape.usage(program)));
    }

    let command = match shape {
        InvocationShape::Batch => None,
        InvocationShape::AdHoc => Some(args[3].clone()),
    };
    let key_path = args.get(base).map(PathBuf::from);

    Ok(Invocation {
        username: args[1].clone(),
        address: args[2].clone(),
        command,
        key_path,
    })
}

/// Produce the single credential for `invocation`.
///
/// Prompts through `prompt` only when no key file was given.
pub fn resolve_credential(
    invocation: &Invocation,
    prompt: &dyn PasswordPrompt,
) -> Result<Credential, CredentialError> {
    match &invocation.key_path {
        Some(path) => {
            debug!("Loading private key from {:?}", path);
            let key = load_private_key(path)?;
            Ok(Credential::KeyPair(Arc::new(key)))
        }
        None => {
            let password = prompt
                .read_password("Password: ")
                .map_err(CredentialError::Prompt)?;
            Ok(Credential::Password(password))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::auth::key_fixtures::{TEST_ED25519_KEY, write_temp_file};
    use std::cell::Cell;

    /// Prompt double that records whether it was asked.
    struct FixedPrompt {
        answer: io::Result<String>,
        asked: Cell<u32>,
    }

    impl FixedPrompt {
        fn answering(password: &str) -> Self {
            Self {
                answer: Ok(password.to_string()),
                asked: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err(io::Error::new(io::ErrorKind::NotFound, "no tty")),
                asked: Cell::new(0),
            }
        }
    }

    impl PasswordPrompt for FixedPrompt {
        fn read_password(&self, prompt: &str) -> io::Result<String> {
            assert_eq!(prompt, "Password: ");
            self.asked.set(self.asked.get() + 1);
            match &self.answer {
                Ok(password) => Ok(password.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    mod invocation {
        use super::*;

        #[test]
        fn test_batch_without_key() {
            let inv = resolve_invocation(
                &args(&["ssh-stress", "vagrant", "localhost:2222"]),
                InvocationShape::Batch,
            )
            .unwrap();
            assert_eq!(inv.username, "vagrant");
            assert_eq!(inv.address, "localhost:2222");
            assert_eq!(inv.command, None);
            assert_eq!(inv.key_path, None);
        }

        #[test]
        fn test_batch_with_key() {
            let inv = resolve_invocation(
                &args(&["ssh-stress", "vagrant", "localhost:2222", "/keys/id"]),
                InvocationShape::Batch,
            )
            .unwrap();
            assert_eq!(inv.key_path, Some(PathBuf::from("/keys/id")));
            assert_eq!(inv.command, None);
        }

        #[test]
        fn test_adhoc_without_key() {
            let inv = resolve_invocation(
                &args(&["ssh-exec", "root", "10.0.0.5:22", "uptime"]),
                InvocationShape::AdHoc,
            )
            .unwrap();
            assert_eq!(inv.command.as_deref(), Some("uptime"));
            assert_eq!(inv.key_path, None);
        }

        #[test]
        fn test_adhoc_with_key() {
            let inv = resolve_invocation(
                &args(&["ssh-exec", "root", "10.0.0.5:22", "df -h", "/keys/id"]),
                InvocationShape::AdHoc,
            )
            .unwrap();
            assert_eq!(inv.command.as_deref(), Some("df -h"));
            assert_eq!(inv.key_path, Some(PathBuf::from("/keys/id")));
        }

        #[test]
        fn test_batch_wrong_counts_are_usage_errors() {
            for count in [0usize, 1, 2, 5, 6] {
                let values: Vec<String> = (0..count).map(|i| format!("a{}", i)).collect();
                let result = resolve_invocation(&values, InvocationShape::Batch);
                assert!(
                    matches!(result, Err(Error::Usage(_))),
                    "count {} should be a usage error",
                    count
                );
            }
        }

        #[test]
        fn test_adhoc_wrong_counts_are_usage_errors() {
            for count in [1usize, 2, 3, 6] {
                let values: Vec<String> = (0..count).map(|i| format!("a{}", i)).collect();
                let result = resolve_invocation(&values, InvocationShape::AdHoc);
                assert!(matches!(result, Err(Error::Usage(_))), "count {}", count);
            }
        }

        #[test]
        fn test_usage_message_uses_program_name() {
            let result = resolve_invocation(&args(&["/usr/bin/ssh-stress"]), InvocationShape::Batch);
            match result {
                Err(Error::Usage(message)) => {
                    assert!(message.starts_with("Usage: /usr/bin/ssh-stress <user> <host:port>"))
                }
                other => panic!("expected usage error, got {:?}", other),
            }
        }

        #[test]
        fn test_usage_message_without_program_name() {
            let result = resolve_invocation(&[], InvocationShape::Batch);
            assert!(matches!(result, Err(Error::Usage(m)) if m.contains("<host:port>")));
        }
    }

    mod credential {
        use super::*;

        #[test]
        fn test_no_key_prompts_for_password() {
            let inv = resolve_invocation(
                &args(&["ssh-stress", "vagrant", "localhost:2222"]),
                InvocationShape::Batch,
            )
            .unwrap();
            let prompt = FixedPrompt::answering("vagrant");

            let credential = resolve_credential(&inv, &prompt).unwrap();

            assert_eq!(prompt.asked.get(), 1);
            match credential {
                Credential::Password(password) => assert_eq!(password, "vagrant"),
                other => panic!("expected password credential, got {:?}", other),
            }
        }

        #[test]
        fn test_valid_key_skips_prompt() {
            let key_path = write_temp_file("resolver_key", TEST_ED25519_KEY.as_bytes());
            let inv = resolve_invocation(
                &args(&[
                    "ssh-stress",
                    "vagrant",
                    "localhost:2222",
                    key_path.to_str().unwrap(),
                ]),
                InvocationShape::Batch,
            )
            .unwrap();
            let prompt = FixedPrompt::answering("unused");

            let credential = resolve_credential(&inv, &prompt);
            let _ = std::fs::remove_file(&key_path);

            assert_eq!(prompt.asked.get(), 0);
            assert!(matches!(credential, Ok(Credential::KeyPair(_))));
        }

        #[test]
        fn test_invalid_key_is_credential_error() {
            let key_path = write_temp_file("resolver_bad_key", b"-----BEGIN nonsense-----\n");
            let inv = Invocation {
                username: "vagrant".to_string(),
                address: "localhost:2222".to_string(),
                command: None,
                key_path: Some(key_path.clone()),
            };
            let prompt = FixedPrompt::answering("unused");

            let result = resolve_credential(&inv, &prompt);
            let _ = std::fs::remove_file(&key_path);

            assert!(matches!(result, Err(CredentialError::KeyParse { .. })));
            assert_eq!(prompt.asked.get(), 0);
        }

        #[test]
        fn test_unreadable_key_is_read_error() {
            let inv = Invocation {
                username: "vagrant".to_string(),
                address: "localhost:2222".to_string(),
                command: None,
                key_path: Some(PathBuf::from("/nonexistent/ssh-stress/key")),
            };
            let result = resolve_credential(&inv, &FixedPrompt::answering("unused"));
            assert!(matches!(result, Err(CredentialError::KeyRead { .. })));
        }

        #[test]
        fn test_prompt_failure_is_credential_error() {
            let inv = Invocation {
                username: "vagrant".to_string(),
                address: "localhost:2222".to_string(),
                command: None,
                key_path: None,
            };
            let result = resolve_credential(&inv, &FixedPrompt::failing());
            assert!(matches!(result, Err(CredentialError::Prompt(_))));
        }
    }
}
