//! One-shot remote script execution over SSH.
//!
//! This module is organized into the following submodules:
//!
//! - `auth`: Credential resolution from arguments and authentication strategies
//! - `config`: Transport configuration with environment variable support
//! - `error`: Error taxonomy for every stage of a run
//! - `session`: russh client handler
//! - `client`: Connection establishment and the session seam
//! - `compose`: Template rendering and script composition
//! - `profile`: Built-in load-test parameters and script
//! - `executor`: Single remote invocation with combined output capture
//! - `run`: End-to-end orchestration of one run
//! - `cli`: Process front used by the binaries

pub mod auth;
pub mod cli;
pub mod client;
pub mod compose;
pub(crate) mod config;
pub mod error;
pub(crate) mod executor;
pub mod profile;
pub mod run;
pub mod session;
pub mod types;

pub use auth::Credential;
pub use client::{Connector, RemoteSession, SshConnector};
pub use compose::{ComposedScript, ParameterRecord, ScriptTemplate, compose};
pub use config::TransportConfig;
pub use error::{Error, Result};
pub use profile::LoadProfile;
pub use types::{ExecutionResult, Invocation, InvocationShape};
