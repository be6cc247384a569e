//! Run a templated shell script on a remote host over one SSH session.
//!
//! See [`remote`] for the pipeline: credential resolution, connection,
//! script composition and single-invocation execution.

pub mod remote;
