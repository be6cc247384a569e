#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use std::process::ExitCode;

use ssh_stress::remote::InvocationShape;
use ssh_stress::remote::cli::main_with;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    main_with(InvocationShape::AdHoc).await
}
