//! One run, end to end: script → echo → connect → execute → release.
//!
//! The script is built before any credential prompt or network traffic, so a
//! template error never reaches the remote host. Once connected, the
//! session is closed exactly once whatever the execution outcome.

use std::io::Write;

use tracing::info;

use crate::remote::auth::{Credential, PasswordPrompt, resolve_credential, resolve_invocation};
use crate::remote::client::Connector;
use crate::remote::compose::{ComposedScript, ScriptTemplate, compose};
use crate::remote::error::{CompositionError, Error};
use crate::remote::profile::LoadProfile;
use crate::remote::types::{ExecutionResult, Invocation, InvocationShape};

/// Build the script for `invocation`.
///
/// Ad-hoc invocations run their command verbatim; batch invocations render
/// `template` against `profile`.
pub fn build_script(
    invocation: &Invocation,
    template: &ScriptTemplate,
    profile: LoadProfile,
) -> Result<ComposedScript, CompositionError> {
    match &invocation.command {
        Some(command) => Ok(ComposedScript::verbatim(command.as_str())),
        None => {
            info!(
                "Run identifier: {}, results at {}",
                profile.adhoc_name,
                profile.results_path()
            );
            compose(template, &profile.to_parameters()?)
        }
    }
}

/// Echo the script lines to `echo`, then execute the script on a fresh session.
///
/// Execution failures are reported inside the returned [`ExecutionResult`];
/// only echo and connection failures are `Err`.
pub async fn run_script(
    connector: &dyn Connector,
    invocation: &Invocation,
    credential: Credential,
    script: &ComposedScript,
    echo: &mut dyn Write,
) -> Result<ExecutionResult, Error> {
    for line in script.lines() {
        writeln!(echo, "{}", line)?;
    }
    echo.flush()?;

    let mut session = connector
        .connect(&invocation.username, &invocation.address, credential)
        .await?;

    let result = session.execute(script.as_str()).await;
    session.close().await;

    Ok(result)
}

/// Everything a binary needs besides process setup.
pub async fn run(
    args: &[String],
    shape: InvocationShape,
    template: &ScriptTemplate,
    profile: LoadProfile,
    prompt: &dyn PasswordPrompt,
    connector: &dyn Connector,
    echo: &mut dyn Write,
) -> Result<ExecutionResult, Error> {
    let invocation = resolve_invocation(args, shape)?;
    let script = build_script(&invocation, template, profile)?;
    let credential = resolve_credential(&invocation, prompt)?;

    info!(
        "Running {} statement(s) on {}@{}",
        script.lines().len(),
        invocation.username,
        invocation.address
    );
    run_script(connector, &invocation, credential, &script, echo).await
}
