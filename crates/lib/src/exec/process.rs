//! Runs invocations as child processes.

use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tracing::debug;

use crate::exec::ToolRunner;
use crate::exec::types::{ExecError, Invocation, Outcome};
use crate::log::BuildLog;

/// [`ToolRunner`] backed by real processes.
///
/// The child inherits the caller's environment, with the invocation's
/// variables applied on top. Stdin is closed; stdout and stderr both go to the
/// build log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
  async fn run(&self, invocation: &Invocation, log: &BuildLog) -> Result<Outcome, ExecError> {
    let (stdout, stderr) = log.stdio()?;

    let mut command = Command::new(&invocation.program);
    command
      .args(&invocation.args)
      .current_dir(&invocation.cwd)
      .stdin(Stdio::null())
      .stdout(Stdio::from(stdout))
      .stderr(Stdio::from(stderr));

    for key in &invocation.env_remove {
      command.env_remove(key);
    }
    command.envs(&invocation.env);

    let start = Instant::now();
    let status = command
      .status()
      .await
      .map_err(|source| ExecError::Spawn {
        program: invocation.program.clone(),
        source,
      })?;

    let outcome = Outcome {
      code: status.code(),
      duration: start.elapsed(),
    };
    debug!(
      program = %invocation.program,
      code = ?outcome.code,
      elapsed_ms = outcome.duration.as_millis() as u64,
      "process exited"
    );

    Ok(outcome)
  }
}
