//! External tool execution.
//!
//! Every step of a build cycle is an [`Invocation`] of an external program.
//! A [`ToolRunner`] runs it and reports an explicit [`Outcome`]; the builder
//! checks outcomes uniformly through [`run_checked`].

pub mod process;
pub mod types;

use std::future::Future;

use tracing::debug;

use crate::log::BuildLog;

pub use process::ProcessRunner;
pub use types::{ExecError, Invocation, Outcome, Step};

/// Runs invocations to completion.
///
/// Implementations send the program's combined output to `log` and must not
/// treat a non-zero exit as an error themselves; that is the caller's decision.
pub trait ToolRunner {
  fn run(&self, invocation: &Invocation, log: &BuildLog) -> impl Future<Output = Result<Outcome, ExecError>>;
}

/// Record `invocation` in the log, run it, and turn a non-zero exit into [`ExecError::Failed`].
pub async fn run_checked<R: ToolRunner>(
  runner: &R,
  invocation: &Invocation,
  log: &BuildLog,
) -> Result<Outcome, ExecError> {
  let command_line = invocation.command_line();
  log.append_line(&format!("$ {}", command_line))?;
  debug!(step = %invocation.step, cwd = %invocation.cwd.display(), cmd = %command_line, "running");

  let outcome = runner.run(invocation, log).await?;
  if !outcome.success() {
    return Err(ExecError::Failed {
      cmd: command_line,
      code: outcome.code,
    });
  }

  Ok(outcome)
}
