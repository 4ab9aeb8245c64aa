use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// The step of a build cycle an invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
  CreateEnvironment,
  Checkout,
  Install,
  Generate,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Step::CreateEnvironment => "create-environment",
      Step::Checkout => "checkout",
      Step::Install => "install",
      Step::Generate => "generate",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Error)]
pub enum ExecError {
  /// The program could not be started at all.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The program ran and exited unsuccessfully.
  #[error("command failed with {}: {cmd}", exit_status(.code))]
  Failed { cmd: String, code: Option<i32> },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

fn exit_status(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "termination by signal".to_string(),
  }
}

/// One external program run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub step: Step,
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,

  /// Variables set on top of the inherited environment.
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub env: BTreeMap<String, String>,

  /// Inherited variables removed before spawning.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub env_remove: Vec<String>,
}

impl Invocation {
  pub fn new(step: Step, program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      step,
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
      env: BTreeMap::new(),
      env_remove: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Apply an activated environment: set `vars`, drop `remove`.
  pub fn with_env(mut self, vars: &BTreeMap<String, String>, remove: &[String]) -> Self {
    self.env.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    self.env_remove.extend(remove.iter().cloned());
    self
  }

  /// Shell-like rendering for logs and plans.
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .map(quote)
      .collect::<Vec<_>>()
      .join(" ")
  }
}

fn quote(word: &str) -> String {
  if !word.is_empty() && !word.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
    return word.to_string();
  }
  format!("'{}'", word.replace('\'', r"'\''"))
}

/// Result of running an invocation to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
  /// Exit code; `None` when the process was terminated by a signal.
  pub code: Option<i32>,
  pub duration: Duration,
}

impl Outcome {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}
