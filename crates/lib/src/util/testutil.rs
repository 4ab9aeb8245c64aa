//! Test utilities for tagdocs-lib.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::exec::{ExecError, Invocation, Outcome, Step, ToolRunner};
use crate::log::BuildLog;

/// An invocation running `script` through `/bin/sh -c`.
#[cfg(unix)]
pub fn shell(step: Step, cwd: &Path, script: &str) -> Invocation {
  Invocation::new(step, "/bin/sh", cwd).args(["-c", script])
}

/// In-memory [`ToolRunner`] that mimics the external tools' side effects.
///
/// - `-m venv <dir>` creates `<dir>/bin`
/// - `git clone <url> <dir>` creates `<dir>`
/// - the generator writes output to the log and creates the artifact at
///   `<cwd>/<artifact_from_docs_dir>` with an `index.html`
///
/// A failure can be injected for one step of the cycle whose log file name
/// contains a given string. A failing generator still leaves `partial.html`
/// in the artifact directory.
#[derive(Debug)]
pub struct FakeRunner {
  calls: Mutex<Vec<Invocation>>,
  fail: Option<(Step, String)>,
  artifact_from_docs_dir: PathBuf,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self {
      calls: Mutex::new(Vec::new()),
      fail: None,
      artifact_from_docs_dir: PathBuf::from("../build/html"),
    }
  }

  pub fn failing_at(mut self, step: Step, log_name_contains: &str) -> Self {
    self.fail = Some((step, log_name_contains.to_string()));
    self
  }

  pub fn without_artifact(mut self) -> Self {
    self.artifact_from_docs_dir = PathBuf::new();
    self
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.lock().unwrap().clone()
  }

  fn should_fail(&self, invocation: &Invocation, log: &BuildLog) -> bool {
    let log_name = log.path().file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    matches!(&self.fail, Some((step, needle)) if *step == invocation.step && log_name.contains(needle.as_str()))
  }
}

impl ToolRunner for FakeRunner {
  async fn run(&self, invocation: &Invocation, log: &BuildLog) -> Result<Outcome, ExecError> {
    self.calls.lock().unwrap().push(invocation.clone());

    if self.should_fail(invocation, log) {
      log.append_line("simulated failure")?;
      if invocation.step == Step::Generate && !self.artifact_from_docs_dir.as_os_str().is_empty() {
        let artifact = invocation.cwd.join(&self.artifact_from_docs_dir);
        std::fs::create_dir_all(&artifact)?;
        std::fs::write(artifact.join("partial.html"), "<html>")?;
      }
      return Ok(Outcome {
        code: Some(1),
        duration: Duration::ZERO,
      });
    }

    let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
    match (invocation.step, args.as_slice()) {
      (Step::CreateEnvironment, ["-m", "venv", dir]) => {
        std::fs::create_dir_all(Path::new(dir).join("bin"))?;
      }
      (Step::Checkout, ["clone", _, dir]) => {
        std::fs::create_dir_all(dir)?;
      }
      (Step::Generate, _) => {
        log.append_line("build succeeded.")?;
        std::fs::create_dir_all(&invocation.cwd)?;
        if !self.artifact_from_docs_dir.as_os_str().is_empty() {
          let artifact = invocation.cwd.join(&self.artifact_from_docs_dir);
          std::fs::create_dir_all(&artifact)?;
          std::fs::write(artifact.join("index.html"), "<html></html>")?;
        }
      }
      _ => {}
    }

    Ok(Outcome {
      code: Some(0),
      duration: Duration::ZERO,
    })
  }
}
