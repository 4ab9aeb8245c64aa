//! Scoped build environments.
//!
//! A [`BuildEnvironment`] is a Python virtualenv owned by exactly one build
//! cycle. It is created at a fixed, reused path and removed again when the
//! handle is torn down or dropped, so an error anywhere in the cycle still
//! leaves the path free for the next tag.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::exec::{ExecError, Invocation, Step, ToolRunner, run_checked};
use crate::log::BuildLog;
use crate::util::fs::remove_dir_if_exists;

/// Directory holding the environment's executables.
pub fn bin_dir(env_path: &Path) -> PathBuf {
  if cfg!(windows) {
    env_path.join("Scripts")
  } else {
    env_path.join("bin")
  }
}

/// The environment's own interpreter.
pub fn interpreter(env_path: &Path) -> PathBuf {
  if cfg!(windows) {
    bin_dir(env_path).join("python.exe")
  } else {
    bin_dir(env_path).join("python")
  }
}

/// `<python> -m venv <env_path>`, run from `cwd`.
pub fn creation(python: &str, env_path: &Path, cwd: &Path) -> Invocation {
  Invocation::new(Step::CreateEnvironment, python, cwd).args(["-m", "venv"]).arg(env_path.to_string_lossy())
}

/// Variables that make an environment active for a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
  pub vars: BTreeMap<String, String>,
  pub remove: Vec<String>,
}

impl Activation {
  /// Activation of the environment at `env_path` on top of the current `PATH`.
  ///
  /// `PACKAGE_NAME` tells the package's own setup which distribution is being
  /// documented; `extra` is exported last and may override anything.
  pub fn for_path(env_path: &Path, package: &str, extra: &BTreeMap<String, String>) -> io::Result<Self> {
    let current = std::env::var_os("PATH").unwrap_or_default();
    Self::with_base_path(env_path, package, extra, current)
  }

  fn with_base_path(
    env_path: &Path,
    package: &str,
    extra: &BTreeMap<String, String>,
    base_path: OsString,
  ) -> io::Result<Self> {
    let paths = std::iter::once(bin_dir(env_path)).chain(std::env::split_paths(&base_path));
    let path = std::env::join_paths(paths).map_err(io::Error::other)?;

    let mut vars = BTreeMap::new();
    vars.insert("VIRTUAL_ENV".to_string(), env_path.to_string_lossy().into_owned());
    vars.insert("PATH".to_string(), path.to_string_lossy().into_owned());
    vars.insert("PACKAGE_NAME".to_string(), package.to_string());
    vars.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

    Ok(Self {
      vars,
      remove: vec!["PYTHONHOME".to_string()],
    })
  }

  pub fn apply(&self, invocation: Invocation) -> Invocation {
    invocation.with_env(&self.vars, &self.remove)
  }
}

/// Handle to the environment of the current build cycle.
#[derive(Debug)]
pub struct BuildEnvironment {
  path: PathBuf,
  removed: bool,
}

impl BuildEnvironment {
  /// Create a fresh environment at `env_path`.
  ///
  /// Whatever an interrupted earlier run left at that path is deleted first.
  pub async fn create<R: ToolRunner>(
    runner: &R,
    python: &str,
    env_path: &Path,
    cwd: &Path,
    log: &BuildLog,
  ) -> Result<Self, ExecError> {
    if remove_dir_if_exists(env_path)? {
      warn!(path = %env_path.display(), "removed stale build environment");
    }
    std::fs::create_dir_all(cwd)?;

    // Owned before the tool runs so a half-created environment is removed too.
    let environment = Self {
      path: env_path.to_path_buf(),
      removed: false,
    };

    run_checked(runner, &creation(python, env_path, cwd), log).await?;
    info!(path = %env_path.display(), "created build environment");

    Ok(environment)
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn python(&self) -> PathBuf {
    interpreter(&self.path)
  }

  pub fn activate(&self, package: &str, extra: &BTreeMap<String, String>) -> io::Result<Activation> {
    Activation::for_path(&self.path, package, extra)
  }

  /// Deactivate and delete the environment, reporting removal errors.
  pub fn teardown(mut self) -> io::Result<()> {
    self.removed = true;
    remove_dir_if_exists(&self.path)?;
    info!(path = %self.path.display(), "removed build environment");
    Ok(())
  }
}

impl Drop for BuildEnvironment {
  fn drop(&mut self) {
    if self.removed {
      return;
    }
    if let Err(e) = remove_dir_if_exists(&self.path) {
      warn!(path = %self.path.display(), error = %e, "failed to remove build environment");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::FakeRunner;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn log_in(temp: &TempDir) -> BuildLog {
    BuildLog::create(&temp.path().join("build.log")).unwrap()
  }

  #[test]
  fn activation_prepends_bin_dir() {
    let env_path = Path::new("/work/venv-docs-demo");
    let activation =
      Activation::with_base_path(env_path, "demo", &BTreeMap::new(), OsString::from("/usr/bin")).unwrap();

    let expected_path = std::env::join_paths([bin_dir(env_path), PathBuf::from("/usr/bin")]).unwrap();
    assert_eq!(
      activation.vars.get("PATH").map(String::as_str),
      Some(&*expected_path.to_string_lossy())
    );
    assert_eq!(
      activation.vars.get("VIRTUAL_ENV").map(String::as_str),
      Some(&*env_path.to_string_lossy())
    );
    assert_eq!(activation.vars.get("PACKAGE_NAME").map(String::as_str), Some("demo"));
    assert_eq!(activation.remove, vec!["PYTHONHOME"]);
  }

  #[test]
  fn extra_vars_override_defaults() {
    let mut extra = BTreeMap::new();
    extra.insert("PACKAGE_NAME".to_string(), "lightning".to_string());
    extra.insert("FREEZE_REQUIREMENTS".to_string(), "1".to_string());

    let activation = Activation::with_base_path(Path::new("/venv"), "demo", &extra, OsString::new()).unwrap();

    assert_eq!(activation.vars.get("PACKAGE_NAME").map(String::as_str), Some("lightning"));
    assert_eq!(activation.vars.get("FREEZE_REQUIREMENTS").map(String::as_str), Some("1"));
  }

  #[test]
  fn creation_runs_venv_module() {
    let invocation = creation("python3", Path::new("/work/venv"), Path::new("/work"));
    assert_eq!(invocation.step, Step::CreateEnvironment);
    assert_eq!(invocation.command_line(), "python3 -m venv /work/venv");
  }

  #[tokio::test]
  async fn teardown_removes_environment() {
    let temp = TempDir::new().unwrap();
    let log = log_in(&temp);
    let env_path = temp.path().join("venv");

    let environment = BuildEnvironment::create(&FakeRunner::new(), "python3", &env_path, temp.path(), &log)
      .await
      .unwrap();
    assert!(env_path.is_dir());
    assert_eq!(environment.python(), interpreter(&env_path));

    environment.teardown().unwrap();
    assert!(!env_path.exists());
  }

  #[tokio::test]
  async fn drop_removes_environment() {
    let temp = TempDir::new().unwrap();
    let log = log_in(&temp);
    let env_path = temp.path().join("venv");

    {
      let _environment = BuildEnvironment::create(&FakeRunner::new(), "python3", &env_path, temp.path(), &log)
        .await
        .unwrap();
      assert!(env_path.is_dir());
    }

    assert!(!env_path.exists());
  }

  #[tokio::test]
  async fn failed_creation_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let log = log_in(&temp);
    let env_path = temp.path().join("venv");
    let runner = FakeRunner::new().failing_at(Step::CreateEnvironment, "build.log");

    let result = BuildEnvironment::create(&runner, "python3", &env_path, temp.path(), &log).await;

    assert!(matches!(result, Err(ExecError::Failed { .. })));
    assert!(!env_path.exists());
  }

  #[tokio::test]
  #[traced_test]
  async fn stale_environment_is_replaced() {
    let temp = TempDir::new().unwrap();
    let log = log_in(&temp);
    let env_path = temp.path().join("venv");
    std::fs::create_dir_all(env_path.join("leftover")).unwrap();

    let environment = BuildEnvironment::create(&FakeRunner::new(), "python3", &env_path, temp.path(), &log)
      .await
      .unwrap();

    assert!(!env_path.join("leftover").exists());
    assert!(logs_contain("removed stale build environment"));
    environment.teardown().unwrap();
  }
}
