//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in interpreter: `-m venv DIR` creates the environment with a copy of
/// itself as its python, `-m pip ...` only echoes.
const FAKE_PYTHON: &str = r#"#!/bin/sh
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin" && cp "$0" "$3/bin/python"
  exit $?
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
  [ -n "$VIRTUAL_ENV" ] || { echo "pip outside environment" >&2; exit 4; }
  echo "pip: $*"
  exit 0
fi
exit 1
"#;

/// Stand-in git: tag `9.9.9` does not exist.
const FAKE_GIT: &str = r#"#!/bin/sh
case "$*" in
  *9.9.9*) echo "error: pathspec '9.9.9' did not match any file(s) known to git" >&2; exit 1 ;;
esac
echo "git: $*"
"#;

/// Stand-in make: writes a small site to ../build/html.
const FAKE_MAKE: &str = r#"#!/bin/sh
[ -n "$VIRTUAL_ENV" ] || { echo "make outside environment" >&2; exit 4; }
echo "Running Sphinx for $PACKAGE_NAME"
mkdir -p ../build/html/_static
echo "<html>$PACKAGE_NAME</html>" > ../build/html/index.html
echo "build succeeded."
"#;

/// Isolated test environment.
///
/// Each test gets a temporary working directory with fake tools, a source
/// tree with a docs directory, and a `tagdocs.toml` pointing at the tools.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };

    let bin = env.path().join("tools");
    std::fs::create_dir_all(&bin).unwrap();
    let python = write_script(&bin, "python", FAKE_PYTHON);
    let git = write_script(&bin, "git", FAKE_GIT);
    let make = write_script(&bin, "make", FAKE_MAKE);

    std::fs::create_dir_all(env.source_path().join("docs").join("source-demo")).unwrap();

    let config = format!(
      "package = \"demo\"\n\n[tools]\npython = \"{}\"\ngit = \"{}\"\nmake = \"{}\"\n",
      python.display(),
      git.display(),
      make.display()
    );
    std::fs::write(env.path().join("tagdocs.toml"), config).unwrap();

    env
  }

  pub fn path(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap_or_else(|_| self.temp.path().to_path_buf())
  }

  pub fn source_path(&self) -> PathBuf {
    self.path().join("src")
  }

  pub fn dest_path(&self) -> PathBuf {
    self.path().join("out")
  }

  pub fn artifact(&self, tag: &str) -> PathBuf {
    self.dest_path().join("demo").join(tag)
  }

  pub fn log(&self, tag: &str) -> PathBuf {
    self.path().join(format!("building-demo_{}.log", tag))
  }

  pub fn env_dir(&self) -> PathBuf {
    self.path().join("venv-docs-demo")
  }

  /// A `tagdocs build` command run from the test directory, building from
  /// the in-place source into `out/`.
  pub fn build_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("tagdocs");
    cmd
      .current_dir(self.path())
      .env_remove("TAGDOCS_CONFIG")
      .arg("build")
      .arg("--source")
      .arg(self.source_path())
      .arg("--dest")
      .arg(self.dest_path());
    cmd
  }
}

fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
  let path = dir.join(name);
  std::fs::write(&path, content).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}
