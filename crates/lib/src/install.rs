//! Dependency installation into the build environment.

use std::path::Path;

use crate::config::BuildConfig;
use crate::exec::{Invocation, Step};

/// Installer invocations for one cycle, in order:
/// 1. upgrade the core packaging tools;
/// 2. editable-install the package together with its docs requirements,
///    resolved against the default index plus the configured `--find-links`.
///
/// `python` is the environment's interpreter; both steps run in `source_root`.
pub fn invocations(config: &BuildConfig, source_root: &Path, python: &Path) -> Vec<Invocation> {
  let python = python.to_string_lossy().into_owned();
  let mut steps = Vec::with_capacity(2);

  if !config.install.core_packages.is_empty() {
    steps.push(
      Invocation::new(Step::Install, python.as_str(), source_root)
        .args(["-m", "pip", "install", "--upgrade"])
        .args(config.install.core_packages.iter().cloned()),
    );
  }

  let mut package = Invocation::new(Step::Install, python.as_str(), source_root)
    .args(["-m", "pip", "install", "-e", ".", "-r"])
    .arg(config.requirements_file().to_string_lossy());
  for location in &config.install.find_links {
    package = package.args(["--find-links", location.as_str()]);
  }
  steps.push(package);

  steps
}
