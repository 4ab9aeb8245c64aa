//! Documentation generator invocation.

use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::exec::{Invocation, Step};

/// `make <target> --jobs <N>` in the package's docs source directory.
pub fn invocation(config: &BuildConfig, source_root: &Path) -> Invocation {
  Invocation::new(Step::Generate, config.tools.make.as_str(), source_root.join(config.docs_source_dir()))
    .arg(config.docs.target.as_str())
    .args(["--jobs".to_string(), config.jobs().to_string()])
}

/// Where the generator leaves its output.
pub fn artifact_path(config: &BuildConfig, source_root: &Path) -> PathBuf {
  source_root.join(config.artifact_dir())
}
