//! Build cycle errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::archive::RelocateError;
use crate::exec::ExecError;
use crate::tag::VersionTag;

/// Why a tag's build cycle stopped.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("{tag}: failed to create build log {path}: {source}")]
  Log {
    tag: VersionTag,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{tag}: failed to create build environment: {source}")]
  EnvironmentCreation {
    tag: VersionTag,
    #[source]
    source: ExecError,
  },

  #[error("{tag}: checkout failed: {source}")]
  Checkout {
    tag: VersionTag,
    #[source]
    source: ExecError,
  },

  #[error("{tag}: dependency install failed: {source}")]
  DependencyInstall {
    tag: VersionTag,
    #[source]
    source: ExecError,
  },

  /// Partial generator output is never archived; the next cycle clears it.
  #[error("{tag}: documentation build failed: {source}")]
  BuildTool {
    tag: VersionTag,
    #[source]
    source: ExecError,
  },

  #[error("{tag}: relocation failed: {source}")]
  Relocation {
    tag: VersionTag,
    #[source]
    source: RelocateError,
  },

  #[error("{tag}: failed to clean up {path}: {source}")]
  Teardown {
    tag: VersionTag,
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}
