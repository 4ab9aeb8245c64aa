//! Artifact relocation.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::util::fs::{copy_dir_all, remove_dir_if_exists};

#[derive(Debug, Error)]
pub enum RelocateError {
  /// The generator succeeded but left no output where it was expected.
  #[error("artifact directory not found: {0}")]
  MissingArtifact(PathBuf),

  #[error("failed to create destination {path}: {source}")]
  CreateDestination {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to replace existing artifact {path}: {source}")]
  ReplaceExisting {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to move {from} to {to}: {source}")]
  Move {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Move `artifact` to `destination`, replacing whatever is there.
///
/// Parents of `destination` are created as needed. After success `artifact`
/// no longer exists; across filesystems the move is a copy followed by removal.
pub fn relocate(artifact: &Path, destination: &Path) -> Result<(), RelocateError> {
  if !artifact.is_dir() {
    return Err(RelocateError::MissingArtifact(artifact.to_path_buf()));
  }

  if let Some(parent) = destination.parent() {
    std::fs::create_dir_all(parent).map_err(|source| RelocateError::CreateDestination {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  let replaced = (if destination.is_dir() {
    remove_dir_if_exists(destination)
  } else if destination.exists() {
    std::fs::remove_file(destination).map(|_| true)
  } else {
    Ok(false)
  })
  .map_err(|source| RelocateError::ReplaceExisting {
    path: destination.to_path_buf(),
    source,
  })?;
  if replaced {
    debug!(path = %destination.display(), "replaced existing artifact");
  }

  let moved = match std::fs::rename(artifact, destination) {
    Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
      debug!("artifact is on another filesystem, copying");
      move_by_copy(artifact, destination)
    }
    other => other,
  };
  moved.map_err(|source| RelocateError::Move {
    from: artifact.to_path_buf(),
    to: destination.to_path_buf(),
    source,
  })?;

  info!(path = %destination.display(), "archived artifact");
  Ok(())
}

/// Move a tree that cannot be renamed: copy it, then remove the source.
///
/// A failed copy removes the partial destination and keeps the source intact.
fn move_by_copy(from: &Path, to: &Path) -> io::Result<()> {
  if let Err(e) = copy_dir_all(from, to) {
    remove_dir_if_exists(to)?;
    return Err(e);
  }
  std::fs::remove_dir_all(from)
}
