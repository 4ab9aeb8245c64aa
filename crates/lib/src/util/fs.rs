//! Filesystem helpers built on `walkdir`.

use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Remove a directory tree; a missing directory is not an error.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<bool> {
  match std::fs::remove_dir_all(path) {
    Ok(()) => Ok(true),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e),
  }
}

/// Recursively copy `src` into `dst`, which must not exist yet.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
  for entry in WalkDir::new(src) {
    let entry = entry.map_err(io::Error::other)?;
    let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
    let target = dst.join(relative);

    let file_type = entry.file_type();
    if file_type.is_dir() {
      std::fs::create_dir_all(&target)?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
    } else {
      std::fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  std::os::unix::fs::symlink(std::fs::read_link(src)?, dst)
}

#[cfg(windows)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  std::fs::copy(src, dst).map(|_| ())
}

/// Total size in bytes of the regular files under `path`.
pub fn dir_size(path: &Path) -> io::Result<u64> {
  let mut total = 0;
  for entry in WalkDir::new(path) {
    let entry = entry.map_err(io::Error::other)?;
    if entry.file_type().is_file() {
      total += entry.metadata().map_err(io::Error::other)?.len();
    }
  }
  Ok(total)
}
