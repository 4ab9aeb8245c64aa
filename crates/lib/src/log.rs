//! Per-tag build logs.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The `building-<package>_<tag>.log` file of one build cycle.
///
/// Started empty at the beginning of the cycle; every step appends to it.
#[derive(Debug)]
pub struct BuildLog {
  path: PathBuf,
  file: File,
}

impl BuildLog {
  pub fn create(path: &Path) -> io::Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    File::create(path)?;
    let file = OpenOptions::new().append(true).open(path)?;
    Ok(Self {
      path: path.to_path_buf(),
      file,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn append_line(&self, line: &str) -> io::Result<()> {
    let mut file = &self.file;
    writeln!(file, "{}", line)?;
    file.flush()
  }

  /// Handles for a child's stdout and stderr, both appending to this log.
  pub fn stdio(&self) -> io::Result<(File, File)> {
    Ok((self.file.try_clone()?, self.file.try_clone()?))
  }
}
