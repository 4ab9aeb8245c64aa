//! Source checkouts pinned to a tag.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;

use crate::config::{BuildConfig, CheckoutMode};
use crate::exec::{Invocation, Step};
use crate::tag::VersionTag;

/// Source tree of one build cycle.
#[derive(Debug)]
pub enum SourceCheckout {
  /// Existing working copy, switched to the tag in place.
  InPlace { root: PathBuf },

  /// Fresh clone in a scratch directory, deleted on release or drop.
  Scratch { dir: TempDir },
}

impl SourceCheckout {
  /// Pick the source location for a cycle. In clone mode this creates the
  /// (still empty) scratch directory.
  pub fn prepare(config: &BuildConfig) -> io::Result<Self> {
    match &config.checkout {
      CheckoutMode::InPlace { source_root } => Ok(SourceCheckout::InPlace {
        root: source_root.clone(),
      }),
      CheckoutMode::Clone { .. } => {
        let scratch_root = config.scratch_root();
        std::fs::create_dir_all(&scratch_root)?;
        let dir = tempfile::Builder::new()
          .prefix(&format!("{}-src-", config.package))
          .tempdir_in(&scratch_root)?;
        Ok(SourceCheckout::Scratch { dir })
      }
    }
  }

  pub fn root(&self) -> &Path {
    match self {
      SourceCheckout::InPlace { root } => root,
      SourceCheckout::Scratch { dir } => dir.path(),
    }
  }

  /// Delete the scratch clone, reporting removal errors. In-place checkouts
  /// stay on the tag they were switched to.
  pub fn release(self) -> io::Result<()> {
    match self {
      SourceCheckout::InPlace { .. } => Ok(()),
      SourceCheckout::Scratch { dir } => {
        let path = dir.path().to_path_buf();
        dir.close()?;
        info!(path = %path.display(), "removed scratch checkout");
        Ok(())
      }
    }
  }
}

/// Version-control invocations that put the tree at `root` on `tag`.
pub fn invocations(config: &BuildConfig, tag: &VersionTag, root: &Path) -> Vec<Invocation> {
  let git = config.tools.git.as_str();
  match &config.checkout {
    CheckoutMode::InPlace { .. } => vec![Invocation::new(Step::Checkout, git, root).args(["checkout", tag.as_str()])],
    CheckoutMode::Clone { remote, .. } => {
      let parent = root.parent().unwrap_or(root);
      vec![
        Invocation::new(Step::Checkout, git, parent)
          .args(["clone", remote.as_str()])
          .arg(root.to_string_lossy()),
        Invocation::new(Step::Checkout, git, root).args(["checkout", tag.as_str()]),
        Invocation::new(Step::Checkout, git, root).args(["submodule", "update", "--init", "--recursive"]),
      ]
    }
  }
}

/// Source root a plan shows for a cycle; clone mode gets a fresh random name at run time.
pub fn planned_root(config: &BuildConfig) -> PathBuf {
  match &config.checkout {
    CheckoutMode::InPlace { source_root } => source_root.clone(),
    CheckoutMode::Clone { .. } => config.scratch_root().join(format!("{}-src-XXXXXX", config.package)),
  }
}
