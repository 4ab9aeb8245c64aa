//! Configuration flags shared by `build` and `plan`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use tagdocs_lib::{BuildConfig, CheckoutMode};

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
  /// Config file (default: $TAGDOCS_CONFIG, then ./tagdocs.toml)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// Package whose documentation is built
  #[arg(short, long)]
  pub package: Option<String>,

  /// Root directory receiving <package>/<tag> artifacts
  #[arg(short, long)]
  pub dest: Option<PathBuf>,

  /// Existing working copy to check each tag out in place
  #[arg(long, conflicts_with = "remote")]
  pub source: Option<PathBuf>,

  /// Repository to clone fresh for every tag
  #[arg(long)]
  pub remote: Option<String>,

  /// Directory for building-<package>_<tag>.log files
  #[arg(long)]
  pub log_dir: Option<PathBuf>,

  /// Directory holding the build environment and scratch clones
  #[arg(long)]
  pub work_dir: Option<PathBuf>,

  /// Parallel jobs for the documentation generator (default: processor count)
  #[arg(short, long)]
  pub jobs: Option<usize>,
}

impl ConfigArgs {
  /// Load the config file, apply flags on top, and validate.
  pub fn load(&self) -> Result<BuildConfig> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let mut config = BuildConfig::discover(self.config.as_deref(), &cwd).context("Failed to load config")?;
    self.apply(&mut config);
    debug!(?config, "resolved configuration");
    config.finalize().context("Invalid configuration")
  }

  fn apply(&self, config: &mut BuildConfig) {
    if let Some(package) = &self.package {
      config.package = package.clone();
    }
    if let Some(dest) = &self.dest {
      config.dest_root = dest.clone();
    }
    if let Some(log_dir) = &self.log_dir {
      config.log_dir = log_dir.clone();
    }
    if let Some(work_dir) = &self.work_dir {
      config.work_dir = work_dir.clone();
    }
    if let Some(jobs) = self.jobs {
      config.docs.jobs = Some(jobs);
    }

    if let Some(source_root) = &self.source {
      config.checkout = CheckoutMode::InPlace {
        source_root: source_root.clone(),
      };
    } else if let Some(remote) = &self.remote {
      let scratch_root = match &config.checkout {
        CheckoutMode::Clone { scratch_root, .. } => scratch_root.clone(),
        CheckoutMode::InPlace { .. } => None,
      };
      config.checkout = CheckoutMode::Clone {
        remote: remote.clone(),
        scratch_root,
      };
    }
  }
}
