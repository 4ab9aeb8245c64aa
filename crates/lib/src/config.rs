//! Build configuration.
//!
//! Loaded from `tagdocs.toml` (or an explicit file), with defaults for every
//! field. The CLI applies its flags on top before calling [`BuildConfig::finalize`].

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  CONFIG_ENV, CONFIG_FILE_NAME, DEFAULT_ARTIFACT_DIR, DEFAULT_CORE_PACKAGES, DEFAULT_DOCS_SOURCE_DIR,
  DEFAULT_DOCS_TARGET, DEFAULT_ENV_DIR, DEFAULT_FIND_LINKS, DEFAULT_REQUIREMENTS, PACKAGE_PLACEHOLDER, log_file_name,
};
use crate::paths::default_dest_root;
use crate::tag::VersionTag;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("no package name configured (set `package` in the config file or pass --package)")]
  MissingPackage,

  #[error("package name {0:?} is not usable as a path component")]
  InvalidPackage(String),

  /// The environment directory is deleted and recreated for every tag, so it
  /// must be a dedicated child of the work directory.
  #[error("environment directory {0:?} must be a single directory name inside the work directory")]
  InvalidEnvDir(String),

  #[error("clone mode requires a remote repository URL")]
  MissingRemote,

  #[error("failed to resolve path {path}: {source}")]
  ResolvePath {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Where the source for each tag comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum CheckoutMode {
  /// Switch an existing working copy to each tag; it stays on the last one.
  InPlace { source_root: PathBuf },

  /// Clone the remote into a scratch directory per tag and delete it afterwards.
  Clone {
    remote: String,
    #[serde(default)]
    scratch_root: Option<PathBuf>,
  },
}

impl Default for CheckoutMode {
  fn default() -> Self {
    CheckoutMode::InPlace {
      source_root: PathBuf::from("."),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
  /// Packaging tools upgraded first in every fresh environment.
  pub core_packages: Vec<String>,

  /// Docs requirements file relative to the source root (`{package}` is substituted).
  pub requirements: String,

  /// Extra package locations passed to pip as `--find-links`.
  pub find_links: Vec<String>,
}

impl Default for InstallConfig {
  fn default() -> Self {
    Self {
      core_packages: DEFAULT_CORE_PACKAGES.iter().map(|s| s.to_string()).collect(),
      requirements: DEFAULT_REQUIREMENTS.to_string(),
      find_links: vec![DEFAULT_FIND_LINKS.to_string()],
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
  /// Directory holding the docs Makefile, relative to the source root.
  pub source_dir: String,

  /// Directory the generator writes its output to, relative to the source root.
  pub artifact_dir: String,

  /// Make target.
  pub target: String,

  /// Parallel jobs for the generator. Defaults to the available processor count.
  pub jobs: Option<usize>,
}

impl Default for DocsConfig {
  fn default() -> Self {
    Self {
      source_dir: DEFAULT_DOCS_SOURCE_DIR.to_string(),
      artifact_dir: DEFAULT_ARTIFACT_DIR.to_string(),
      target: DEFAULT_DOCS_TARGET.to_string(),
      jobs: None,
    }
  }
}

/// External programs, looked up on `PATH` unless given as paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
  /// Interpreter used to create the environment; later steps use the env's own interpreter.
  pub python: String,
  pub git: String,
  pub make: String,
}

impl Default for ToolsConfig {
  fn default() -> Self {
    Self {
      python: if cfg!(windows) { "python" } else { "python3" }.to_string(),
      git: "git".to_string(),
      make: "make".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
  /// Package whose documentation is built. Required.
  pub package: String,

  /// Artifacts land in `<dest_root>/<package>/<tag>`.
  pub dest_root: PathBuf,

  /// Directory receiving the `building-<package>_<tag>.log` files.
  pub log_dir: PathBuf,

  /// Directory holding the environment (and, by default, clone scratch space).
  pub work_dir: PathBuf,

  /// Environment directory name under `work_dir` (`{package}` is substituted).
  pub env_dir: String,

  pub checkout: CheckoutMode,
  pub install: InstallConfig,
  pub docs: DocsConfig,
  pub tools: ToolsConfig,

  /// Extra variables exported into every step of a cycle.
  pub env: BTreeMap<String, String>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      package: String::new(),
      dest_root: default_dest_root(),
      log_dir: PathBuf::from("."),
      work_dir: PathBuf::from("."),
      env_dir: DEFAULT_ENV_DIR.to_string(),
      checkout: CheckoutMode::default(),
      install: InstallConfig::default(),
      docs: DocsConfig::default(),
      tools: ToolsConfig::default(),
      env: BTreeMap::new(),
    }
  }
}

impl BuildConfig {
  /// Parse a config file.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load the config from `explicit`, then `$TAGDOCS_CONFIG`, then `tagdocs.toml`
  /// in `cwd`. Falls back to defaults when none of them applies.
  pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::from_file(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV) {
      return Self::from_file(Path::new(&path));
    }

    let candidate = cwd.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
      debug!(path = %candidate.display(), "using discovered config file");
      return Self::from_file(&candidate);
    }

    Ok(Self::default())
  }

  /// Validate the config and make every path absolute.
  ///
  /// Steps run with different working directories, so relative paths are
  /// resolved once, against the directory the run was started from.
  pub fn finalize(mut self) -> Result<Self, ConfigError> {
    if self.package.is_empty() {
      return Err(ConfigError::MissingPackage);
    }
    if !is_single_component(&self.package) {
      return Err(ConfigError::InvalidPackage(self.package));
    }
    let env_dir = self.expand(&self.env_dir);
    if !is_single_component(&env_dir) {
      return Err(ConfigError::InvalidEnvDir(env_dir));
    }

    self.dest_root = absolutize(&self.dest_root)?;
    self.log_dir = absolutize(&self.log_dir)?;
    self.work_dir = absolutize(&self.work_dir)?;
    let env_path = self.work_dir.join(&env_dir);

    match &mut self.checkout {
      CheckoutMode::InPlace { source_root } => {
        *source_root = absolutize(source_root)?;
        if source_root.starts_with(&env_path) {
          return Err(ConfigError::InvalidEnvDir(env_dir));
        }
      }
      CheckoutMode::Clone { remote, scratch_root } => {
        if remote.trim().is_empty() {
          return Err(ConfigError::MissingRemote);
        }
        if let Some(root) = scratch_root {
          *root = absolutize(root)?;
        }
      }
    }

    Ok(self)
  }

  fn expand(&self, template: &str) -> String {
    template.replace(PACKAGE_PLACEHOLDER, &self.package)
  }

  /// The reused environment location; only one cycle's environment lives here at a time.
  pub fn env_path(&self) -> PathBuf {
    self.work_dir.join(self.expand(&self.env_dir))
  }

  pub fn log_path(&self, tag: &VersionTag) -> PathBuf {
    self.log_dir.join(log_file_name(&self.package, tag.as_str()))
  }

  pub fn destination(&self, tag: &VersionTag) -> PathBuf {
    self.dest_root.join(&self.package).join(tag.as_str())
  }

  pub fn requirements_file(&self) -> PathBuf {
    PathBuf::from(self.expand(&self.install.requirements))
  }

  pub fn docs_source_dir(&self) -> PathBuf {
    PathBuf::from(self.expand(&self.docs.source_dir))
  }

  pub fn artifact_dir(&self) -> PathBuf {
    PathBuf::from(self.expand(&self.docs.artifact_dir))
  }

  pub fn scratch_root(&self) -> PathBuf {
    match &self.checkout {
      CheckoutMode::Clone {
        scratch_root: Some(root),
        ..
      } => root.clone(),
      _ => self.work_dir.clone(),
    }
  }

  pub fn jobs(&self) -> usize {
    self.docs.jobs.filter(|jobs| *jobs > 0).unwrap_or_else(num_cpus)
  }
}

/// A name that joins onto a directory as exactly one child entry.
fn is_single_component(name: &str) -> bool {
  !name.contains(['/', '\\'])
    && matches!(
      Path::new(name).components().collect::<Vec<_>>().as_slice(),
      [Component::Normal(_)]
    )
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
  let resolved = if path.exists() {
    dunce::canonicalize(path)
  } else {
    std::path::absolute(path)
  };
  resolved.map_err(|source| ConfigError::ResolvePath {
    path: path.to_path_buf(),
    source,
  })
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
