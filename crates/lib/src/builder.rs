//! The versioned documentation build loop.
//!
//! For every tag, strictly in the order given, one build cycle runs:
//! 1. create a fresh environment at the reused environment path
//! 2. activate it for all later steps
//! 3. check out (or clone) the source at the tag
//! 4. install the packaging tools, the package and its docs requirements
//! 5. clear any earlier generator output, then run the documentation
//!    generator with its output going into the tag's build log
//! 6. move the generated tree to `<dest_root>/<package>/<tag>`
//! 7. tear down the environment and any scratch clone
//!
//! The environment and scratch clone are scoped handles, so step 7's cleanup
//! also happens when an earlier step fails.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use tracing::{Instrument, error, info, info_span, warn};

use crate::archive;
use crate::checkout::{self, SourceCheckout};
use crate::config::BuildConfig;
use crate::docs;
use crate::environment::{self, Activation, BuildEnvironment};
use crate::error::BuildError;
use crate::exec::{ExecError, Invocation, ToolRunner, run_checked};
use crate::install;
use crate::log::BuildLog;
use crate::tag::VersionTag;
use crate::util::fs::{dir_size, remove_dir_if_exists};

/// What happens to the remaining tags after a cycle fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
  /// Stop at the first failure; later tags never start.
  #[default]
  FailFast,
  /// Record the failure and continue with the next tag.
  KeepGoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagStatus {
  Built,
  Failed,
  /// Not attempted because an earlier tag failed under [`FailurePolicy::FailFast`].
  Skipped,
}

/// Result of one tag's cycle.
#[derive(Debug, Clone, Serialize)]
pub struct TagOutcome {
  pub tag: VersionTag,
  pub status: TagStatus,
  pub destination: PathBuf,
  pub log: PathBuf,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artifact_bytes: Option<u64>,
  #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
  pub duration: Duration,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Ordered outcomes of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub outcomes: Vec<TagOutcome>,
}

impl RunReport {
  pub fn succeeded(&self) -> impl Iterator<Item = &TagOutcome> {
    self.with_status(TagStatus::Built)
  }

  pub fn failed(&self) -> impl Iterator<Item = &TagOutcome> {
    self.with_status(TagStatus::Failed)
  }

  pub fn skipped(&self) -> impl Iterator<Item = &TagOutcome> {
    self.with_status(TagStatus::Skipped)
  }

  /// True when every tag was built.
  pub fn is_success(&self) -> bool {
    self.outcomes.iter().all(|o| o.status == TagStatus::Built)
  }

  fn with_status(&self, status: TagStatus) -> impl Iterator<Item = &TagOutcome> {
    self.outcomes.iter().filter(move |o| o.status == status)
  }
}

/// A successfully completed cycle.
#[derive(Debug, Clone)]
pub struct CycleSummary {
  pub destination: PathBuf,
  pub log: PathBuf,
  pub artifact_bytes: Option<u64>,
}

/// Everything one cycle would do, without doing it.
#[derive(Debug, Clone, Serialize)]
pub struct CyclePlan {
  pub tag: VersionTag,
  pub environment: PathBuf,
  pub source_root: PathBuf,
  pub log: PathBuf,
  pub artifact: PathBuf,
  pub destination: PathBuf,
  pub invocations: Vec<Invocation>,
}

pub struct VersionedDocBuilder<R> {
  config: BuildConfig,
  runner: R,
  policy: FailurePolicy,
}

impl<R: ToolRunner> VersionedDocBuilder<R> {
  /// `config` is expected to be finalized (absolute paths, package set).
  pub fn new(config: BuildConfig, runner: R) -> Self {
    Self {
      config,
      runner,
      policy: FailurePolicy::default(),
    }
  }

  pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// The invocations, paths and destinations each cycle would use.
  pub fn plan(&self, tags: &[VersionTag]) -> Result<Vec<CyclePlan>, BuildError> {
    let config = &self.config;
    let env_path = config.env_path();
    let source_root = checkout::planned_root(config);

    tags
      .iter()
      .map(|tag| {
        let activation = Activation::for_path(&env_path, &config.package, &config.env).map_err(|e| {
          BuildError::EnvironmentCreation {
            tag: tag.clone(),
            source: e.into(),
          }
        })?;

        let mut invocations = vec![environment::creation(&config.tools.python, &env_path, &config.work_dir)];
        invocations.extend(
          checkout::invocations(config, tag, &source_root)
            .into_iter()
            .chain(install::invocations(config, &source_root, &environment::interpreter(&env_path)))
            .chain(std::iter::once(docs::invocation(config, &source_root)))
            .map(|invocation| activation.apply(invocation)),
        );

        Ok(CyclePlan {
          tag: tag.clone(),
          environment: env_path.clone(),
          source_root: source_root.clone(),
          log: config.log_path(tag),
          artifact: docs::artifact_path(config, &source_root),
          destination: config.destination(tag),
          invocations,
        })
      })
      .collect()
  }

  /// Run one cycle per tag, in order, honoring the failure policy.
  pub async fn run(&self, tags: &[VersionTag]) -> RunReport {
    let mut report = RunReport::default();
    let mut stopped = false;

    for tag in tags {
      if stopped {
        report.outcomes.push(TagOutcome {
          tag: tag.clone(),
          status: TagStatus::Skipped,
          destination: self.config.destination(tag),
          log: self.config.log_path(tag),
          artifact_bytes: None,
          duration: Duration::ZERO,
          error: None,
        });
        continue;
      }

      let start = Instant::now();
      let outcome = match self.build_tag(tag).await {
        Ok(summary) => TagOutcome {
          tag: tag.clone(),
          status: TagStatus::Built,
          destination: summary.destination,
          log: summary.log,
          artifact_bytes: summary.artifact_bytes,
          duration: start.elapsed(),
          error: None,
        },
        Err(e) => {
          error!(tag = %tag, error = %e, "build cycle failed");
          stopped = self.policy == FailurePolicy::FailFast;
          TagOutcome {
            tag: tag.clone(),
            status: TagStatus::Failed,
            destination: self.config.destination(tag),
            log: self.config.log_path(tag),
            artifact_bytes: None,
            duration: start.elapsed(),
            error: Some(e.to_string()),
          }
        }
      };
      report.outcomes.push(outcome);
    }

    report
  }

  /// One full build-and-archive cycle for `tag`.
  pub async fn build_tag(&self, tag: &VersionTag) -> Result<CycleSummary, BuildError> {
    self.cycle(tag).instrument(info_span!("cycle", tag = %tag)).await
  }

  async fn cycle(&self, tag: &VersionTag) -> Result<CycleSummary, BuildError> {
    let config = &self.config;
    let log_path = config.log_path(tag);
    let log = BuildLog::create(&log_path).map_err(|source| BuildError::Log {
      tag: tag.clone(),
      path: log_path.clone(),
      source,
    })?;
    info!(log = %log_path.display(), "starting build cycle");

    let env_err = |source: ExecError| BuildError::EnvironmentCreation {
      tag: tag.clone(),
      source,
    };
    let environment = BuildEnvironment::create(
      &self.runner,
      &config.tools.python,
      &config.env_path(),
      &config.work_dir,
      &log,
    )
    .await
    .map_err(env_err)?;
    let activation = environment
      .activate(&config.package, &config.env)
      .map_err(|e| env_err(e.into()))?;

    let checkout_err = |source: ExecError| BuildError::Checkout {
      tag: tag.clone(),
      source,
    };
    let source = SourceCheckout::prepare(config).map_err(|e| checkout_err(e.into()))?;
    for invocation in checkout::invocations(config, tag, source.root()) {
      run_checked(&self.runner, &activation.apply(invocation), &log)
        .await
        .map_err(checkout_err)?;
    }
    info!(root = %source.root().display(), "checked out source");

    for invocation in install::invocations(config, source.root(), &environment.python()) {
      run_checked(&self.runner, &activation.apply(invocation), &log)
        .await
        .map_err(|source| BuildError::DependencyInstall {
          tag: tag.clone(),
          source,
        })?;
    }
    info!("installed dependencies");

    let artifact = docs::artifact_path(config, source.root());
    let generate_err = |source: ExecError| BuildError::BuildTool {
      tag: tag.clone(),
      source,
    };
    if remove_dir_if_exists(&artifact).map_err(|e| generate_err(e.into()))? {
      warn!(path = %artifact.display(), "removed leftover generator output");
    }

    let generate = activation.apply(docs::invocation(config, source.root()));
    run_checked(&self.runner, &generate, &log)
      .await
      .map_err(generate_err)?;
    info!("generated documentation");

    let destination = config.destination(tag);
    archive::relocate(&artifact, &destination).map_err(|source| {
      BuildError::Relocation {
        tag: tag.clone(),
        source,
      }
    })?;

    let source_root = source.root().to_path_buf();
    source.release().map_err(|e| BuildError::Teardown {
      tag: tag.clone(),
      path: source_root,
      source: e,
    })?;
    let env_path = environment.path().to_path_buf();
    environment.teardown().map_err(|source| BuildError::Teardown {
      tag: tag.clone(),
      path: env_path,
      source,
    })?;

    let artifact_bytes = match dir_size(&destination) {
      Ok(bytes) => Some(bytes),
      Err(e) => {
        warn!(path = %destination.display(), error = %e, "could not measure artifact");
        None
      }
    };

    Ok(CycleSummary {
      destination,
      log: log_path,
      artifact_bytes,
    })
  }
}
