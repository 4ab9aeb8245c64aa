//! Implementation of the `tagdocs build` command.
//!
//! Runs one build cycle per tag and prints a per-tag summary. Exits non-zero
//! if any tag failed.

use std::time::Instant;

use anyhow::{Context, Result, bail};

use tagdocs_lib::exec::ProcessRunner;
use tagdocs_lib::{BuildConfig, FailurePolicy, VersionTag, VersionedDocBuilder};

use crate::output::{OutputFormat, print_build_header, print_json, print_run_summary, print_tag_outcome};

pub fn cmd_build(tags: &[VersionTag], config: BuildConfig, policy: FailurePolicy, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  if !output.is_json() {
    print_build_header(tags.len(), &config.package, &config.dest_root.join(&config.package));
  }

  let builder = VersionedDocBuilder::new(config, ProcessRunner).with_policy(policy);

  // Run async build loop
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(builder.run(tags));

  if output.is_json() {
    print_json(&report)?;
  } else {
    println!();
    for outcome in &report.outcomes {
      print_tag_outcome(outcome);
    }
    println!();
    print_run_summary(&report, start.elapsed());
  }

  if !report.is_success() {
    let failed = report.failed().count();
    bail!("{} of {} tag(s) failed", failed, report.outcomes.len());
  }

  Ok(())
}
