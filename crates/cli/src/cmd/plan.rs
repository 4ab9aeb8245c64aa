//! Implementation of the `tagdocs plan` command.

use anyhow::{Context, Result};

use tagdocs_lib::exec::ProcessRunner;
use tagdocs_lib::{BuildConfig, VersionTag, VersionedDocBuilder};

use crate::output::{OutputFormat, print_cycle_plan, print_json};

pub fn cmd_plan(tags: &[VersionTag], config: BuildConfig, output: OutputFormat) -> Result<()> {
  let builder = VersionedDocBuilder::new(config, ProcessRunner);
  let plans = builder.plan(tags).context("Failed to plan build")?;

  if output.is_json() {
    return print_json(&plans);
  }

  for plan in &plans {
    print_cycle_plan(plan);
    println!();
  }

  println!("Tags: {}", plans.len());
  Ok(())
}
