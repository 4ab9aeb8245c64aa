//! Terminal rendering of build reports and plans.
//!
//! Status lines go to stdout, except failures and skips which go to stderr so
//! they stay visible when stdout is redirected. Colors are only used when the
//! stream supports them.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use tagdocs_lib::{CyclePlan, RunReport, TagOutcome, TagStatus};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

mod marks {
  pub const BUILT: &str = "✓";
  pub const FAILED: &str = "✗";
  pub const SKIPPED: &str = "⚠";
  pub const TAG: &str = "•";
  pub const STEP: &str = "→";
}

pub fn format_bytes(bytes: u64) -> String {
  const UNITS: [&str; 3] = ["KB", "MB", "GB"];

  if bytes < 1024 {
    return format!("{} B", bytes);
  }
  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit + 1 < UNITS.len() {
    value /= 1024.0;
    unit += 1;
  }
  format!("{:.1} {}", value, UNITS[unit])
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    60.. => format!("{}m {}s", secs / 60, secs % 60),
    1.. => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
    0 => format!("{}ms", duration.subsec_millis()),
  }
}

fn field(label: &str, value: impl std::fmt::Display) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

fn path_field(label: &str, path: &Path) {
  field(label, path.display());
}

/// Opening line of `tagdocs build`.
pub fn print_build_header(tag_count: usize, package: &str, archive_root: &Path) {
  println!(
    "{} Building {} tag(s) of {} into {}",
    marks::TAG.if_supports_color(Stream::Stdout, |s| s.blue()),
    tag_count,
    package.if_supports_color(Stream::Stdout, |s| s.bold()),
    archive_root.display()
  );
}

pub fn print_tag_outcome(outcome: &TagOutcome) {
  match outcome.status {
    TagStatus::Built => {
      println!(
        "{} {} built",
        marks::BUILT.if_supports_color(Stream::Stdout, |s| s.green()),
        outcome.tag
      );
      path_field("Artifact", &outcome.destination);
      if let Some(bytes) = outcome.artifact_bytes {
        field("Size", format_bytes(bytes));
      }
      field("Duration", format_duration(outcome.duration));
    }
    TagStatus::Failed => {
      let message = outcome.error.as_deref().unwrap_or("build failed");
      eprintln!(
        "{} {}",
        marks::FAILED.if_supports_color(Stream::Stderr, |s| s.red()),
        message.if_supports_color(Stream::Stderr, |s| s.red())
      );
      path_field("Log", &outcome.log);
    }
    TagStatus::Skipped => {
      eprintln!(
        "{} {} skipped after an earlier failure",
        marks::SKIPPED.if_supports_color(Stream::Stderr, |s| s.yellow()),
        outcome.tag
      );
    }
  }
}

/// Per-status counts and wall time of the whole run.
pub fn print_run_summary(report: &RunReport, elapsed: Duration) {
  let built = report.succeeded().count();
  let failed = report.failed().count();
  let skipped = report.skipped().count();

  let mut counts = format!("{} built", built);
  if failed > 0 {
    counts.push_str(&format!(", {} failed", failed));
  }
  if skipped > 0 {
    counts.push_str(&format!(", {} skipped", skipped));
  }
  field("Tags", counts);
  field("Total", format_duration(elapsed));
}

pub fn print_cycle_plan(plan: &CyclePlan) {
  println!(
    "{} Tag {}",
    marks::TAG.if_supports_color(Stream::Stdout, |s| s.blue()),
    plan.tag
  );
  path_field("Environment", &plan.environment);
  path_field("Source", &plan.source_root);
  path_field("Log", &plan.log);
  for invocation in &plan.invocations {
    println!(
      "  {} [{}] {}",
      marks::STEP.if_supports_color(Stream::Stdout, |s| s.cyan()),
      invocation.step,
      invocation.command_line()
    );
  }
  field(
    "Archive",
    format!("{} -> {}", plan.artifact.display(), plan.destination.display()),
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
