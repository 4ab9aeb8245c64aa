mod args;
mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tagdocs_lib::{FailurePolicy, VersionTag};

use crate::args::ConfigArgs;
use crate::cmd::{cmd_build, cmd_plan};
use crate::output::OutputFormat;

/// tagdocs - build and archive documentation for released versions
#[derive(Parser)]
#[command(name = "tagdocs")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build documentation for each tag, in order, and archive it under <dest>/<package>/<tag>
  Build {
    /// Version tags to build
    #[arg(required = true)]
    tags: Vec<VersionTag>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Continue with the next tag after a failed build instead of stopping
    #[arg(long)]
    keep_going: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show what `build` would run for each tag without running anything
  Plan {
    /// Version tags to plan
    #[arg(required = true)]
    tags: Vec<VersionTag>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // RUST_LOG wins; otherwise show per-step progress, or everything with -v.
  let default_filter = if cli.verbose { "debug" } else { "warn,tagdocs_lib=info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Build {
      tags,
      config,
      keep_going,
      output,
    } => {
      let policy = if keep_going {
        FailurePolicy::KeepGoing
      } else {
        FailurePolicy::FailFast
      };
      cmd_build(&tags, config.load()?, policy, output)
    }
    Commands::Plan { tags, config, output } => cmd_plan(&tags, config.load()?, output),
  }
}
