mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// Build the Catala tree-sitter WASM bundle and its playground
#[derive(Parser)]
#[command(name = catala_wasm_lib::consts::APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// JSON configuration file (default: built-in reference configuration)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override how the playground computes its parser base URL
  #[arg(long, value_enum)]
  base_url: Option<BaseUrlArg>,

  /// Skip the web interpreter and compiler page
  #[arg(long)]
  skip_interpreter: bool,

  /// Report format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BaseUrlArg {
  /// Load parsers from the site root
  Empty,
  /// Load parsers from the configured mount when served below it
  PathAware,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  cmd::cmd_bundle(cmd::BundleArgs {
    config: cli.config,
    base_url: cli.base_url,
    skip_interpreter: cli.skip_interpreter,
    output: cli.output,
    verbose: cli.verbose,
  })
}
