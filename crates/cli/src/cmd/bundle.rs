//! Implementation of the bundle run.
//!
//! Loads the configuration, applies command-line overrides, runs the pipeline
//! on a current-thread runtime and prints a summary of what landed in the
//! output directory.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use catala_wasm_lib::config::{BaseUrlMode, BundleConfig};
use catala_wasm_lib::exec::ProcessRunner;
use catala_wasm_lib::pipeline::{self, BundleReport};
use catala_wasm_lib::site::SubstitutionOutcome;

use crate::BaseUrlArg;
use crate::output::{
  OutputFormat, format_bytes, format_duration, print_info, print_json, print_stat, print_success, print_warning,
  symbols, truncate_hash,
};

pub struct BundleArgs {
  pub config: Option<PathBuf>,
  pub base_url: Option<BaseUrlArg>,
  pub skip_interpreter: bool,
  pub output: OutputFormat,
  pub verbose: bool,
}

#[derive(Serialize)]
struct RunSummary<'a> {
  #[serde(flatten)]
  report: &'a BundleReport,
  elapsed_ms: u128,
}

/// Execute the bundle run.
pub fn cmd_bundle(args: BundleArgs) -> Result<()> {
  let mut config = match &args.config {
    Some(path) => BundleConfig::from_file(path).context("Failed to load configuration")?,
    None => BundleConfig::default(),
  };
  apply_overrides(&mut config, args.base_url, args.skip_interpreter);
  config
    .resolve_dirs_from_cwd()
    .context("Failed to resolve output directories")?;
  debug!(
    build_dir = %config.build_dir.display(),
    dist_dir = %config.dist_dir.display(),
    interpreter = config.interpreter.enabled,
    "resolved configuration"
  );

  let started = Instant::now();
  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;
  let report = rt
    .block_on(pipeline::run(&ProcessRunner, &config))
    .context("Bundle failed")?;
  let elapsed = started.elapsed();

  if args.output.is_json() {
    print_json(&RunSummary {
      report: &report,
      elapsed_ms: elapsed.as_millis(),
    })?;
  } else {
    print_report(&report, elapsed, args.verbose);
  }

  Ok(())
}

fn apply_overrides(config: &mut BundleConfig, base_url: Option<BaseUrlArg>, skip_interpreter: bool) {
  match base_url {
    Some(BaseUrlArg::Empty) => config.playground.base_url = BaseUrlMode::Empty,
    Some(BaseUrlArg::PathAware) => {
      if !matches!(config.playground.base_url, BaseUrlMode::PathAware { .. }) {
        config.playground.base_url = BaseUrlMode::default();
      }
    }
    None => {}
  }

  if skip_interpreter {
    config.interpreter.enabled = false;
  }
}

fn print_report(report: &BundleReport, elapsed: Duration, verbose: bool) {
  println!();
  print_success(&format!("Bundle written to {}", report.dist_dir.display()));
  print_stat("Units built", &report.units.len().to_string());
  print_stat("Artifacts", &report.artifacts.len().to_string());
  print_stat("Assets", &report.assets.len().to_string());
  print_stat("Elapsed", &format_duration(elapsed));

  println!();
  println!("Artifacts:");
  for artifact in &report.artifacts {
    println!(
      "  {} {} ({}, {})",
      symbols::ADD,
      file_name(&artifact.path),
      format_bytes(artifact.size),
      truncate_hash(&artifact.sha256.0)
    );
  }
  if let Some(queries) = &report.queries {
    println!("  {} {}/", symbols::ADD, file_name(queries));
  }

  println!();
  println!("Pages:");
  println!("  {} {}", symbols::ADD, file_name(&report.index));
  if let Some(page) = &report.compiler_page {
    println!("  {} {}", symbols::ADD, file_name(page));
  }

  if verbose {
    println!();
    println!("Units:");
    for unit in &report.units {
      println!("  {} {} {} {}", symbols::INFO, unit.unit, symbols::ARROW, unit.dir.display());
    }
    println!();
    println!("Assets:");
    for asset in report.assets.iter().chain(report.interpreter_script.iter()) {
      println!("  {} {}", symbols::INFO, file_name(asset));
    }
  }

  let skipped: Vec<_> = report
    .substitutions
    .iter()
    .filter(|(_, outcome)| matches!(outcome, SubstitutionOutcome::NotFound))
    .map(|(name, _)| *name)
    .collect();
  if !skipped.is_empty() {
    println!();
    print_warning(&format!("Template substitutions not applied: {}", skipped.join(", ")));
  }

  if report.compiler_page.is_none() {
    print_info("Web interpreter skipped");
  }
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| path.display().to_string())
}
