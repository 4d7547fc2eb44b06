//! End-to-end bundle run.
//!
//! The parser half stages the grammar repository, builds every unit of the
//! matrix, collects artifacts, fetches the web-tree-sitter runtime and writes
//! the playground. The interpreter half, when enabled, adds the web
//! interpreter and its compiler page. Any error aborts the run.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::build::{BuildError, UnitReport, build_matrix};
use crate::collect::{CollectError, collect};
use crate::config::{BundleConfig, ConfigError};
use crate::exec::ToolRunner;
use crate::fetch::{FetchError, fetch_assets};
use crate::interpreter::{InterpreterError, InterpreterOutput, build_interpreter};
use crate::site::{RewriteOptions, SubstitutionOutcome, TemplateError, language_options, rewrite_template};
use crate::stage::{StageError, stage};
use crate::util::hash::{ContentHash, hash_file};

/// Any failure of a bundle run.
#[derive(Debug, Error)]
pub enum BundleError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Stage(#[from] StageError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Collect(#[from] CollectError),

  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error(transparent)]
  Interpreter(#[from] InterpreterError),

  #[error("failed to hash {}: {source}", path.display())]
  Hash { path: PathBuf, source: std::io::Error },
}

/// A collected parser artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactRecord {
  pub path: PathBuf,
  pub size: u64,
  pub sha256: ContentHash,
}

/// Everything a run put into the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct BundleReport {
  pub dist_dir: PathBuf,
  pub units: Vec<UnitReport>,
  pub artifacts: Vec<ArtifactRecord>,
  pub queries: Option<PathBuf>,
  pub assets: Vec<PathBuf>,
  pub index: PathBuf,
  pub playground_script: PathBuf,
  pub substitutions: Vec<(&'static str, SubstitutionOutcome)>,
  pub compiler_page: Option<PathBuf>,
  pub interpreter_script: Option<PathBuf>,
}

/// Run the whole pipeline with `config`.
///
/// `dist_dir` is only created once the parser matrix has built, so a run
/// that fails while staging or building leaves no output behind.
pub async fn run<R: ToolRunner>(runner: &R, config: &BundleConfig) -> Result<BundleReport, BundleError> {
  let mut report = run_parsers(runner, config).await?;

  if config.interpreter.enabled {
    let output = run_interpreter(runner, config).await?;
    report.compiler_page = Some(output.page);
    report.interpreter_script = Some(output.script);
  } else {
    info!("interpreter build disabled");
  }

  info!(
    units = report.units.len(),
    artifacts = report.artifacts.len(),
    dist = %config.dist_dir.display(),
    "bundle complete"
  );
  Ok(report)
}

/// Build the parser matrix and the playground into `dist_dir`.
pub async fn run_parsers<R: ToolRunner>(runner: &R, config: &BundleConfig) -> Result<BundleReport, BundleError> {
  let parsers = &config.parsers;
  let playground = &config.playground;
  let dist = &config.dist_dir;

  let parser_repo = config.parser_checkout();
  stage(runner, &parsers.repo, &parser_repo).await?;

  let matrix = parsers.matrix();
  let units = build_matrix(runner, &parser_repo, &matrix, parsers).await?;

  let collected = collect(
    &parser_repo,
    &matrix,
    &parsers.artifact_extension,
    &parsers.queries_dir,
    dist,
  )?;
  let artifacts = collected
    .artifacts
    .iter()
    .map(|path| artifact_record(path.clone()))
    .collect::<Result<Vec<_>, _>>()?;

  let tree_sitter = config.tree_sitter_checkout();
  stage(runner, &playground.repo, &tree_sitter).await?;

  let assets = fetch_assets(&playground.asset_base_url, &playground.assets, dist).await?;

  let options = RewriteOptions {
    display_name: playground.display_name.clone(),
    brand_placeholder: playground.brand_placeholder.clone(),
    base_url: playground.base_url.clone(),
    languages: language_options(&matrix.codes_for_variant(&playground.variant), &playground.labels),
    compiler_link: config.interpreter.enabled,
  };
  let rewritten = rewrite_template(
    &tree_sitter.join(&playground.template),
    &tree_sitter.join(&playground.script),
    &options,
    dist,
  )?;

  Ok(BundleReport {
    dist_dir: dist.clone(),
    units,
    artifacts,
    queries: collected.queries,
    assets,
    index: rewritten.index,
    playground_script: rewritten.script,
    substitutions: rewritten.outcomes,
    compiler_page: None,
    interpreter_script: None,
  })
}

/// Build the web interpreter and its compiler page into `dist_dir`.
pub async fn run_interpreter<R: ToolRunner>(
  runner: &R,
  config: &BundleConfig,
) -> Result<InterpreterOutput, BundleError> {
  let output = build_interpreter(
    runner,
    &config.interpreter,
    &config.interpreter_checkout(),
    &config.playground.display_name,
    &config.dist_dir,
  )
  .await?;
  Ok(output)
}

fn artifact_record(path: PathBuf) -> Result<ArtifactRecord, BundleError> {
  let hash_err = |e| BundleError::Hash {
    path: path.clone(),
    source: e,
  };
  let size = fs::metadata(&path).map_err(hash_err)?.len();
  let sha256 = hash_file(&path).map_err(hash_err)?;
  Ok(ArtifactRecord { path, size, sha256 })
}
