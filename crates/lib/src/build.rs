//! Matrix builder.
//!
//! Each [`BuildUnit`] gets its own working directory under the staged parser
//! checkout, holding a rendered `Cargo.toml` and a copy of the grammar. The
//! parser generator then runs three times inside it while the unit's variant
//! and language are exported to the environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ParserConfig;
use crate::exec::{ExecError, ToolCommand, ToolRunner};
use crate::matrix::{BuildMatrix, BuildUnit, ToolStep, UnitStage};
use crate::scope::{DirScope, EnvScope};

/// Errors that can occur while building the matrix.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("failed to read {}: {source}", path.display())]
  ReadInput { path: PathBuf, source: std::io::Error },

  #[error("failed to prepare working directory {}: {source}", path.display())]
  Prepare { path: PathBuf, source: std::io::Error },

  #[error("failed to enter {}: {source}", path.display())]
  EnterDir { path: PathBuf, source: std::io::Error },

  #[error("no parser generator command configured")]
  NoGenerator,

  /// A toolchain step failed for one unit.
  #[error("unit {unit} failed at `{step}`: {source}")]
  Tool {
    unit: BuildUnit,
    step: ToolStep,
    #[source]
    source: ExecError,
  },
}

/// Outcome of one unit's build.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
  pub unit: BuildUnit,
  pub stage: UnitStage,
  pub dir: PathBuf,
}

/// Build every unit of `matrix` inside `repo_root`, in matrix order.
///
/// Stops at the first failing unit. Environment variables and the process
/// working directory are restored before the error is returned.
pub async fn build_matrix<R: ToolRunner>(
  runner: &R,
  repo_root: &Path,
  matrix: &BuildMatrix,
  config: &ParserConfig,
) -> Result<Vec<UnitReport>, BuildError> {
  if config.generator.is_empty() {
    return Err(BuildError::NoGenerator);
  }

  let template_path = repo_root.join(&config.config_template);
  let template = fs::read_to_string(&template_path).map_err(|e| BuildError::ReadInput {
    path: template_path,
    source: e,
  })?;
  let grammar = repo_root.join(&config.grammar_file);

  let _root = DirScope::enter(repo_root).map_err(|e| BuildError::EnterDir {
    path: repo_root.to_path_buf(),
    source: e,
  })?;

  let mut reports = Vec::with_capacity(matrix.units().len());
  for unit in matrix.units() {
    info!(unit = %unit, "generating and building");
    let dir = prepare_unit(unit, repo_root, &template, &grammar, config)?;
    let stage = build_unit(runner, unit, &dir, config).await?;
    reports.push(UnitReport {
      unit: unit.clone(),
      stage,
      dir,
    });
  }

  Ok(reports)
}

/// Substitute the unit's values into the config template.
pub fn render_config(template: &str, unit: &BuildUnit, config: &ParserConfig) -> String {
  template
    .replace(&placeholder(&config.variant_var), &unit.variant)
    .replace(&placeholder(&config.language_var), &unit.language)
}

fn placeholder(var: &str) -> String {
  format!("${{{}}}", var)
}

/// Create the unit's working directory with its config and grammar.
fn prepare_unit(
  unit: &BuildUnit,
  repo_root: &Path,
  template: &str,
  grammar: &Path,
  config: &ParserConfig,
) -> Result<PathBuf, BuildError> {
  let dir = unit.working_dir(repo_root);
  let prepare_err = |path: &Path| {
    let path = path.to_path_buf();
    move |e: std::io::Error| BuildError::Prepare { path, source: e }
  };

  fs::create_dir_all(&dir).map_err(prepare_err(&dir))?;

  let config_path = dir.join(&config.config_file);
  fs::write(&config_path, render_config(template, unit, config)).map_err(prepare_err(&config_path))?;

  let grammar_copy = dir.join(&config.grammar_file);
  fs::copy(grammar, &grammar_copy).map_err(prepare_err(&grammar_copy))?;

  debug!(unit = %unit, dir = %dir.display(), "prepared working directory");
  Ok(dir)
}

/// Drive one unit through its stage machine.
async fn build_unit<R: ToolRunner>(
  runner: &R,
  unit: &BuildUnit,
  dir: &Path,
  config: &ParserConfig,
) -> Result<UnitStage, BuildError> {
  let _env = EnvScope::enter([
    (config.variant_var.as_str(), unit.variant.as_str()),
    (config.language_var.as_str(), unit.language.as_str()),
  ]);
  let _dir = DirScope::enter(dir).map_err(|e| BuildError::EnterDir {
    path: dir.to_path_buf(),
    source: e,
  })?;

  let mut stage = UnitStage::Pending;
  while let Some(step) = stage.next_step() {
    let command = step_command(step, config)?.cwd(dir);
    runner.run(&command).await.map_err(|e| BuildError::Tool {
      unit: unit.clone(),
      step,
      source: e,
    })?;
    stage = UnitStage::after(step);
    debug!(unit = %unit, stage = ?stage, "step complete");
  }

  Ok(stage)
}

fn step_command(step: ToolStep, config: &ParserConfig) -> Result<ToolCommand, BuildError> {
  let base = ToolCommand::from_argv(&config.generator).ok_or(BuildError::NoGenerator)?;
  let command = match step {
    ToolStep::Generate => base.arg("generate").arg(format!("--abi={}", config.abi)),
    ToolStep::BuildNative => base.arg("build"),
    ToolStep::BuildPortable => base.args(["build", "--wasm"]),
  };
  Ok(command)
}
