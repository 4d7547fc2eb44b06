//! Web interpreter build.
//!
//! Stages the Catala compiler sources, builds the js_of_ocaml interpreter
//! with `make`, copies the resulting script into the bundle and writes the
//! compiler page that drives it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::InterpreterConfig;
use crate::exec::{ExecError, ToolCommand, ToolRunner};
use crate::site::{CompilerPage, TemplateError, generate_compiler_page};
use crate::stage::{StageError, stage};
use crate::util::fs::copy_file;

#[derive(Debug, Error)]
pub enum InterpreterError {
  #[error(transparent)]
  Stage(#[from] StageError),

  #[error("make {target} failed: {source}")]
  Make {
    target: String,
    #[source]
    source: ExecError,
  },

  /// The build finished but did not leave the expected script behind.
  #[error("{} was not produced by the interpreter build", path.display())]
  MissingArtifact { path: PathBuf },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: std::io::Error,
  },

  #[error(transparent)]
  Page(#[from] TemplateError),
}

/// Files the interpreter build added to the bundle.
#[derive(Debug, Clone)]
pub struct InterpreterOutput {
  pub script: PathBuf,
  pub page: PathBuf,
}

/// Stage, build and publish the web interpreter into `out_dir`.
pub async fn build_interpreter<R: ToolRunner>(
  runner: &R,
  config: &InterpreterConfig,
  checkout: &Path,
  title: &str,
  out_dir: &Path,
) -> Result<InterpreterOutput, InterpreterError> {
  stage(runner, &config.repo, checkout).await?;

  for target in &config.targets {
    info!(target = %target, "building web interpreter");
    let command = ToolCommand::new("make").arg(target.as_str()).envs(&config.make_env).cwd(checkout);
    runner.run(&command).await.map_err(|e| InterpreterError::Make {
      target: target.clone(),
      source: e,
    })?;
  }

  let built = checkout.join(&config.artifact);
  if !built.is_file() {
    return Err(InterpreterError::MissingArtifact { path: built });
  }

  let page = CompilerPage::from_config(config, title);
  let script = out_dir.join(&page.interpreter_script);
  copy_file(&built, &script).map_err(|e| InterpreterError::Copy {
    from: built.clone(),
    to: script.clone(),
    source: e,
  })?;
  info!(path = %script.display(), "copied interpreter script");

  let page = generate_compiler_page(out_dir, &page)?;

  Ok(InterpreterOutput { script, page })
}
