//! Repository staging.
//!
//! Makes sure a remote repository is checked out at a local path and sits at
//! the remote's current head:
//! - absent path: shallow clone (`--depth 1`)
//! - existing path: shallow fetch, then hard reset to what was fetched,
//!   discarding any local modifications
//!
//! Staging always shells out to `git` through a [`ToolRunner`]. Any failure
//! is fatal; a half-cloned checkout is left for the next run to refresh.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::RepoSpec;
use crate::exec::{ExecError, ToolCommand, ToolRunner};

/// Errors that can occur while staging a repository.
#[derive(Debug, Error)]
pub enum StageError {
  /// Failed to create the directory the checkout lives in.
  #[error("failed to create directory '{}': {source}", path.display())]
  CreateParent {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Failed to clone a repository.
  #[error("failed to clone repository '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: ExecError,
  },

  /// Failed to fetch into an existing checkout.
  #[error("failed to fetch from '{url}': {source}")]
  Fetch {
    url: String,
    #[source]
    source: ExecError,
  },

  /// Failed to reset an existing checkout.
  #[error("failed to reset '{}' to fetched head: {source}", path.display())]
  Reset {
    path: PathBuf,
    #[source]
    source: ExecError,
  },
}

/// What staging had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
  Cloned,
  Refreshed,
}

/// Stage `repo` at `path`.
pub async fn stage<R: ToolRunner>(runner: &R, repo: &RepoSpec, path: &Path) -> Result<StageAction, StageError> {
  if !path.exists() {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| StageError::CreateParent {
        path: parent.to_path_buf(),
        source: e,
      })?;
    }

    info!(url = %repo.url, path = %path.display(), "shallow cloning repository");
    runner
      .run(&clone_command(repo, path))
      .await
      .map_err(|e| StageError::Clone {
        url: repo.url.clone(),
        source: e,
      })?;

    return Ok(StageAction::Cloned);
  }

  info!(url = %repo.url, path = %path.display(), "refreshing existing checkout");

  runner
    .run(&fetch_command(repo, path))
    .await
    .map_err(|e| StageError::Fetch {
      url: repo.url.clone(),
      source: e,
    })?;

  runner
    .run(&reset_command(path))
    .await
    .map_err(|e| StageError::Reset {
      path: path.to_path_buf(),
      source: e,
    })?;

  Ok(StageAction::Refreshed)
}

fn clone_command(repo: &RepoSpec, path: &Path) -> ToolCommand {
  let mut command = ToolCommand::new("git").args(["clone", "--depth", "1"]);
  if let Some(branch) = &repo.branch {
    command = command.args(["--branch", branch.as_str()]);
  }
  command.arg(repo.url.as_str()).arg(path.to_string_lossy())
}

fn fetch_command(repo: &RepoSpec, path: &Path) -> ToolCommand {
  // `HEAD` on the remote side is its default branch.
  let refspec = repo.branch.as_deref().unwrap_or("HEAD");
  ToolCommand::new("git")
    .args(["fetch", "--depth", "1", "origin", refspec])
    .cwd(path)
}

fn reset_command(path: &Path) -> ToolCommand {
  ToolCommand::new("git").args(["reset", "--hard", "FETCH_HEAD"]).cwd(path)
}
