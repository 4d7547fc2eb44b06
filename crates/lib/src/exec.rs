//! External tool invocation.
//!
//! Every external program the pipeline drives (git, the parser generator,
//! make) goes through a [`ToolRunner`]. Each call is awaited to completion
//! before the pipeline moves on; there is no timeout and no cancellation.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Errors that can occur while running an external tool.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The program could not be started at all.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The program ran and exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },
}

/// A fully described external invocation.
///
/// The child inherits the process environment; `env` entries are layered on
/// top for this invocation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
  pub program: String,
  pub args: Vec<String>,
  pub env: BTreeMap<String, String>,
  pub cwd: Option<PathBuf>,
}

impl ToolCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      env: BTreeMap::new(),
      cwd: None,
    }
  }

  /// Build a command from a program followed by leading arguments, e.g. `["npx", "tree-sitter"]`.
  ///
  /// Returns `None` for an empty slice.
  pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Option<Self> {
    let (program, rest) = argv.split_first()?;
    Some(Self::new(program.as_ref()).args(rest.iter().map(|s| s.as_ref())))
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn envs(mut self, vars: &BTreeMap<String, String>) -> Self {
    self.env.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    self
  }

  pub fn cwd(mut self, dir: &Path) -> Self {
    self.cwd = Some(dir.to_path_buf());
    self
  }
}

impl fmt::Display for ToolCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (key, value) in &self.env {
      write!(f, "{}={} ", key, value)?;
    }
    f.write_str(&self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Runs external tools to completion.
pub trait ToolRunner {
  /// Run `command` and return its trimmed stdout.
  fn run(&self, command: &ToolCommand) -> impl Future<Output = Result<String, ExecError>>;
}

/// Runs tools as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
  async fn run(&self, command: &ToolCommand) -> Result<String, ExecError> {
    info!(cmd = %command, "executing command");

    let mut child = Command::new(&command.program);
    child.args(&command.args).envs(&command.env).kill_on_drop(true);
    if let Some(cwd) = &command.cwd {
      child.current_dir(cwd);
    }

    debug!(program = %command.program, cwd = ?command.cwd, "spawning process");

    let output = child.output().await.map_err(|e| ExecError::Spawn {
      program: command.program.clone(),
      source: e,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
      if !stderr.is_empty() {
        debug!(stderr = %stderr, "command stderr");
      }
      if !stdout.is_empty() {
        debug!(stdout = %stdout, "command stdout");
      }

      return Err(ExecError::CmdFailed {
        cmd: command.to_string(),
        code: output.status.code(),
      });
    }

    let stdout = stdout.trim().to_string();
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command output");
    }

    Ok(stdout)
  }
}
