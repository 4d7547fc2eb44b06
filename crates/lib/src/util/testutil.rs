//! Test utilities for catala-wasm-lib.
//!
//! Cross-platform shell helpers for tests that spawn real processes, and
//! [`FakeRunner`], a [`ToolRunner`] that records invocations and fakes the
//! files real tools would produce.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::exec::{ExecError, ToolCommand, ToolRunner};

/// Returns the shell command and args to echo an environment variable.
#[cfg(unix)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), format!("echo \"${}\"", var)])
}

#[cfg(windows)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo %{}%", var)])
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Write `files` (relative path, content) under `root`.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
  for (relative, content) in files {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
  }
}

/// One recorded call to [`FakeRunner::run`].
#[derive(Debug, Clone)]
pub struct Invocation {
  pub command: ToolCommand,
  /// Watched environment variables as seen at call time.
  pub env: BTreeMap<String, Option<String>>,
  /// Process working directory at call time.
  pub process_cwd: PathBuf,
}

type Predicate = Box<dyn Fn(&ToolCommand) -> bool>;

/// A [`ToolRunner`] that never spawns anything.
///
/// - `git clone … <url> <dest>` creates `dest` with the files registered for `url`.
/// - `… build --wasm` writes `tree-sitter-<dir>.wasm` into the command's directory.
/// - `make …` writes the registered make outputs relative to the command's directory.
#[derive(Default)]
pub struct FakeRunner {
  invocations: RefCell<Vec<Invocation>>,
  watched_env: Vec<String>,
  clones: BTreeMap<String, Vec<(String, String)>>,
  make_outputs: Vec<(String, String)>,
  fail_when: Option<Predicate>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn watch_env(mut self, vars: &[&str]) -> Self {
    self.watched_env.extend(vars.iter().map(|v| v.to_string()));
    self
  }

  pub fn with_clone(mut self, url: &str, files: &[(&str, &str)]) -> Self {
    self.clones.insert(
      url.to_string(),
      files.iter().map(|(p, c)| (p.to_string(), c.to_string())).collect(),
    );
    self
  }

  pub fn with_make_output(mut self, relative: &str, content: &str) -> Self {
    self.make_outputs.push((relative.to_string(), content.to_string()));
    self
  }

  pub fn fail_when(mut self, predicate: impl Fn(&ToolCommand) -> bool + 'static) -> Self {
    self.fail_when = Some(Box::new(predicate));
    self
  }

  pub fn invocations(&self) -> Vec<Invocation> {
    self.invocations.borrow().clone()
  }

  /// Rendered command lines, in call order.
  pub fn command_lines(&self) -> Vec<String> {
    self
      .invocations
      .borrow()
      .iter()
      .map(|i| {
        let mut line = i.command.program.clone();
        for arg in &i.command.args {
          line.push(' ');
          line.push_str(arg);
        }
        line
      })
      .collect()
  }

  fn effective_cwd(command: &ToolCommand) -> PathBuf {
    command
      .cwd
      .clone()
      .unwrap_or_else(|| std::env::current_dir().unwrap())
  }
}

impl ToolRunner for FakeRunner {
  async fn run(&self, command: &ToolCommand) -> Result<String, ExecError> {
    let env = self
      .watched_env
      .iter()
      .map(|k| (k.clone(), std::env::var(k).ok()))
      .collect();
    self.invocations.borrow_mut().push(Invocation {
      command: command.clone(),
      env,
      process_cwd: std::env::current_dir().unwrap_or_default(),
    });

    if self.fail_when.as_ref().is_some_and(|f| f(command)) {
      return Err(ExecError::CmdFailed {
        cmd: command.to_string(),
        code: Some(1),
      });
    }

    let args: Vec<&str> = command.args.iter().map(String::as_str).collect();

    if command.program == "git" && args.first() == Some(&"clone") && args.len() >= 2 {
      let url = args[args.len() - 2];
      let dest = PathBuf::from(args[args.len() - 1]);
      fs::create_dir_all(&dest).unwrap();
      if let Some(files) = self.clones.get(url) {
        let files: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        write_tree(&dest, &files);
      }
    } else if args.ends_with(&["build", "--wasm"]) {
      let cwd = Self::effective_cwd(command);
      let dir_name = cwd.file_name().unwrap().to_string_lossy().to_string();
      fs::write(cwd.join(format!("tree-sitter-{}.wasm", dir_name)), b"\0asm").unwrap();
    } else if command.program == "make" {
      let cwd = Self::effective_cwd(command);
      let files: Vec<(&str, &str)> = self
        .make_outputs
        .iter()
        .map(|(p, c)| (p.as_str(), c.as_str()))
        .collect();
      write_tree(&cwd, &files);
    }

    Ok(String::new())
  }
}
