//! Scoped mutation of process-wide state.
//!
//! [`EnvScope`] and [`DirScope`] capture the previous value on construction
//! and put it back when dropped, including when the scope is left through an
//! error or a panic.
//!
//! Both mutate state shared by the whole process. The pipeline runs on a
//! single thread and never holds two overlapping scopes for the same state
//! from different tasks.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Environment variables set for the lifetime of the guard.
#[derive(Debug)]
pub struct EnvScope {
  saved: Vec<(String, Option<OsString>)>,
}

impl EnvScope {
  /// Set each `(key, value)` and remember what it was before.
  pub fn enter<I, K, V>(vars: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
  {
    let mut saved = Vec::new();
    for (key, value) in vars {
      let key = key.into();
      saved.push((key.clone(), env::var_os(&key)));
      // SAFETY: no other thread reads or writes the environment while the pipeline runs.
      unsafe { env::set_var(&key, value.as_ref()) };
    }
    debug!(vars = ?saved.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(), "entered env scope");
    Self { saved }
  }
}

impl Drop for EnvScope {
  fn drop(&mut self) {
    // Reverse order so a key listed twice ends at its original value.
    for (key, previous) in self.saved.drain(..).rev() {
      match previous {
        // SAFETY: see `EnvScope::enter`.
        Some(value) => unsafe { env::set_var(&key, value) },
        None => unsafe { env::remove_var(&key) },
      }
    }
  }
}

/// The process working directory, changed for the lifetime of the guard.
#[derive(Debug)]
pub struct DirScope {
  previous: PathBuf,
}

impl DirScope {
  pub fn enter(dir: &Path) -> io::Result<Self> {
    let previous = env::current_dir()?;
    env::set_current_dir(dir)?;
    debug!(dir = %dir.display(), "entered directory");
    Ok(Self { previous })
  }

  /// The directory that will be restored on drop.
  pub fn previous(&self) -> &Path {
    &self.previous
  }
}

impl Drop for DirScope {
  fn drop(&mut self) {
    if let Err(e) = env::set_current_dir(&self.previous) {
      warn!(dir = %self.previous.display(), error = %e, "failed to restore working directory");
    }
  }
}
