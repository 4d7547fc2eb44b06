//! Artifact collection.
//!
//! Gathers the portable parser builds of every unit, plus the shared query
//! files, into the flat output directory.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::matrix::BuildMatrix;
use crate::util::fs::{copy_dir_all, copy_file};

#[derive(Debug, Error)]
pub enum CollectError {
  #[error("failed to list {}: {source}", path.display())]
  ReadDir { path: PathBuf, source: std::io::Error },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: std::io::Error,
  },
}

/// What was copied into the output directory.
#[derive(Debug, Default, Clone)]
pub struct Collected {
  /// Destination paths of copied artifacts, in matrix order.
  pub artifacts: Vec<PathBuf>,
  /// Destination of the copied queries directory, if there was one.
  pub queries: Option<PathBuf>,
}

/// Copy every `*.<extension>` file of each unit directory into `out_dir`.
///
/// Units whose directory does not exist are skipped. Files with the same name
/// overwrite each other; the last unit in matrix order wins.
pub fn collect_artifacts(
  repo_root: &Path,
  matrix: &BuildMatrix,
  extension: &str,
  out_dir: &Path,
) -> Result<Vec<PathBuf>, CollectError> {
  fs::create_dir_all(out_dir).map_err(|e| CollectError::ReadDir {
    path: out_dir.to_path_buf(),
    source: e,
  })?;

  let mut copied = Vec::new();
  for unit in matrix.units() {
    let dir = unit.working_dir(repo_root);
    if !dir.is_dir() {
      debug!(unit = %unit, dir = %dir.display(), "working directory missing, skipping");
      continue;
    }

    for path in matching_files(&dir, extension)? {
      let Some(name) = path.file_name() else {
        continue;
      };
      let dest = out_dir.join(name);
      copy_file(&path, &dest).map_err(|e| CollectError::Copy {
        from: path.clone(),
        to: dest.clone(),
        source: e,
      })?;
      info!(file = %name.to_string_lossy(), unit = %unit, "copied artifact");
      copied.push(dest);
    }
  }

  Ok(copied)
}

/// Recursively copy `<repo_root>/<queries_dir>` to `<out_dir>/queries`, if present.
pub fn collect_queries(repo_root: &Path, queries_dir: &str, out_dir: &Path) -> Result<Option<PathBuf>, CollectError> {
  let source = repo_root.join(queries_dir);
  if !source.is_dir() {
    debug!(dir = %source.display(), "no queries directory");
    return Ok(None);
  }

  let dest = out_dir.join("queries");
  let count = copy_dir_all(&source, &dest).map_err(|e| CollectError::Copy {
    from: source.clone(),
    to: dest.clone(),
    source: e,
  })?;
  info!(files = count, "copied queries");
  Ok(Some(dest))
}

/// Artifacts and queries in one call.
pub fn collect(
  repo_root: &Path,
  matrix: &BuildMatrix,
  extension: &str,
  queries_dir: &str,
  out_dir: &Path,
) -> Result<Collected, CollectError> {
  Ok(Collected {
    artifacts: collect_artifacts(repo_root, matrix, extension, out_dir)?,
    queries: collect_queries(repo_root, queries_dir, out_dir)?,
  })
}

/// Regular files in `dir` whose extension is `extension`, sorted by name.
fn matching_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, CollectError> {
  let read_err = |e| CollectError::ReadDir {
    path: dir.to_path_buf(),
    source: e,
  };

  let mut files = Vec::new();
  for entry in fs::read_dir(dir).map_err(read_err)? {
    let entry = entry.map_err(read_err)?;
    let path = entry.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::write_tree;
  use tempfile::TempDir;

  fn dist_names(out_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(out_dir)
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
      .collect();
    names.sort();
    names
  }

  #[test]
  fn copies_one_artifact_per_unit() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_tree(
      repo.path(),
      &[
        ("a_x/tree-sitter-a_x.wasm", "x"),
        ("a_x/grammar.js", "g"),
        ("a_x/src/parser.c", "c"),
        ("a_y/tree-sitter-a_y.wasm", "y"),
        ("a_y/libtree-sitter-a_y.so", "so"),
      ],
    );

    let copied = collect_artifacts(repo.path(), &BuildMatrix::new(&["a"], &["x", "y"]), "wasm", out.path()).unwrap();

    assert_eq!(copied.len(), 2);
    assert_eq!(dist_names(out.path()), vec!["tree-sitter-a_x.wasm", "tree-sitter-a_y.wasm"]);
  }

  #[test]
  fn skips_units_without_working_directory() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_tree(
      repo.path(),
      &[("a_x/tree-sitter-a_x.wasm", "x"), ("a_z/tree-sitter-a_z.wasm", "z")],
    );

    let copied = collect_artifacts(
      repo.path(),
      &BuildMatrix::new(&["a"], &["x", "y", "z"]),
      "wasm",
      out.path(),
    )
    .unwrap();

    assert_eq!(copied.len(), 2);
    assert_eq!(dist_names(out.path()), vec!["tree-sitter-a_x.wasm", "tree-sitter-a_z.wasm"]);
  }

  #[test]
  fn later_units_overwrite_same_name() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_tree(repo.path(), &[("a_x/parser.wasm", "first"), ("a_y/parser.wasm", "second")]);

    collect_artifacts(repo.path(), &BuildMatrix::new(&["a"], &["x", "y"]), "wasm", out.path()).unwrap();

    assert_eq!(fs::read_to_string(out.path().join("parser.wasm")).unwrap(), "second");
  }

  #[test]
  fn queries_are_copied_when_present() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_tree(repo.path(), &[("queries/highlights.scm", "(identifier) @variable")]);

    let collected = collect(repo.path(), &BuildMatrix::new(&["a"], &["x"]), "wasm", "queries", out.path()).unwrap();

    assert!(collected.artifacts.is_empty());
    assert_eq!(collected.queries, Some(out.path().join("queries")));
    assert!(out.path().join("queries/highlights.scm").exists());
  }

  #[test]
  fn missing_queries_is_not_an_error() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let queries = collect_queries(repo.path(), "queries", out.path()).unwrap();

    assert!(queries.is_none());
    assert!(!out.path().join("queries").exists());
  }
}
