//! File copying helpers.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Copy `from` to `to`, creating parent directories of `to` as needed.
///
/// An existing file at `to` is overwritten.
pub fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::copy(from, to)
}

/// Recursively copy the contents of `from` into `to`, merging with whatever is already there.
///
/// Returns the number of files copied.
pub fn copy_dir_all(from: &Path, to: &Path) -> io::Result<usize> {
  fs::create_dir_all(to)?;
  let mut copied = 0;

  for entry in WalkDir::new(from).min_depth(1).follow_links(true) {
    let entry = entry.map_err(io::Error::other)?;
    let relative = entry
      .path()
      .strip_prefix(from)
      .map_err(io::Error::other)?;
    let target = to.join(relative);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&target)?;
    } else {
      copy_file(entry.path(), &target)?;
      copied += 1;
    }
  }

  Ok(copied)
}
