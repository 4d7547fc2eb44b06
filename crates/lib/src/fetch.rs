//! Fixed asset downloads.
//!
//! The playground needs the web-tree-sitter runtime and its wasm companion
//! next to `index.html`. Each asset is downloaded once per run; a failed
//! download is fatal and there is no retry or checksum verification.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FetchError {
  /// HTTP request failed.
  #[error("fetch failed for {url}: {message}")]
  Request { url: String, message: String },

  /// Failed to write the downloaded file.
  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },
}

/// Download `<base_url>/<name>` to `<out_dir>/<name>` for each name, in order.
pub async fn fetch_assets<S: AsRef<str>>(base_url: &str, names: &[S], out_dir: &Path) -> Result<Vec<PathBuf>, FetchError> {
  fs::create_dir_all(out_dir).map_err(|e| FetchError::Write {
    path: out_dir.to_path_buf(),
    source: e,
  })?;

  let mut fetched = Vec::with_capacity(names.len());
  for name in names {
    let name = name.as_ref();
    let url = asset_url(base_url, name);
    let dest = out_dir.join(name);
    fetch_to_file(&url, &dest).await?;
    fetched.push(dest);
  }

  Ok(fetched)
}

/// Download `url` and write the body to `dest`, replacing any existing file.
pub async fn fetch_to_file(url: &str, dest: &Path) -> Result<u64, FetchError> {
  info!(url = %url, "fetching URL");

  let request_err = |message: String| FetchError::Request {
    url: url.to_string(),
    message,
  };

  let response = reqwest::get(url).await.map_err(|e| request_err(e.to_string()))?;

  if !response.status().is_success() {
    return Err(request_err(format!("HTTP {}", response.status())));
  }

  let bytes = response.bytes().await.map_err(|e| request_err(e.to_string()))?;

  fs::write(dest, &bytes).map_err(|e| FetchError::Write {
    path: dest.to_path_buf(),
    source: e,
  })?;

  info!(path = %dest.display(), size = bytes.len(), "download complete");
  Ok(bytes.len() as u64)
}

fn asset_url(base_url: &str, name: &str) -> String {
  format!("{}/{}", base_url.trim_end_matches('/'), name.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn asset_url_joins_without_double_slash() {
    assert_eq!(
      asset_url("https://tree-sitter.github.io/", "web-tree-sitter.js"),
      "https://tree-sitter.github.io/web-tree-sitter.js"
    );
    assert_eq!(asset_url("http://host", "/a.wasm"), "http://host/a.wasm");
  }

  #[tokio::test]
  async fn downloads_each_asset_into_out_dir() {
    let mut server = mockito::Server::new_async().await;
    let js = server
      .mock("GET", "/web-tree-sitter.js")
      .with_body("export default {}")
      .create_async()
      .await;
    let wasm = server
      .mock("GET", "/web-tree-sitter.wasm")
      .with_body(b"\0asm".as_slice())
      .create_async()
      .await;
    let out = TempDir::new().unwrap();

    let fetched = fetch_assets(
      &server.url(),
      &["web-tree-sitter.js", "web-tree-sitter.wasm"],
      out.path(),
    )
    .await
    .unwrap();

    js.assert_async().await;
    wasm.assert_async().await;
    assert_eq!(fetched.len(), 2);
    assert_eq!(
      fs::read_to_string(out.path().join("web-tree-sitter.js")).unwrap(),
      "export default {}"
    );
    assert_eq!(fs::read(out.path().join("web-tree-sitter.wasm")).unwrap(), b"\0asm");
  }

  #[tokio::test]
  async fn http_error_status_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _missing = server
      .mock("GET", "/web-tree-sitter.js")
      .with_status(404)
      .create_async()
      .await;
    let out = TempDir::new().unwrap();

    let result = fetch_assets(&server.url(), &["web-tree-sitter.js"], out.path()).await;

    match result {
      Err(FetchError::Request { message, .. }) => assert!(message.contains("404")),
      other => panic!("expected request error, got {:?}", other),
    }
    assert!(!out.path().join("web-tree-sitter.js").exists());
  }

  #[tokio::test]
  async fn unreachable_host_is_fatal() {
    let out = TempDir::new().unwrap();
    let result = fetch_to_file("http://127.0.0.1:1/web-tree-sitter.js", &out.path().join("x.js")).await;
    assert!(matches!(result, Err(FetchError::Request { .. })));
  }
}
