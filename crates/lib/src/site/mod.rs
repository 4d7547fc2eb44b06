//! Front-end pages of the bundle.
//!
//! - [`rewrite`]: adapts the upstream playground page into `index.html`
//! - [`compiler`]: generates the standalone `compiler.html`

pub mod compiler;
pub mod rewrite;
mod templates;

use std::path::PathBuf;

use thiserror::Error;

pub use compiler::{CompilerPage, generate_compiler_page};
pub use rewrite::{
  RewriteOptions, RewriteReport, Substitution, SubstitutionOutcome, language_options, rewrite_template,
};
pub use templates::{COMPILER_HTML_TEMPLATE, EXAMPLE_PROGRAM};

/// Errors that can occur while producing pages.
#[derive(Debug, Error)]
pub enum TemplateError {
  /// A file the page cannot be produced without is absent.
  #[error("required asset not found: {}", path.display())]
  MissingAsset { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },

  #[error("invalid pattern for substitution '{name}': {source}")]
  Pattern {
    name: &'static str,
    #[source]
    source: regex::Error,
  },

  #[error("failed to encode page data: {0}")]
  Encode(#[from] serde_json::Error),
}

/// Escape text for use inside HTML element content or a double-quoted attribute.
pub(crate) fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      _ => out.push(c),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escape_html_handles_markup_characters() {
    assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    assert_eq!(escape_html("Français"), "Français");
  }
}
