//! Compiler page generation.
//!
//! `compiler.html` is a self-contained editor page. It calls the global
//! `typecheck(req)` and `interpret(req)` functions that the interpreter
//! script installs once it has loaded, and renders their
//! `{ success, output?, diagnostics?: [{ level, message }] }` results. Until
//! the script is loaded, the buttons report that instead of throwing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::templates::{COMPILER_HTML_TEMPLATE, EXAMPLE_PROGRAM};
use super::{TemplateError, escape_html};
use crate::config::{InterpreterConfig, LanguageLabel};
use crate::consts::{COMPILER_PAGE, INDEX_PAGE};

/// Inputs of the generated compiler page.
#[derive(Debug, Clone)]
pub struct CompilerPage {
  pub title: String,
  /// Source languages offered in the selector; `code` selects the `main.catala_<code>` file name.
  pub languages: Vec<LanguageLabel>,
  pub default_scope: String,
  pub example: String,
  /// File name of the interpreter script, relative to the page.
  pub interpreter_script: String,
  /// File name of the playground page linked from the header.
  pub playground_page: String,
}

impl CompilerPage {
  pub fn from_config(config: &InterpreterConfig, title: &str) -> Self {
    let interpreter_script = config
      .artifact
      .file_name()
      .map(|name| name.to_string_lossy().to_string())
      .unwrap_or_default();

    Self {
      title: title.to_string(),
      languages: config.languages.clone(),
      default_scope: config.default_scope.clone(),
      example: EXAMPLE_PROGRAM.to_string(),
      interpreter_script,
      playground_page: INDEX_PAGE.to_string(),
    }
  }

  pub fn render(&self) -> Result<String, TemplateError> {
    let options: String = self
      .languages
      .iter()
      .map(|l| format!(r#"<option value="{}">{}</option>"#, escape_html(&l.code), escape_html(&l.label)))
      .collect();

    // Keep `</script>` inside the example from closing the inline script.
    let default_code = serde_json::to_string(&self.example)?.replace("</", "<\\/");

    Ok(
      COMPILER_HTML_TEMPLATE
        .replace("{{title}}", &escape_html(&self.title))
        .replace("{{language_options}}", &options)
        .replace("{{default_scope}}", &escape_html(&self.default_scope))
        .replace("{{playground_page}}", &escape_html(&self.playground_page))
        .replace("{{interpreter_script}}", &escape_html(&self.interpreter_script))
        .replace("{{default_code}}", &default_code),
    )
  }
}

/// Render `page` to `<out_dir>/compiler.html`.
pub fn generate_compiler_page(out_dir: &Path, page: &CompilerPage) -> Result<PathBuf, TemplateError> {
  let html = page.render()?;

  fs::create_dir_all(out_dir).map_err(|e| TemplateError::Write {
    path: out_dir.to_path_buf(),
    source: e,
  })?;

  let path = out_dir.join(COMPILER_PAGE);
  fs::write(&path, html).map_err(|e| TemplateError::Write {
    path: path.clone(),
    source: e,
  })?;

  info!(path = %path.display(), "wrote compiler page");
  Ok(path)
}
