//! Playground template rewriting.
//!
//! The upstream tree-sitter playground page is adapted with a fixed sequence
//! of text substitutions. There is no HTML parsing: each [`Substitution`] is a
//! regex over the raw markup, and a pattern that no longer matches leaves the
//! document as it was.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::templates::{BASE_URL_VAR, LANGUAGE_SELECT_ID};
use super::{TemplateError, escape_html};
use crate::config::{BaseUrlMode, LanguageLabel};
use crate::consts::{COMPILER_PAGE, INDEX_PAGE, PLAYGROUND_SCRIPT_NAME};
use crate::util::fs::copy_file;

/// Result of applying one [`Substitution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubstitutionOutcome {
  Applied { count: usize },
  NotFound,
}

/// A single text transform over the template.
#[derive(Debug, Clone)]
pub struct Substitution {
  pub name: &'static str,
  /// Whether a miss is worth a warning. Misses never fail the rewrite.
  pub required: bool,
  pattern: Regex,
  replacement: String,
  replace_all: bool,
}

impl Substitution {
  fn new(name: &'static str, pattern: &str, replacement: String) -> Result<Self, TemplateError> {
    Ok(Self {
      name,
      required: false,
      pattern: Regex::new(pattern).map_err(|e| TemplateError::Pattern { name, source: e })?,
      replacement,
      replace_all: false,
    })
  }

  fn required(mut self) -> Self {
    self.required = true;
    self
  }

  fn all(mut self) -> Self {
    self.replace_all = true;
    self
  }

  /// Apply to `doc` in place.
  pub fn apply(&self, doc: &mut String) -> SubstitutionOutcome {
    let matches = self.pattern.find_iter(doc.as_str()).count();
    if matches == 0 {
      if self.required {
        warn!(substitution = self.name, "pattern not found in template");
      } else {
        debug!(substitution = self.name, "pattern not found, skipping");
      }
      return SubstitutionOutcome::NotFound;
    }

    let replacement = NoExpand(&self.replacement);
    let (rewritten, count) = if self.replace_all {
      (self.pattern.replace_all(doc.as_str(), replacement).into_owned(), matches)
    } else {
      (self.pattern.replace(doc.as_str(), replacement).into_owned(), 1)
    };
    *doc = rewritten;

    SubstitutionOutcome::Applied { count }
  }
}

/// Everything the rewrite injects into the template.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
  pub display_name: String,
  pub brand_placeholder: String,
  pub base_url: BaseUrlMode,
  pub languages: Vec<LanguageLabel>,
  /// Append a link to the compiler page next to the language badge.
  pub compiler_link: bool,
}

/// What [`rewrite_template`] wrote.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
  pub index: PathBuf,
  pub script: PathBuf,
  pub outcomes: Vec<(&'static str, SubstitutionOutcome)>,
}

/// Pair each code with its registered label, falling back to the code itself.
pub fn language_options<S: AsRef<str>>(codes: &[S], labels: &BTreeMap<String, String>) -> Vec<LanguageLabel> {
  codes
    .iter()
    .map(|code| {
      let code = code.as_ref();
      let label = labels.get(code).map(String::as_str).unwrap_or(code);
      LanguageLabel::new(code, label)
    })
    .collect()
}

/// The substitutions, in the order they must run.
pub fn substitutions(options: &RewriteOptions) -> Result<Vec<Substitution>, TemplateError> {
  let mut steps = vec![
    Substitution::new(
      "branding",
      &regex::escape(&options.brand_placeholder),
      options.display_name.clone(),
    )?
    .required()
    .all(),
    Substitution::new(
      "base_url",
      &format!(r#"{} = "[^"]*";"#, BASE_URL_VAR),
      base_url_assignment(&options.base_url),
    )?
    .required(),
    Substitution::new(
      "language_select",
      &format!(r#"(?s)<select id="{}"[^>]*>.*?</select>"#, LANGUAGE_SELECT_ID),
      render_select(&options.languages),
    )?,
  ];

  if options.compiler_link {
    let badge = format!(
      r#"<span class="language-name">Language: {}</span>"#,
      options.display_name
    );
    steps.push(Substitution::new(
      "compiler_link",
      &regex::escape(&badge),
      format!(r#"{} <a href="./{}">Compiler</a>"#, badge, COMPILER_PAGE),
    )?);
  }

  Ok(steps)
}

/// Run `steps` over `doc` in order.
pub fn rewrite_document(doc: &str, steps: &[Substitution]) -> (String, Vec<(&'static str, SubstitutionOutcome)>) {
  let mut doc = doc.to_string();
  let outcomes = steps.iter().map(|step| (step.name, step.apply(&mut doc))).collect();
  (doc, outcomes)
}

/// Rewrite the playground template into `<out_dir>/index.html` and copy its script alongside.
///
/// Both the template and the script must exist; otherwise nothing is written
/// and `out_dir` is left untouched.
pub fn rewrite_template(
  template_path: &Path,
  script_path: &Path,
  options: &RewriteOptions,
  out_dir: &Path,
) -> Result<RewriteReport, TemplateError> {
  for required in [template_path, script_path] {
    if !required.is_file() {
      return Err(TemplateError::MissingAsset {
        path: required.to_path_buf(),
      });
    }
  }

  let template = fs::read_to_string(template_path).map_err(|e| TemplateError::Read {
    path: template_path.to_path_buf(),
    source: e,
  })?;
  let (document, outcomes) = rewrite_document(&template, &substitutions(options)?);

  let script = out_dir.join(PLAYGROUND_SCRIPT_NAME);
  copy_file(script_path, &script).map_err(|e| TemplateError::Write {
    path: script.clone(),
    source: e,
  })?;
  info!(path = %script.display(), "copied playground script");

  let index = out_dir.join(INDEX_PAGE);
  fs::write(&index, document).map_err(|e| TemplateError::Write {
    path: index.clone(),
    source: e,
  })?;
  info!(path = %index.display(), "wrote index page");

  Ok(RewriteReport {
    index,
    script,
    outcomes,
  })
}

/// The `LANGUAGE_BASE_URL` assignment for `mode`.
pub fn base_url_assignment(mode: &BaseUrlMode) -> String {
  match mode {
    BaseUrlMode::Empty => format!(r#"{} = "";"#, BASE_URL_VAR),
    BaseUrlMode::PathAware { mount } => {
      let mount = mount.trim_matches('/');
      format!(
        r#"{var} = (function(){{ var p = window.location.pathname; if (/\/{pattern}(\/|$)/.test(p)) return "/{mount}"; return ""; }})();"#,
        var = BASE_URL_VAR,
        pattern = escape_js_regex(mount),
        mount = mount,
      )
    }
  }
}

/// A fresh `<select>` with one option per language, in order.
pub fn render_select(languages: &[LanguageLabel]) -> String {
  let options: Vec<String> = languages
    .iter()
    .map(|l| format!(r#"<option value="{}">{}</option>"#, escape_html(&l.code), escape_html(&l.label)))
    .collect();
  format!(
    "<select id=\"{}\">\n          {}\n        </select>",
    LANGUAGE_SELECT_ID,
    options.join("\n          ")
  )
}

fn escape_js_regex(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if r"\^$.*+?()[]{}|/".contains(c) {
      out.push('\\');
    }
    out.push(c);
  }
  out
}
