//! Bundle configuration.
//!
//! Every field has a default matching the reference deployment, so an empty
//! JSON object (or no config file at all) builds the full Catala bundle.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts;
use crate::matrix::BuildMatrix;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse config {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("failed to resolve working directory: {0}")]
  CurrentDir(#[source] std::io::Error),
}

/// A remote repository to stage locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSpec {
  pub url: String,
  /// Branch to reset to on refresh. `None` tracks the remote's default branch.
  #[serde(default)]
  pub branch: Option<String>,
}

impl RepoSpec {
  pub fn new(url: &str) -> Self {
    Self {
      url: url.to_string(),
      branch: None,
    }
  }

  pub fn with_branch(mut self, branch: &str) -> Self {
    self.branch = Some(branch.to_string());
    self
  }
}

/// How the playground computes the base URL it loads parsers from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BaseUrlMode {
  /// Parsers are served from the site root.
  Empty,
  /// Parsers live under `/<mount>` when the page is served from a path containing that segment.
  PathAware { mount: String },
}

impl Default for BaseUrlMode {
  fn default() -> Self {
    BaseUrlMode::PathAware {
      mount: consts::MOUNT_SEGMENT.to_string(),
    }
  }
}

/// A language code paired with its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageLabel {
  pub code: String,
  pub label: String,
}

impl LanguageLabel {
  pub fn new(code: &str, label: &str) -> Self {
    Self {
      code: code.to_string(),
      label: label.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
  /// Where upstream repositories are staged.
  pub build_dir: PathBuf,
  /// The flat output directory.
  pub dist_dir: PathBuf,
  pub parsers: ParserConfig,
  pub playground: PlaygroundConfig,
  pub interpreter: InterpreterConfig,
}

impl Default for BundleConfig {
  fn default() -> Self {
    Self {
      build_dir: PathBuf::from(consts::DEFAULT_BUILD_DIR),
      dist_dir: PathBuf::from(consts::DEFAULT_DIST_DIR),
      parsers: ParserConfig::default(),
      playground: PlaygroundConfig::default(),
      interpreter: InterpreterConfig::default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
  pub repo: RepoSpec,
  pub variants: Vec<String>,
  pub languages: Vec<String>,
  /// Program and leading arguments of the parser generator.
  pub generator: Vec<String>,
  pub abi: u32,
  pub config_template: String,
  pub config_file: String,
  pub grammar_file: String,
  pub queries_dir: String,
  pub artifact_extension: String,
  pub variant_var: String,
  pub language_var: String,
}

impl Default for ParserConfig {
  fn default() -> Self {
    Self {
      repo: RepoSpec::new(consts::PARSER_REPO_URL),
      variants: consts::VARIANTS.iter().map(|s| s.to_string()).collect(),
      languages: consts::LANGUAGES.iter().map(|s| s.to_string()).collect(),
      generator: vec!["npx".to_string(), "tree-sitter".to_string()],
      abi: consts::GENERATOR_ABI,
      config_template: consts::CONFIG_TEMPLATE.to_string(),
      config_file: consts::CONFIG_FILE.to_string(),
      grammar_file: consts::GRAMMAR_FILE.to_string(),
      queries_dir: consts::QUERIES_DIR.to_string(),
      artifact_extension: consts::ARTIFACT_EXTENSION.to_string(),
      variant_var: consts::VARIANT_VAR.to_string(),
      language_var: consts::LANGUAGE_VAR.to_string(),
    }
  }
}

impl ParserConfig {
  pub fn matrix(&self) -> BuildMatrix {
    BuildMatrix::new(&self.variants, &self.languages)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
  pub repo: RepoSpec,
  /// Template path relative to the staged tree-sitter checkout.
  pub template: PathBuf,
  /// Playground script path relative to the staged tree-sitter checkout.
  pub script: PathBuf,
  pub display_name: String,
  pub brand_placeholder: String,
  pub base_url: BaseUrlMode,
  /// Variant whose units populate the language selector.
  pub variant: String,
  pub labels: BTreeMap<String, String>,
  pub asset_base_url: String,
  pub assets: Vec<String>,
}

impl Default for PlaygroundConfig {
  fn default() -> Self {
    let variant = consts::VARIANTS[0].to_string();
    let labels = consts::LANGUAGES
      .iter()
      .map(|lang| (format!("{}_{}", variant, lang), format!("Catala ({})", lang)))
      .collect();

    Self {
      repo: RepoSpec::new(consts::TREE_SITTER_REPO_URL),
      template: PathBuf::from(consts::PLAYGROUND_TEMPLATE),
      script: PathBuf::from(consts::PLAYGROUND_SCRIPT),
      display_name: consts::DISPLAY_NAME.to_string(),
      brand_placeholder: consts::BRAND_PLACEHOLDER.to_string(),
      base_url: BaseUrlMode::default(),
      variant,
      labels,
      asset_base_url: consts::ASSET_BASE_URL.to_string(),
      assets: consts::ASSETS.iter().map(|s| s.to_string()).collect(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
  pub enabled: bool,
  pub repo: RepoSpec,
  pub targets: Vec<String>,
  /// Extra environment passed to each `make` invocation only.
  pub make_env: BTreeMap<String, String>,
  /// Built script path relative to the staged catala checkout.
  pub artifact: PathBuf,
  pub languages: Vec<LanguageLabel>,
  pub default_scope: String,
}

impl Default for InterpreterConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      repo: RepoSpec::new(consts::CATALA_REPO_URL).with_branch(consts::INTERPRETER_BRANCH),
      targets: consts::INTERPRETER_TARGETS.iter().map(|s| s.to_string()).collect(),
      make_env: BTreeMap::from([("OPAMYES".to_string(), "1".to_string())]),
      artifact: PathBuf::from(consts::INTERPRETER_ARTIFACT),
      languages: vec![
        LanguageLabel::new("en", "English"),
        LanguageLabel::new("fr", "Français"),
        LanguageLabel::new("pl", "Polski"),
      ],
      default_scope: "Test".to_string(),
    }
  }
}

impl BundleConfig {
  /// Load a configuration from a JSON file. Missing fields take their defaults.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;

    debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  /// Make `build_dir` and `dist_dir` absolute against `base`.
  ///
  /// Must run before any working-directory change, since relative paths are
  /// meant relative to where the tool was launched.
  pub fn resolve_dirs(&mut self, base: &Path) {
    if self.build_dir.is_relative() {
      self.build_dir = base.join(&self.build_dir);
    }
    if self.dist_dir.is_relative() {
      self.dist_dir = base.join(&self.dist_dir);
    }
  }

  /// [`resolve_dirs`](Self::resolve_dirs) against the current working directory.
  pub fn resolve_dirs_from_cwd(&mut self) -> Result<(), ConfigError> {
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    self.resolve_dirs(&cwd);
    Ok(())
  }

  pub fn parser_checkout(&self) -> PathBuf {
    self.build_dir.join("tree-sitter-catala")
  }

  pub fn tree_sitter_checkout(&self) -> PathBuf {
    self.build_dir.join("tree-sitter")
  }

  pub fn interpreter_checkout(&self) -> PathBuf {
    self.build_dir.join("catala")
  }
}
