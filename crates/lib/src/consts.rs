//! Reference configuration values.
//!
//! These mirror the upstream repositories and file layouts the bundle is
//! assembled from. Every one of them can be overridden through
//! [`BundleConfig`](crate::config::BundleConfig).

pub const APP_NAME: &str = "catala-wasm";

pub const PARSER_REPO_URL: &str = "https://github.com/CatalaLang/tree-sitter-catala";
pub const TREE_SITTER_REPO_URL: &str = "https://github.com/tree-sitter/tree-sitter";
pub const CATALA_REPO_URL: &str = "https://github.com/CatalaLang/catala";

pub const DEFAULT_BUILD_DIR: &str = ".build";
pub const DEFAULT_DIST_DIR: &str = "dist";

pub const VARIANTS: [&str; 3] = ["catala", "catala_code", "catala_expr"];
pub const LANGUAGES: [&str; 3] = ["en", "fr", "pl"];

/// Environment variables read by the grammar while it is being generated.
pub const VARIANT_VAR: &str = "TREESITTER_CATALA_VARIANT";
pub const LANGUAGE_VAR: &str = "TREESITTER_CATALA_LANG";

pub const CONFIG_TEMPLATE: &str = "Cargo.toml.in";
pub const CONFIG_FILE: &str = "Cargo.toml";
pub const GRAMMAR_FILE: &str = "grammar.js";
pub const QUERIES_DIR: &str = "queries";
pub const ARTIFACT_EXTENSION: &str = "wasm";
pub const GENERATOR_ABI: u32 = 14;

pub const PLAYGROUND_TEMPLATE: &str = "crates/cli/src/playground.html";
pub const PLAYGROUND_SCRIPT: &str = "docs/src/assets/js/playground.js";
pub const BRAND_PLACEHOLDER: &str = "THE_LANGUAGE_NAME";
pub const DISPLAY_NAME: &str = "Catala";
pub const MOUNT_SEGMENT: &str = "catala-wasm";

pub const ASSET_BASE_URL: &str = "https://tree-sitter.github.io";
pub const ASSETS: [&str; 2] = ["web-tree-sitter.js", "web-tree-sitter.wasm"];

pub const INDEX_PAGE: &str = "index.html";
pub const COMPILER_PAGE: &str = "compiler.html";
pub const PLAYGROUND_SCRIPT_NAME: &str = "playground.js";

pub const INTERPRETER_BRANCH: &str = "master";
pub const INTERPRETER_ARTIFACT: &str = "_build/default/compiler/web/catala_web_interpreter.bc.js";
pub const INTERPRETER_TARGETS: [&str; 2] = ["dependencies-js", "web-interpreter-tests"];
