//! catala-wasm-lib: build pipeline for the Catala tree-sitter WASM bundle
//!
//! This crate assembles a static site from upstream sources:
//! - `stage`: clone or refresh the upstream repositories
//! - `build`: run the parser generator for every (variant, language) unit
//! - `collect`: gather `.wasm` artifacts and queries into the output directory
//! - `site`: rewrite the playground template and generate the compiler page
//! - `pipeline`: run all of the above in order

pub mod build;
pub mod collect;
pub mod config;
pub mod consts;
pub mod exec;
pub mod fetch;
pub mod interpreter;
pub mod matrix;
pub mod pipeline;
pub mod scope;
pub mod site;
pub mod stage;
pub mod util;
