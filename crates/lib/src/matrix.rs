//! Build matrix expansion.
//!
//! The variant and language lists are expanded once into a flat list of
//! [`BuildUnit`]s. Building, collection and the playground language list are
//! all driven from that same list.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// One (variant, language) pair of the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BuildUnit {
  pub variant: String,
  pub language: String,
}

impl BuildUnit {
  pub fn new(variant: &str, language: &str) -> Self {
    Self {
      variant: variant.to_string(),
      language: language.to_string(),
    }
  }

  /// Name of the unit's working directory, e.g. `catala_en`.
  pub fn dir_name(&self) -> String {
    format!("{}_{}", self.variant, self.language)
  }

  pub fn working_dir(&self, repo_root: &Path) -> PathBuf {
    repo_root.join(self.dir_name())
  }
}

impl fmt::Display for BuildUnit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.dir_name())
  }
}

/// The Cartesian product of variants and languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMatrix {
  units: Vec<BuildUnit>,
}

impl BuildMatrix {
  /// Expand `variants × languages`, variants outermost.
  pub fn new<V, L>(variants: &[V], languages: &[L]) -> Self
  where
    V: AsRef<str>,
    L: AsRef<str>,
  {
    let units = variants
      .iter()
      .flat_map(|variant| {
        languages
          .iter()
          .map(move |language| BuildUnit::new(variant.as_ref(), language.as_ref()))
      })
      .collect();

    Self { units }
  }

  pub fn units(&self) -> &[BuildUnit] {
    &self.units
  }

  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }

  /// Directory names of every unit built for `variant`, in matrix order.
  ///
  /// These double as the parser codes offered by the playground selector.
  pub fn codes_for_variant(&self, variant: &str) -> Vec<String> {
    self
      .units
      .iter()
      .filter(|unit| unit.variant == variant)
      .map(BuildUnit::dir_name)
      .collect()
  }
}

/// One external toolchain invocation in a unit's build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStep {
  Generate,
  BuildNative,
  BuildPortable,
}

impl fmt::Display for ToolStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ToolStep::Generate => "generate",
      ToolStep::BuildNative => "build",
      ToolStep::BuildPortable => "build --wasm",
    };
    f.write_str(name)
  }
}

/// How far a unit's build has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStage {
  Pending,
  Generated,
  BuiltNative,
  BuiltPortable,
}

impl UnitStage {
  /// The step that moves the unit out of this stage, or `None` once done.
  pub fn next_step(self) -> Option<ToolStep> {
    match self {
      UnitStage::Pending => Some(ToolStep::Generate),
      UnitStage::Generated => Some(ToolStep::BuildNative),
      UnitStage::BuiltNative => Some(ToolStep::BuildPortable),
      UnitStage::BuiltPortable => None,
    }
  }

  /// The stage reached after `step` succeeds.
  pub fn after(step: ToolStep) -> Self {
    match step {
      ToolStep::Generate => UnitStage::Generated,
      ToolStep::BuildNative => UnitStage::BuiltNative,
      ToolStep::BuildPortable => UnitStage::BuiltPortable,
    }
  }

  pub fn is_done(self) -> bool {
    self.next_step().is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expands_variant_outer_language_inner() {
    let matrix = BuildMatrix::new(&["a", "b"], &["x", "y"]);
    let names: Vec<String> = matrix.units().iter().map(BuildUnit::dir_name).collect();
    assert_eq!(names, vec!["a_x", "a_y", "b_x", "b_y"]);
  }

  #[test]
  fn empty_list_gives_empty_matrix() {
    let matrix = BuildMatrix::new(&["a"], &[] as &[&str]);
    assert!(matrix.is_empty());
  }

  #[test]
  fn codes_for_variant_follow_language_order() {
    let matrix = BuildMatrix::new(&["catala", "catala_expr"], &["en", "fr", "pl"]);
    assert_eq!(
      matrix.codes_for_variant("catala"),
      vec!["catala_en", "catala_fr", "catala_pl"]
    );
    assert!(matrix.codes_for_variant("missing").is_empty());
  }

  #[test]
  fn stage_machine_walks_all_steps() {
    let mut stage = UnitStage::Pending;
    let mut steps = Vec::new();
    while let Some(step) = stage.next_step() {
      steps.push(step);
      stage = UnitStage::after(step);
    }

    assert_eq!(
      steps,
      vec![ToolStep::Generate, ToolStep::BuildNative, ToolStep::BuildPortable]
    );
    assert!(stage.is_done());
  }

  #[test]
  fn working_dir_is_under_repo_root() {
    let unit = BuildUnit::new("catala_code", "pl");
    assert_eq!(
      unit.working_dir(Path::new("/repo")),
      PathBuf::from("/repo/catala_code_pl")
    );
  }
}
