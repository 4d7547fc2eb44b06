//! Page templates and fixed snippets.

/// Template for `compiler.html`.
///
/// Contains `{{title}}`, `{{language_options}}`, `{{default_scope}}`,
/// `{{default_code}}`, `{{playground_page}}` and `{{interpreter_script}}`
/// placeholders for substitution.
pub const COMPILER_HTML_TEMPLATE: &str = include_str!("compiler.html");

/// Example document the compiler page editor starts with.
pub const EXAMPLE_PROGRAM: &str = "```catala
declaration scope Test:
  output result content integer

scope Test:
  definition result equals 42
```";

/// Id of the playground's language `<select>`.
pub const LANGUAGE_SELECT_ID: &str = "language-select";

/// Variable the playground reads the parser base URL from.
pub const BASE_URL_VAR: &str = "LANGUAGE_BASE_URL";
