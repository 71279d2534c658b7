//! Parser configuration.

use sable_common::limits::MAX_PARSER_RECURSION_DEPTH;
use serde::{Deserialize, Serialize};

/// What kind of source unit is being parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeType {
    #[default]
    Program,
    /// Code handed to `eval`. Parsed like a program; only the root node
    /// records the difference.
    Eval,
}

/// Options shared by the full-build and the check-only parse.
///
/// Every field has a default, so a JSON config file only needs to name the
/// options it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    /// Start in strict mode, as if the unit began with `"use strict"`.
    pub strict: bool,
    pub code_type: CodeType,
    /// Build complete trees for nested function bodies instead of
    /// syntax-checking them and recording a lazy body.
    pub eager_function_bodies: bool,
    /// Accept `= default` initializers inside destructuring parameters.
    pub allow_parameter_defaults: bool,
    /// Fold `+ - * /` over numeric literals while building the tree.
    pub fold_constants: bool,
    /// Recursion budget for nested statements and expressions.
    pub max_recursion_depth: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            strict: false,
            code_type: CodeType::Program,
            eager_function_bodies: false,
            allow_parameter_defaults: false,
            fold_constants: false,
            max_recursion_depth: MAX_PARSER_RECURSION_DEPTH,
        }
    }
}

impl ParserOptions {
    pub fn strict() -> Self {
        ParserOptions {
            strict: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: ParserOptions =
            serde_json::from_str(r#"{ "strict": true, "code_type": "Eval" }"#).unwrap();
        assert!(options.strict);
        assert_eq!(options.code_type, CodeType::Eval);
        assert_eq!(options.max_recursion_depth, MAX_PARSER_RECURSION_DEPTH);
        assert!(!options.eager_function_bodies);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let result = serde_json::from_str::<ParserOptions>(r#"{ "stict": true }"#);
        assert!(result.is_err());
    }
}
