//! Error types for the translation pipeline
//!
//! Translation either fully succeeds or fully fails; there is no partial
//! output. The variants below are the only failures the core can produce.

use thiserror::Error;

/// The error type for grammar-to-regexp translation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// The grammar contains no rules, so there is nothing to translate
    #[error("the grammar contains no rules")]
    EmptyGrammar,

    /// A rule references a name that is not defined in the grammar
    #[error("reference to an undefined rule '{0}'")]
    UndefinedRule(String),

    /// The rule references form a cycle, so no dependency order exists
    #[error("the grammar rules form a cycle: the rule '{0}' was visited more than once")]
    Cycle(String),
}

/// Result type alias for translation operations
pub type Result<T> = std::result::Result<T, TranslateError>;
