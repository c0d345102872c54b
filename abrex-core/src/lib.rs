//! Abrex Core Library
//!
//! Translates ABNF grammars into regular expressions: either one flattened
//! pattern, or a dependency-ordered table of named patterns rendered as a
//! snippet of Python source. The grammar itself arrives pre-parsed as a
//! [`grammar::GrammarRule`] tree; parsing ABNF text is the caller's job.

pub mod codegen;
pub mod compress;
pub mod element;
pub mod error;
pub mod grammar;
pub mod letters;
pub mod render;
pub mod table;
pub mod translate;
pub mod traverse;

pub use codegen::{DEFAULT_LINE_WIDTH, represent_table, represent_table_with_width};
pub use compress::compress;
pub use element::{ClassItem, Element};
pub use error::{Result, TranslateError};
pub use grammar::{GrammarLiteral, GrammarNode, GrammarRule, LiteralValue};
pub use render::{escape_for_character_class, escape_literal, represent};
pub use table::RuleTable;
pub use traverse::{Convert, Transform, Visit};

/// Translate a grammar into one flattened regular expression pattern
///
/// The first rule is the root; every reference is inlined.
pub fn single_regexp(rules: &[GrammarRule]) -> Result<String> {
    let element = translate::translate(rules)?;
    Ok(render::represent(&element))
}

/// Translate a grammar into a Python snippet of named patterns
///
/// Each rule becomes one assignment, ordered so that every rule follows
/// the rules it references.
pub fn nested_python(rules: &[GrammarRule]) -> Result<String> {
    let table = table::translate(rules)?;
    Ok(codegen::represent_table(&table.rules))
}
