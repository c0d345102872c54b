//! Conversion of parsed ABNF rules into the core grammar contract
//!
//! The `abnf` crate owns the parsing; this module maps its node types onto
//! the closed variant set the translator consumes. Groups disappear (the
//! tree structure already carries them) and numeric terminals are always
//! case-sensitive.

use abnf::types::{Node, Repeat, Rule, TerminalValues};
use thiserror::Error;

use abrex_core::grammar::{GrammarNode, GrammarRule};

/// Grammar constructs the translator cannot accept
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Prose descriptions have no translatable structure
    #[error("the grammar contains a prose description: <{0}>")]
    Prose(String),

    /// A numeric terminal names a value outside the Unicode scalar range
    #[error("invalid code point in a numeric terminal: {0:#x}")]
    InvalidCodePoint(u32),
}

/// Convert a parsed rule list into the core's grammar rules
pub fn convert_rules(rules: &[Rule]) -> Result<Vec<GrammarRule>, AdapterError> {
    rules
        .iter()
        .map(|rule| {
            Ok(GrammarRule {
                name: rule.name().to_string(),
                node: convert_node(rule.node())?,
            })
        })
        .collect()
}

fn convert_node(node: &Node) -> Result<GrammarNode, AdapterError> {
    match node {
        Node::Alternatives(nodes) => Ok(GrammarNode::Alternation(
            nodes.iter().map(convert_node).collect::<Result<_, _>>()?,
        )),
        Node::Concatenation(nodes) => Ok(GrammarNode::Concatenation(
            nodes.iter().map(convert_node).collect::<Result<_, _>>()?,
        )),
        Node::Repetition { repeat, node } => {
            let (min, max) = match repeat {
                Repeat::Specific(count) => (Some(*count as u32), Some(*count as u32)),
                Repeat::Variable { min, max } => {
                    (min.map(|value| value as u32), max.map(|value| value as u32))
                }
            };
            Ok(GrammarNode::Repetition {
                min,
                max,
                node: Box::new(convert_node(node)?),
            })
        }
        Node::Rulename(name) => Ok(GrammarNode::Rulename(name.clone())),
        Node::Group(inner) => convert_node(inner),
        Node::Optional(inner) => Ok(GrammarNode::Optional(Box::new(convert_node(inner)?))),
        Node::String(literal) => Ok(GrammarNode::literal(
            literal.value(),
            literal.is_case_sensitive(),
        )),
        Node::TerminalValues(values) => convert_terminal_values(values),
        Node::Prose(text) => Err(AdapterError::Prose(text.clone())),
    }
}

fn convert_terminal_values(values: &TerminalValues) -> Result<GrammarNode, AdapterError> {
    match values {
        TerminalValues::Concatenation(codes) => {
            let mut text = String::with_capacity(codes.len());
            for &code in codes {
                text.push(char_from_code(code)?);
            }
            Ok(GrammarNode::literal(text, true))
        }
        TerminalValues::Range(start, end) => Ok(GrammarNode::range(
            char_from_code(*start)?,
            char_from_code(*end)?,
            true,
        )),
    }
}

fn char_from_code(code: u32) -> Result<char, AdapterError> {
    char::from_u32(code).ok_or(AdapterError::InvalidCodePoint(code))
}
