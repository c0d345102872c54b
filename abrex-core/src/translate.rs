//! Translation of a grammar tree into a regular expression
//!
//! The node-by-node mapping is shared between the two output pipelines; the
//! only open decision is what a rule name means. The flattened pipeline in
//! this module inlines every referenced definition, producing one
//! self-contained expression; the rule-table pipeline keeps references and
//! lives in [`crate::table`].

use std::collections::HashMap;

use crate::compress::compress;
use crate::element::{ClassItem, Element};
use crate::error::{Result, TranslateError};
use crate::grammar::{GrammarLiteral, GrammarNode, GrammarRule, LiteralValue};
use crate::letters;

/// Decide what a rule name translates to; everything else is fixed
pub(crate) trait NodeTranslator {
    /// Translate a reference to the named rule
    fn translate_rulename(&mut self, name: &str) -> Result<Element>;

    /// Translate a grammar node into a regular expression element
    fn translate_node(&mut self, node: &GrammarNode) -> Result<Element> {
        match node {
            GrammarNode::Literal(literal) => Ok(translate_literal(literal)),
            GrammarNode::Concatenation(nodes) => {
                let mut elements = Vec::with_capacity(nodes.len());
                for node in nodes {
                    elements.push(self.translate_node(node)?);
                }
                Ok(Element::Concatenation(elements))
            }
            GrammarNode::Optional(node) => Ok(Element::Repetition {
                element: Box::new(self.translate_node(node)?),
                min: Some(0),
                max: Some(1),
            }),
            GrammarNode::Alternation(nodes) => {
                let mut elements = Vec::with_capacity(nodes.len());
                for node in nodes {
                    elements.push(self.translate_node(node)?);
                }
                Ok(Element::Alternation(elements))
            }
            GrammarNode::Repetition { min, max, node } => Ok(Element::Repetition {
                element: Box::new(self.translate_node(node)?),
                min: *min,
                max: *max,
            }),
            GrammarNode::Rulename(name) => self.translate_rulename(name),
        }
    }
}

/// Translate a terminal literal, wrapping it in a case-insensitivity marker
/// only when the value actually involves a letter.
///
/// ABNF text is case-insensitive by default, but emitting the marker for
/// purely numeric or punctuation values would pollute the pattern with
/// no-op groups, so the letter table is consulted first.
pub(crate) fn translate_literal(literal: &GrammarLiteral) -> Element {
    let element = match &literal.value {
        LiteralValue::Text(text) => Element::Literal(text.clone()),
        LiteralValue::Range(start, end) => Element::Range(*start, *end),
    };

    if literal.case_sensitive {
        return element;
    }

    let involves_letter = match &element {
        Element::Range(start, end) => {
            letters::range_overlaps_letter(*start as u32, *end as u32)
        }
        Element::Literal(value) => value.chars().any(letters::is_letter),
        _ => false,
    };

    if involves_letter {
        Element::CaseInsensitivity(Box::new(element))
    } else {
        element
    }
}

/// Expressions for rule names with a universal meaning
///
/// These override whatever the grammar author wrote, since the names denote
/// well-known terminals from the ABNF core.
fn well_known_rule(name: &str) -> Option<Element> {
    match name {
        "ALPHA" => Some(Element::CharacterClass(vec![
            ClassItem::Range('a', 'z'),
            ClassItem::Range('A', 'Z'),
        ])),
        "DIGIT" => Some(Element::Range('0', '9')),
        "HEXDIG" => Some(Element::CharacterClass(vec![
            ClassItem::Range('0', '9'),
            ClassItem::Range('A', 'F'),
            ClassItem::Range('a', 'f'),
        ])),
        "BIT" => Some(Element::CharacterClass(vec![
            ClassItem::Char('0'),
            ClassItem::Char('1'),
        ])),
        "DQUOTE" => Some(Element::Literal("\"".to_string())),
        _ => None,
    }
}

/// Translator that inlines every referenced rule definition
struct InliningTranslator<'a> {
    rules: HashMap<&'a str, &'a GrammarRule>,
}

impl NodeTranslator for InliningTranslator<'_> {
    fn translate_rulename(&mut self, name: &str) -> Result<Element> {
        if let Some(element) = well_known_rule(name) {
            return Ok(element);
        }

        let rule = self
            .rules
            .get(name)
            .copied()
            .ok_or_else(|| TranslateError::UndefinedRule(name.to_string()))?;
        self.translate_node(&rule.node)
    }
}

/// Translate a grammar into one flattened regular expression
///
/// The first rule is taken as the root; every reference is resolved by
/// inlining the referenced definition, so the result contains no
/// [`Element::Reference`] nodes. The compressed expression is returned.
pub fn translate(rules: &[GrammarRule]) -> Result<Element> {
    let root = rules.first().ok_or(TranslateError::EmptyGrammar)?;

    let mut translator = InliningTranslator {
        rules: rules.iter().map(|rule| (rule.name.as_str(), rule)).collect(),
    };

    let element = translator.translate_rulename(&root.name)?;
    Ok(compress(&element))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_sensitive_literal_is_not_wrapped() {
        let element = translate_literal(&GrammarLiteral {
            value: LiteralValue::Text("Hello".to_string()),
            case_sensitive: true,
        });
        assert_eq!(element, Element::Literal("Hello".to_string()));
    }

    #[test]
    fn test_case_insensitive_literal_with_letters_is_wrapped() {
        let element = translate_literal(&GrammarLiteral {
            value: LiteralValue::Text("http".to_string()),
            case_sensitive: false,
        });
        assert_eq!(
            element,
            Element::case_insensitive(Element::literal("http"))
        );
    }

    #[test]
    fn test_case_insensitive_numeric_literal_is_not_wrapped() {
        let element = translate_literal(&GrammarLiteral {
            value: LiteralValue::Text("123-456".to_string()),
            case_sensitive: false,
        });
        assert_eq!(element, Element::Literal("123-456".to_string()));
    }

    #[test]
    fn test_case_insensitive_letter_range_is_wrapped() {
        let element = translate_literal(&GrammarLiteral {
            value: LiteralValue::Range('a', 'z'),
            case_sensitive: false,
        });
        assert_eq!(
            element,
            Element::case_insensitive(Element::range('a', 'z'))
        );
    }

    #[test]
    fn test_case_insensitive_digit_range_is_not_wrapped() {
        let element = translate_literal(&GrammarLiteral {
            value: LiteralValue::Range('0', '9'),
            case_sensitive: false,
        });
        assert_eq!(element, Element::Range('0', '9'));
    }

    #[test]
    fn test_well_known_rules_override_definitions() {
        // The grammar redefines DIGIT, but the universal meaning wins.
        let rules = vec![
            GrammarRule::new("root", GrammarNode::rulename("DIGIT")),
            GrammarRule::new("DIGIT", GrammarNode::literal("x", true)),
        ];
        assert_eq!(translate(&rules).unwrap(), Element::Range('0', '9'));
    }

    #[test]
    fn test_references_are_inlined() {
        let rules = vec![
            GrammarRule::new(
                "root",
                GrammarNode::repetition(GrammarNode::rulename("pair"), Some(2), Some(2)),
            ),
            GrammarRule::new("pair", GrammarNode::rulename("HEXDIG")),
        ];
        assert_eq!(
            translate(&rules).unwrap(),
            Element::repetition(
                Element::character_class(vec![
                    ClassItem::Range('0', '9'),
                    ClassItem::Range('A', 'F'),
                    ClassItem::Range('a', 'f'),
                ]),
                Some(2),
                Some(2),
            )
        );
    }

    #[test]
    fn test_optional_group_becomes_zero_or_one_repetition() {
        let rules = vec![GrammarRule::new(
            "root",
            GrammarNode::optional(GrammarNode::literal("1", true)),
        )];
        assert_eq!(
            translate(&rules).unwrap(),
            Element::repetition(Element::literal("1"), Some(0), Some(1))
        );
    }

    #[test]
    fn test_undefined_rule_is_an_error() {
        let rules = vec![GrammarRule::new("root", GrammarNode::rulename("missing"))];
        assert_eq!(
            translate(&rules),
            Err(TranslateError::UndefinedRule("missing".to_string()))
        );
    }

    #[test]
    fn test_empty_grammar_is_an_error() {
        assert_eq!(translate(&[]), Err(TranslateError::EmptyGrammar));
    }
}
