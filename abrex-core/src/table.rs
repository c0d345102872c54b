//! Assembly of a dependency-ordered rule table
//!
//! Each grammar rule translates to its own expression; references between
//! rules stay symbolic. Rule names are renamed to bare identifiers, the
//! reference graph is sorted topologically (dependencies first) and the
//! table is re-keyed in that order. A cycle aborts the whole assembly.

use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::compress::compress;
use crate::element::{ClassItem, Element};
use crate::error::{Result, TranslateError};
use crate::grammar::GrammarRule;
use crate::translate::NodeTranslator;
use crate::traverse::{Transform, Visit};

/// Expressions short-circuiting the core rules of RFC 5234
///
/// The core rules are universally standard terminals; translating them
/// directly avoids re-deriving them from their textual definitions and
/// keeps them out of the reference graph.
static RFC_5234: Lazy<HashMap<&'static str, Element>> = Lazy::new(|| {
    HashMap::from([
        ("CR", Element::Literal("\x0D".to_string())),
        ("LF", Element::Literal("\x0A".to_string())),
        ("CRLF", Element::Literal("\x0D\x0A".to_string())),
        ("HTAB", Element::Literal("\x09".to_string())),
        ("DQUOTE", Element::Literal("\"".to_string())),
        ("SP", Element::Literal(" ".to_string())),
        (
            "WSP",
            Element::CharacterClass(vec![ClassItem::Char(' '), ClassItem::Char('\x09')]),
        ),
        ("VCHAR", Element::Range('\x21', '\x7E')),
        (
            "ALPHA",
            Element::CharacterClass(vec![
                ClassItem::Range('a', 'z'),
                ClassItem::Range('A', 'Z'),
            ]),
        ),
        ("DIGIT", Element::Range('0', '9')),
        (
            "HEXDIG",
            Element::CharacterClass(vec![
                ClassItem::Range('0', '9'),
                ClassItem::Range('A', 'F'),
                ClassItem::Range('a', 'f'),
            ]),
        ),
        (
            "BIT",
            Element::CharacterClass(vec![ClassItem::Char('0'), ClassItem::Char('1')]),
        ),
    ])
});

/// Translator that keeps rule references symbolic
struct ReferencingTranslator;

impl NodeTranslator for ReferencingTranslator {
    fn translate_rulename(&mut self, name: &str) -> Result<Element> {
        match RFC_5234.get(name) {
            Some(element) => Ok(element.clone()),
            None => Ok(Element::Reference(name.to_string())),
        }
    }
}

/// The product of table-mode translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    /// Identifier to expression, each rule after all rules it references
    pub rules: IndexMap<String, Element>,
    /// Original rule name to renamed identifier, in discovery order
    pub name_mapping: IndexMap<String, String>,
}

/// Collect every reference name in a subtree, in visit order
#[derive(Default)]
struct ReferenceCollector {
    references: Vec<String>,
}

impl Visit for ReferenceCollector {
    fn visit_reference(&mut self, name: &str) {
        self.references.push(name.to_string());
    }
}

fn collect_references(element: &Element) -> Vec<String> {
    let mut collector = ReferenceCollector::default();
    collector.visit(element);
    collector.references
}

/// Rewrite every reference through the renaming map
struct RenameReferences<'a> {
    mapping: &'a IndexMap<String, String>,
    missing: Option<String>,
}

impl Transform for RenameReferences<'_> {
    fn transform_reference(&mut self, name: &str) -> Element {
        match self.mapping.get(name) {
            Some(renamed) => Element::Reference(renamed.clone()),
            None => {
                if self.missing.is_none() {
                    self.missing = Some(name.to_string());
                }
                Element::Reference(name.to_string())
            }
        }
    }
}

/// Rename all rules and their references to valid bare identifiers
///
/// Names are lowercased with every character outside `[A-Za-z0-9_]`
/// replaced by `_`; collisions get an increasing integer suffix.
fn rename_rules_to_identifiers(
    table: IndexMap<String, Element>,
) -> Result<(IndexMap<String, Element>, IndexMap<String, String>)> {
    let mut mapping: IndexMap<String, String> = IndexMap::with_capacity(table.len());
    let mut taken: HashSet<String> = HashSet::with_capacity(table.len());

    for name in table.keys() {
        let base: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();

        let mut identifier = base.clone();
        let mut suffix = 1u32;
        while taken.contains(&identifier) {
            identifier = format!("{base}{suffix}");
            suffix += 1;
        }

        taken.insert(identifier.clone());
        mapping.insert(name.clone(), identifier);
    }

    let mut renamer = RenameReferences {
        mapping: &mapping,
        missing: None,
    };

    let mut renamed_table: IndexMap<String, Element> = IndexMap::with_capacity(table.len());
    for (name, element) in &table {
        let renamed_element = renamer.transform(element);
        if let Some(missing) = renamer.missing.take() {
            return Err(TranslateError::UndefinedRule(missing));
        }
        if let Some(identifier) = mapping.get(name) {
            renamed_table.insert(identifier.clone(), renamed_element);
        }
    }

    Ok((renamed_table, mapping))
}

/// Depth-first topological sort with three-colour cycle detection
struct TopologicalSorter<'a> {
    graph: &'a BTreeMap<String, Vec<String>>,
    in_progress: HashSet<String>,
    done: HashSet<String>,
    trace: Vec<String>,
    offender: Option<String>,
}

impl TopologicalSorter<'_> {
    fn visit(&mut self, identifier: &str) {
        if self.offender.is_some() || self.done.contains(identifier) {
            return;
        }

        if self.in_progress.contains(identifier) {
            self.offender = Some(identifier.to_string());
            return;
        }

        self.in_progress.insert(identifier.to_string());

        if let Some(dependencies) = self.graph.get(identifier) {
            for dependency in dependencies {
                self.visit(dependency);
            }
        }

        self.in_progress.remove(identifier);
        self.done.insert(identifier.to_string());
        self.trace.push(identifier.to_string());
    }
}

/// Sort the identifiers so that dependencies precede dependents
///
/// Returns the identifier visited more than once when the graph is cyclic.
fn topological_sort(
    graph: &BTreeMap<String, Vec<String>>,
) -> std::result::Result<Vec<String>, String> {
    let mut sorter = TopologicalSorter {
        graph,
        in_progress: HashSet::new(),
        done: HashSet::new(),
        trace: Vec::new(),
        offender: None,
    };

    // Roots are taken in sorted order so the result is deterministic.
    for identifier in graph.keys() {
        sorter.visit(identifier);
        if sorter.offender.is_some() {
            break;
        }
    }

    match sorter.offender {
        Some(offender) => Err(offender),
        None => Ok(sorter.trace),
    }
}

/// Re-key the table so every rule follows the rules it references
fn reorder_by_dependencies(
    mut table: IndexMap<String, Element>,
    mapping: &IndexMap<String, String>,
) -> Result<IndexMap<String, Element>> {
    let mut graph: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (identifier, element) in &table {
        graph.insert(identifier.clone(), collect_references(element));
    }

    let order = match topological_sort(&graph) {
        Ok(order) => order,
        Err(offender) => {
            // Report the cycle under the name the grammar author wrote.
            let original = mapping
                .iter()
                .find(|(_, renamed)| **renamed == offender)
                .map(|(original, _)| original.clone())
                .unwrap_or(offender);
            return Err(TranslateError::Cycle(original));
        }
    };

    let mut reordered: IndexMap<String, Element> = IndexMap::with_capacity(table.len());
    for identifier in order {
        if let Some(element) = table.shift_remove(&identifier) {
            reordered.insert(identifier, element);
        }
    }

    Ok(reordered)
}

/// Translate a grammar into a dependency-ordered table of expressions
///
/// Every rule gets an entry keyed by its renamed identifier; the result
/// also carries the original-to-renamed name mapping. A reference cycle
/// yields an error and no table.
pub fn translate(rules: &[GrammarRule]) -> Result<RuleTable> {
    let mut table: IndexMap<String, Element> = IndexMap::with_capacity(rules.len());

    let mut translator = ReferencingTranslator;
    for rule in rules {
        let element = translator.translate_node(&rule.node)?;
        table.insert(rule.name.clone(), compress(&element));
    }

    let (table, name_mapping) = rename_rules_to_identifiers(table)?;
    let rules = reorder_by_dependencies(table, &name_mapping)?;

    Ok(RuleTable {
        rules,
        name_mapping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarNode;

    #[test]
    fn test_names_are_renamed_to_identifiers() {
        let rules = vec![
            GrammarRule::new("Date-Time", GrammarNode::rulename("full-date")),
            GrammarRule::new("full-date", GrammarNode::literal("d", true)),
        ];
        let table = translate(&rules).unwrap();

        assert_eq!(
            table.name_mapping.get("Date-Time"),
            Some(&"date_time".to_string())
        );
        assert_eq!(
            table.name_mapping.get("full-date"),
            Some(&"full_date".to_string())
        );
        assert_eq!(
            table.rules.get("date_time"),
            Some(&Element::reference("full_date"))
        );
    }

    #[test]
    fn test_colliding_names_get_integer_suffixes() {
        let rules = vec![
            GrammarRule::new("a-b", GrammarNode::literal("x", true)),
            GrammarRule::new("A_B", GrammarNode::literal("y", true)),
            GrammarRule::new("a+b", GrammarNode::literal("z", true)),
        ];
        let table = translate(&rules).unwrap();

        assert_eq!(table.name_mapping.get("a-b"), Some(&"a_b".to_string()));
        assert_eq!(table.name_mapping.get("A_B"), Some(&"a_b1".to_string()));
        assert_eq!(table.name_mapping.get("a+b"), Some(&"a_b2".to_string()));
    }

    #[test]
    fn test_rules_are_ordered_after_their_dependencies() {
        let rules = vec![
            GrammarRule::new(
                "top",
                GrammarNode::concatenation(vec![
                    GrammarNode::rulename("middle"),
                    GrammarNode::rulename("base"),
                ]),
            ),
            GrammarRule::new("middle", GrammarNode::rulename("base")),
            GrammarRule::new("base", GrammarNode::literal("0", true)),
        ];
        let table = translate(&rules).unwrap();

        let order: Vec<&str> = table.rules.keys().map(String::as_str).collect();
        let position = |name: &str| order.iter().position(|other| *other == name).unwrap();
        assert!(position("base") < position("middle"));
        assert!(position("middle") < position("top"));
    }

    #[test]
    fn test_mutual_references_are_a_cycle() {
        let rules = vec![
            GrammarRule::new("a", GrammarNode::rulename("b")),
            GrammarRule::new("b", GrammarNode::rulename("a")),
        ];
        match translate(&rules) {
            Err(TranslateError::Cycle(name)) => {
                assert!(name == "a" || name == "b", "unexpected rule '{name}'");
            }
            other => panic!("expected a cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_is_reported_under_the_original_name() {
        let rules = vec![
            GrammarRule::new("Outer-Loop", GrammarNode::rulename("Inner-Loop")),
            GrammarRule::new("Inner-Loop", GrammarNode::rulename("Outer-Loop")),
        ];
        match translate(&rules) {
            Err(TranslateError::Cycle(name)) => {
                assert!(
                    name == "Outer-Loop" || name == "Inner-Loop",
                    "expected the pre-renaming rule name, got '{name}'"
                );
            }
            other => panic!("expected a cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let rules = vec![GrammarRule::new("loop", GrammarNode::rulename("loop"))];
        assert_eq!(
            translate(&rules),
            Err(TranslateError::Cycle("loop".to_string()))
        );
    }

    #[test]
    fn test_core_rules_are_short_circuited() {
        let rules = vec![GrammarRule::new(
            "padding",
            GrammarNode::repetition(GrammarNode::rulename("WSP"), Some(1), None),
        )];
        let table = translate(&rules).unwrap();

        assert_eq!(
            table.rules.get("padding"),
            Some(&Element::repetition(
                Element::character_class(vec![ClassItem::Char(' '), ClassItem::Char('\t')]),
                Some(1),
                None,
            ))
        );
    }

    #[test]
    fn test_reference_to_undefined_rule_is_an_error() {
        let rules = vec![GrammarRule::new(
            "top",
            GrammarNode::rulename("never-defined"),
        )];
        assert_eq!(
            translate(&rules),
            Err(TranslateError::UndefinedRule("never-defined".to_string()))
        );
    }

    #[test]
    fn test_empty_grammar_yields_an_empty_table() {
        let table = translate(&[]).unwrap();
        assert!(table.rules.is_empty());
        assert!(table.name_mapping.is_empty());
    }

    #[test]
    fn test_duplicate_references_do_not_disturb_the_order() {
        let rules = vec![
            GrammarRule::new(
                "pair",
                GrammarNode::concatenation(vec![
                    GrammarNode::rulename("item"),
                    GrammarNode::literal(",", true),
                    GrammarNode::rulename("item"),
                ]),
            ),
            GrammarRule::new("item", GrammarNode::rulename("ALPHA")),
        ];
        let table = translate(&rules).unwrap();

        let order: Vec<&str> = table.rules.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["item", "pair"]);
    }
}
