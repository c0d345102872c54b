//! Compression of regular expressions into an equivalent shorter form
//!
//! Three rewrites run as a fixed sequence, and the sequence is repeated
//! until the tree stops changing. Every productive rewrite strictly shrinks
//! the tree, so the loop terminates; repeating the sequence also lets a
//! character class produced by the case-insensitivity rewrite merge with
//! its neighbours on the next round.

use crate::element::{ClassItem, Element};
use crate::letters;
use crate::traverse::Transform;

/// Merge alternations whose children are all alternations themselves
struct MergeAlternations;

impl Transform for MergeAlternations {
    fn transform_alternation(&mut self, elements: &[Element]) -> Element {
        let transformed: Vec<Element> = elements
            .iter()
            .map(|element| self.transform(element))
            .collect();

        if transformed
            .iter()
            .all(|element| matches!(element, Element::Alternation(_)))
        {
            let mut merged = Vec::new();
            for element in transformed {
                if let Element::Alternation(subelements) = element {
                    merged.extend(subelements);
                }
            }
            return Element::Alternation(merged);
        }

        // A non-alternation child blocks the merge at this level only.
        Element::Alternation(transformed)
    }
}

/// Merge runs of single-code-point alternatives into character classes
struct MergeAlternationsOfCharacterClasses;

/// Flush the accumulated run: a single member stands on its own, two or
/// more become one character class.
fn flush_accumulator(accumulator: &mut Vec<ClassItem>, output: &mut Vec<Element>) {
    match accumulator.len() {
        0 => {}
        1 => output.push(Element::from(accumulator[0])),
        _ => output.push(Element::CharacterClass(std::mem::take(accumulator))),
    }
    accumulator.clear();
}

impl Transform for MergeAlternationsOfCharacterClasses {
    fn transform_alternation(&mut self, elements: &[Element]) -> Element {
        let transformed: Vec<Element> = elements
            .iter()
            .map(|element| self.transform(element))
            .collect();

        let mut output: Vec<Element> = Vec::new();
        let mut accumulator: Vec<ClassItem> = Vec::new();

        for element in transformed {
            match element {
                Element::Literal(ref value) if single_char(value.chars()).is_some() => {
                    if let Some(c) = single_char(value.chars()) {
                        accumulator.push(ClassItem::Char(c));
                    }
                }
                Element::Range(start, end) => {
                    accumulator.push(ClassItem::Range(start, end));
                }
                Element::CharacterClass(items) => {
                    // A class contributes its members, not itself.
                    accumulator.extend(items);
                }
                other => {
                    flush_accumulator(&mut accumulator, &mut output);
                    output.push(other);
                }
            }
        }

        flush_accumulator(&mut accumulator, &mut output);

        if output.len() == 1 {
            return output.into_iter().next().unwrap();
        }

        Element::Alternation(output)
    }
}

/// Rewrite a case-insensitive single-letter literal into an explicit
/// two-member class, which is more portable across rendering targets
struct SingleLetterCaseInsensitiveToClass;

/// The single character of an iterator, if it yields exactly one
fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    if chars.next().is_none() { Some(first) } else { None }
}

impl Transform for SingleLetterCaseInsensitiveToClass {
    fn transform_case_insensitivity(&mut self, element: &Element) -> Element {
        let transformed = self.transform(element);

        if let Element::Literal(value) = &transformed {
            if let Some(c) = single_char(value.chars()) {
                if letters::is_letter(c) {
                    // Letters whose case forms expand to multiple code
                    // points cannot become class members; keep the marker.
                    if let (Some(lower), Some(upper)) = (
                        single_char(c.to_lowercase()),
                        single_char(c.to_uppercase()),
                    ) {
                        return Element::CharacterClass(vec![
                            ClassItem::Char(lower),
                            ClassItem::Char(upper),
                        ]);
                    }
                }
            }
        }

        Element::CaseInsensitivity(Box::new(transformed))
    }
}

/// Apply the compression passes until the expression stops changing
pub fn compress(element: &Element) -> Element {
    let mut current = element.clone();
    loop {
        let mut next = MergeAlternations.transform(&current);
        next = MergeAlternationsOfCharacterClasses.transform(&next);
        next = SingleLetterCaseInsensitiveToClass.transform(&next);

        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nested_alternations_are_flattened() {
        let element = Element::alternation(vec![
            Element::alternation(vec![Element::literal("foo")]),
            Element::alternation(vec![Element::literal("bar"), Element::literal("baz")]),
        ]);
        assert_eq!(
            compress(&element),
            Element::alternation(vec![
                Element::literal("foo"),
                Element::literal("bar"),
                Element::literal("baz"),
            ])
        );
    }

    #[test]
    fn test_single_letter_alternatives_become_a_class() {
        let element = Element::alternation(vec![
            Element::literal("A"),
            Element::literal("B"),
            Element::literal("C"),
        ]);
        assert_eq!(
            compress(&element),
            Element::character_class(vec![
                ClassItem::Char('A'),
                ClassItem::Char('B'),
                ClassItem::Char('C'),
            ])
        );
    }

    #[test]
    fn test_class_members_are_absorbed_into_the_run() {
        let element = Element::alternation(vec![
            Element::range('0', '9'),
            Element::character_class(vec![ClassItem::Char('_'), ClassItem::Range('a', 'f')]),
        ]);
        assert_eq!(
            compress(&element),
            Element::character_class(vec![
                ClassItem::Range('0', '9'),
                ClassItem::Char('_'),
                ClassItem::Range('a', 'f'),
            ])
        );
    }

    #[test]
    fn test_multi_character_literal_splits_the_run() {
        let element = Element::alternation(vec![
            Element::range('0', '9'),
            Element::literal("abc"),
            Element::literal("x"),
        ]);
        assert_eq!(
            compress(&element),
            Element::alternation(vec![
                Element::range('0', '9'),
                Element::literal("abc"),
                Element::literal("x"),
            ])
        );
    }

    #[test]
    fn test_mergeable_runs_on_both_sides_of_a_blocker() {
        let element = Element::alternation(vec![
            Element::literal("a"),
            Element::literal("b"),
            Element::literal("stop"),
            Element::range('0', '4'),
            Element::range('5', '9'),
        ]);
        assert_eq!(
            compress(&element),
            Element::alternation(vec![
                Element::character_class(vec![ClassItem::Char('a'), ClassItem::Char('b')]),
                Element::literal("stop"),
                Element::character_class(vec![
                    ClassItem::Range('0', '4'),
                    ClassItem::Range('5', '9'),
                ]),
            ])
        );
    }

    #[test]
    fn test_case_insensitive_single_letter_becomes_a_class() {
        let element = Element::case_insensitive(Element::literal("a"));
        assert_eq!(
            compress(&element),
            Element::character_class(vec![ClassItem::Char('a'), ClassItem::Char('A')])
        );
    }

    #[test]
    fn test_case_insensitive_non_letter_keeps_the_marker() {
        let element = Element::case_insensitive(Element::literal("1"));
        assert_eq!(element, compress(&element));
    }

    #[test]
    fn test_case_insensitive_word_keeps_the_marker() {
        let element = Element::case_insensitive(Element::literal("http"));
        assert_eq!(element, compress(&element));
    }

    #[test]
    fn test_rewritten_class_merges_with_neighbours() {
        // The class produced from `%i"a"` joins the digit range once the
        // sequence is repeated.
        let element = Element::alternation(vec![
            Element::case_insensitive(Element::literal("a")),
            Element::range('0', '9'),
        ]);
        assert_eq!(
            compress(&element),
            Element::character_class(vec![
                ClassItem::Char('a'),
                ClassItem::Char('A'),
                ClassItem::Range('0', '9'),
            ])
        );
    }

    #[test]
    fn test_compression_recurses_below_repetitions() {
        let element = Element::repetition(
            Element::alternation(vec![Element::literal("x"), Element::literal("y")]),
            Some(1),
            None,
        );
        assert_eq!(
            compress(&element),
            Element::repetition(
                Element::character_class(vec![ClassItem::Char('x'), ClassItem::Char('y')]),
                Some(1),
                None,
            )
        );
    }

    fn arb_class_item() -> impl Strategy<Value = ClassItem> {
        prop_oneof![
            proptest::char::range('!', '~').prop_map(ClassItem::Char),
            (proptest::char::range('!', 'a'), proptest::char::range('a', '~'))
                .prop_map(|(start, end)| ClassItem::Range(start, end)),
        ]
    }

    fn arb_element() -> impl Strategy<Value = Element> {
        let leaf = prop_oneof![
            "[ -~]{0,3}".prop_map(Element::Literal),
            (proptest::char::range('!', 'a'), proptest::char::range('a', '~'))
                .prop_map(|(start, end)| Element::Range(start, end)),
            proptest::collection::vec(arb_class_item(), 1..4).prop_map(Element::CharacterClass),
            "[a-z]{1,6}".prop_map(Element::Reference),
        ];

        leaf.prop_recursive(4, 48, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 1..4)
                    .prop_map(Element::Concatenation),
                proptest::collection::vec(inner.clone(), 1..4).prop_map(Element::Alternation),
                (inner.clone(), proptest::option::of(0u32..4), 0u32..4).prop_map(
                    |(element, min, extra)| {
                        let max = min.map(|min| min + extra);
                        Element::Repetition {
                            element: Box::new(element),
                            min,
                            max,
                        }
                    }
                ),
                inner.prop_map(|element| Element::CaseInsensitivity(Box::new(element))),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_compression_is_idempotent(element in arb_element()) {
            let once = compress(&element);
            prop_assert_eq!(compress(&once), once);
        }
    }
}
