//! Traversals over regular expression elements
//!
//! Three disciplines share one deterministic dispatch over the element
//! variants, recursing depth-first and left-to-right:
//!
//! - [`Transform`] rewrites a tree into a new tree; the defaults produce a
//!   structurally identical copy, so a pass only overrides the variants it
//!   rewrites.
//! - [`Visit`] walks a tree without producing anything; used to collect
//!   information such as the references reachable from a subtree.
//! - [`Convert`] folds a tree into a value of an arbitrary output type;
//!   every handler must be supplied.

use crate::element::{ClassItem, Element};

/// Rewrite an element tree recursively
pub trait Transform {
    /// Dispatch on the element variant
    fn transform(&mut self, element: &Element) -> Element {
        match element {
            Element::Literal(value) => self.transform_literal(value),
            Element::Range(start, end) => self.transform_range(*start, *end),
            Element::Concatenation(elements) => self.transform_concatenation(elements),
            Element::Alternation(elements) => self.transform_alternation(elements),
            Element::Repetition { element, min, max } => {
                self.transform_repetition(element, *min, *max)
            }
            Element::CaseInsensitivity(element) => self.transform_case_insensitivity(element),
            Element::CharacterClass(items) => self.transform_character_class(items),
            Element::Reference(name) => self.transform_reference(name),
        }
    }

    fn transform_literal(&mut self, value: &str) -> Element {
        Element::Literal(value.to_string())
    }

    fn transform_range(&mut self, start: char, end: char) -> Element {
        Element::Range(start, end)
    }

    fn transform_concatenation(&mut self, elements: &[Element]) -> Element {
        Element::Concatenation(elements.iter().map(|element| self.transform(element)).collect())
    }

    fn transform_alternation(&mut self, elements: &[Element]) -> Element {
        Element::Alternation(elements.iter().map(|element| self.transform(element)).collect())
    }

    fn transform_repetition(
        &mut self,
        element: &Element,
        min: Option<u32>,
        max: Option<u32>,
    ) -> Element {
        Element::Repetition {
            element: Box::new(self.transform(element)),
            min,
            max,
        }
    }

    fn transform_case_insensitivity(&mut self, element: &Element) -> Element {
        Element::CaseInsensitivity(Box::new(self.transform(element)))
    }

    fn transform_character_class(&mut self, items: &[ClassItem]) -> Element {
        Element::CharacterClass(items.to_vec())
    }

    fn transform_reference(&mut self, name: &str) -> Element {
        Element::Reference(name.to_string())
    }
}

/// Walk an element tree recursively without producing a value
pub trait Visit {
    /// Dispatch on the element variant
    fn visit(&mut self, element: &Element) {
        match element {
            Element::Literal(value) => self.visit_literal(value),
            Element::Range(start, end) => self.visit_range(*start, *end),
            Element::Concatenation(elements) => self.visit_concatenation(elements),
            Element::Alternation(elements) => self.visit_alternation(elements),
            Element::Repetition { element, min, max } => {
                self.visit_repetition(element, *min, *max)
            }
            Element::CaseInsensitivity(element) => self.visit_case_insensitivity(element),
            Element::CharacterClass(items) => self.visit_character_class(items),
            Element::Reference(name) => self.visit_reference(name),
        }
    }

    fn visit_literal(&mut self, _value: &str) {}

    fn visit_range(&mut self, _start: char, _end: char) {}

    fn visit_concatenation(&mut self, elements: &[Element]) {
        for element in elements {
            self.visit(element);
        }
    }

    fn visit_alternation(&mut self, elements: &[Element]) {
        for element in elements {
            self.visit(element);
        }
    }

    fn visit_repetition(&mut self, element: &Element, _min: Option<u32>, _max: Option<u32>) {
        self.visit(element);
    }

    fn visit_case_insensitivity(&mut self, element: &Element) {
        self.visit(element);
    }

    fn visit_character_class(&mut self, _items: &[ClassItem]) {}

    fn visit_reference(&mut self, _name: &str) {}
}

/// Fold an element tree into a value of the output type
pub trait Convert {
    /// The value a subtree folds into
    type Output;

    /// Dispatch on the element variant
    fn convert(&mut self, element: &Element) -> Self::Output {
        match element {
            Element::Literal(value) => self.convert_literal(value),
            Element::Range(start, end) => self.convert_range(*start, *end),
            Element::Concatenation(elements) => self.convert_concatenation(elements),
            Element::Alternation(elements) => self.convert_alternation(elements),
            Element::Repetition { element, min, max } => {
                self.convert_repetition(element, *min, *max)
            }
            Element::CaseInsensitivity(element) => self.convert_case_insensitivity(element),
            Element::CharacterClass(items) => self.convert_character_class(items),
            Element::Reference(name) => self.convert_reference(name),
        }
    }

    fn convert_literal(&mut self, value: &str) -> Self::Output;

    fn convert_range(&mut self, start: char, end: char) -> Self::Output;

    fn convert_concatenation(&mut self, elements: &[Element]) -> Self::Output;

    fn convert_alternation(&mut self, elements: &[Element]) -> Self::Output;

    fn convert_repetition(
        &mut self,
        element: &Element,
        min: Option<u32>,
        max: Option<u32>,
    ) -> Self::Output;

    fn convert_case_insensitivity(&mut self, element: &Element) -> Self::Output;

    fn convert_character_class(&mut self, items: &[ClassItem]) -> Self::Output;

    fn convert_reference(&mut self, name: &str) -> Self::Output;
}
