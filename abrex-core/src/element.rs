//! Regular expression elements
//!
//! This module defines the intermediate representation that the translator
//! produces from a grammar tree and the renderers turn into pattern text.
//! An element owns its children outright: rewrites build new trees instead
//! of mutating in place.

/// A regular expression element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// A literal match of the exact text
    Literal(String),

    /// An inclusive range over a single code point, e.g. `[0-9]`
    Range(char, char),

    /// A sequence of elements matched one after another
    Concatenation(Vec<Element>),

    /// A first-to-last choice between elements (e.g. `a|b|c`)
    Alternation(Vec<Element>),

    /// A repetition group
    ///
    /// `min = None` is equivalent to zero; `max = None` means unbounded.
    Repetition {
        /// The repeated element
        element: Box<Element>,
        /// Minimum number of occurrences
        min: Option<u32>,
        /// Maximum number of occurrences
        max: Option<u32>,
    },

    /// A subtree matched case-insensitively
    CaseInsensitivity(Box<Element>),

    /// A union of single-code-point alternatives, e.g. `[a-z0-9_]`
    CharacterClass(Vec<ClassItem>),

    /// A named link to another rule's expression
    ///
    /// Only the rule-table pipeline produces references; a flattened
    /// expression never contains one.
    Reference(String),
}

/// An item in a character class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassItem {
    /// A single character
    Char(char),
    /// An inclusive character range (e.g. `a-z`)
    Range(char, char),
}

impl Element {
    /// Create a literal element
    pub fn literal(value: impl Into<String>) -> Self {
        Element::Literal(value.into())
    }

    /// Create a range element; `start` must not exceed `end`
    pub fn range(start: char, end: char) -> Self {
        debug_assert!(start <= end, "range start must not exceed its end");
        Element::Range(start, end)
    }

    /// Create a concatenation from a vector of elements
    pub fn concatenation(elements: Vec<Element>) -> Self {
        Element::Concatenation(elements)
    }

    /// Create an alternation from a vector of elements
    pub fn alternation(elements: Vec<Element>) -> Self {
        Element::Alternation(elements)
    }

    /// Create a repetition group
    pub fn repetition(element: Element, min: Option<u32>, max: Option<u32>) -> Self {
        if let (Some(min), Some(max)) = (min, max) {
            debug_assert!(min <= max, "repetition minimum must not exceed its maximum");
        }
        Element::Repetition {
            element: Box::new(element),
            min,
            max,
        }
    }

    /// Wrap an element in a case-insensitivity marker
    pub fn case_insensitive(element: Element) -> Self {
        Element::CaseInsensitivity(Box::new(element))
    }

    /// Create a character class
    pub fn character_class(items: Vec<ClassItem>) -> Self {
        Element::CharacterClass(items)
    }

    /// Create a reference to a named rule
    pub fn reference(name: impl Into<String>) -> Self {
        Element::Reference(name.into())
    }
}

impl From<ClassItem> for Element {
    /// Unwrap a class item back into a standalone element
    fn from(item: ClassItem) -> Self {
        match item {
            ClassItem::Char(c) => Element::Literal(c.to_string()),
            ClassItem::Range(start, end) => Element::Range(start, end),
        }
    }
}
