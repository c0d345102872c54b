//! Rendering of regular expressions to pattern text
//!
//! The escaping policy is deliberately permissive: characters that carry no
//! special meaning in the target context pass through untouched, so the
//! output stays readable. The number sign is never escaped: it only has a
//! meaning under a verbose-mode flag that is never emitted, and leaving it
//! bare keeps the patterns portable to engines where `\#` is an error.

use crate::element::{ClassItem, Element};
use crate::traverse::Convert;

/// Escape a single character for use inside a bracketed character class
pub fn escape_for_character_class(c: char) -> String {
    match c {
        '-' => "\\-".to_string(),
        '\\' => "\\\\".to_string(),
        '[' => "\\[".to_string(),
        ']' => "\\]".to_string(),
        _ => {
            let code = c as u32;
            if !is_printable(c) && code <= 0xFF {
                format!("\\x{code:02x}")
            } else if (0x100..0x1_0000).contains(&code) {
                format!("\\u{code:04x}")
            } else if code >= 0x1_0000 {
                format!("\\U{code:08x}")
            } else {
                c.to_string()
            }
        }
    }
}

/// Printable ASCII: the visible characters, space and common whitespace
fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

/// Characters that are safe to leave bare in free literal context
fn no_need_to_escape_in_literal(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '_' | '-'
                | ' '
                | '#'
                | ':'
                | ','
                | ';'
                | '='
                | '@'
                | '~'
                | '`'
                | '\''
                | '"'
                | '!'
                | '%'
                | '&'
                | '<'
                | '>'
                | '/'
        )
}

/// Escape the individual characters of a literal in free context
///
/// Blanket escaping every non-alphanumeric character produces unreadable
/// patterns, so only true metacharacters are escaped; recognized control
/// characters get their mnemonic escapes and everything else falls back to
/// the code-point notation of the right width.
pub fn escape_literal(text: &str) -> String {
    if text
        .chars()
        .all(|c| (c as u32) <= 0xFF && no_need_to_escape_in_literal(c))
    {
        return text.to_string();
    }

    let mut escaped = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        escape_literal_char_into(c, &mut escaped);
    }
    escaped
}

fn escape_literal_char_into(c: char, out: &mut String) {
    let code = c as u32;

    if code <= 0xFF {
        if no_need_to_escape_in_literal(c) {
            out.push(c);
            return;
        }
        match c {
            '\0' => out.push_str("\\0"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\x0B' => out.push_str("\\v"),
            '\x0C' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\\' | '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}'
            | '|' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push_str(&format!("\\x{code:02x}")),
        }
    } else if code < 0x1_0000 {
        out.push_str(&format!("\\u{code:04x}"));
    } else {
        out.push_str(&format!("\\U{code:08x}"));
    }
}

/// The shorthand suffix for a repetition with the given bounds
pub(crate) fn repetition_suffix(min: Option<u32>, max: Option<u32>) -> String {
    match (min.unwrap_or(0), max) {
        (0, None) => "*".to_string(),
        (0, Some(1)) => "?".to_string(),
        (0, Some(max)) => format!("{{,{max}}}"),
        (1, None) => "+".to_string(),
        (min, None) => format!("{{{min},}}"),
        (min, Some(max)) if min == max => format!("{{{min}}}"),
        (min, Some(max)) => format!("{{{min},{max}}}"),
    }
}

/// Whether an element needs no extra parentheses under a repetition
pub(crate) fn self_delimiting(element: &Element) -> bool {
    matches!(
        element,
        Element::Alternation(_) | Element::Range(_, _) | Element::CharacterClass(_)
    )
}

/// The text of a single class member
pub(crate) fn class_item_text(item: &ClassItem) -> String {
    match item {
        ClassItem::Char(c) => escape_for_character_class(*c),
        ClassItem::Range(start, end) => format!(
            "{}-{}",
            escape_for_character_class(*start),
            escape_for_character_class(*end)
        ),
    }
}

/// Fold a flattened expression into a pattern string
///
/// References are not expected in the input; the rule-table pipeline has
/// its own renderer.
struct Representer;

impl Convert for Representer {
    type Output = String;

    fn convert_literal(&mut self, value: &str) -> String {
        escape_literal(value)
    }

    fn convert_range(&mut self, start: char, end: char) -> String {
        format!(
            "[{}-{}]",
            escape_for_character_class(start),
            escape_for_character_class(end)
        )
    }

    fn convert_concatenation(&mut self, elements: &[Element]) -> String {
        elements
            .iter()
            .map(|element| self.convert(element))
            .collect()
    }

    fn convert_alternation(&mut self, elements: &[Element]) -> String {
        let parts: Vec<String> = elements
            .iter()
            .map(|element| self.convert(element))
            .collect();
        format!("({})", parts.join("|"))
    }

    fn convert_repetition(
        &mut self,
        element: &Element,
        min: Option<u32>,
        max: Option<u32>,
    ) -> String {
        let suffix = repetition_suffix(min, max);
        if self_delimiting(element) {
            format!("{}{}", self.convert(element), suffix)
        } else {
            format!("({}){}", self.convert(element), suffix)
        }
    }

    fn convert_case_insensitivity(&mut self, element: &Element) -> String {
        format!("(?i:{})", self.convert(element))
    }

    fn convert_character_class(&mut self, items: &[ClassItem]) -> String {
        let mut out = String::from("[");
        for item in items {
            out.push_str(&class_item_text(item));
        }
        out.push(']');
        out
    }

    fn convert_reference(&mut self, name: &str) -> String {
        panic!("the reference '{name}' cannot appear in a flattened regular expression");
    }
}

/// Represent a flattened regular expression as a pattern string
pub fn represent(element: &Element) -> String {
    Representer.convert(element)
}
