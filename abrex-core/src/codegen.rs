//! Rendering a rule table as a snippet of Python source
//!
//! Each rule becomes one assignment of a string literal; rules that
//! reference other rules become f-strings with `{identifier}` placeholders.
//! The expression is first tokenized into a flat stream so the formatter
//! can wrap long rules at marked breakpoints only, never inside an escape
//! sequence or a reference name.

use indexmap::IndexMap;

use crate::element::{ClassItem, Element};
use crate::render::{class_item_text, escape_literal, repetition_suffix, self_delimiting};
use crate::traverse::Visit;

/// The target line width of the generated source
pub const DEFAULT_LINE_WIDTH: usize = 70;

/// Indentation of wrapped rule bodies
const INDENT: usize = 4;

/// A part of the rendered regular expression
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Literal pattern text
    Text(String),
    /// A placeholder for another rule, by identifier
    Reference(String),
    /// A position where the formatter may break the line
    Breakpoint,
}

impl Token {
    /// The width the token contributes to a rendered line
    fn width(&self) -> usize {
        match self {
            Token::Text(value) => value.len(),
            Token::Reference(name) => name.len(),
            Token::Breakpoint => 0,
        }
    }
}

/// Collect tokens while walking the expression tree
#[derive(Default)]
struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    fn write_text(&mut self, text: impl Into<String>) {
        self.tokens.push(Token::Text(text.into()));
    }

    fn mark_breakpoint(&mut self) {
        self.tokens.push(Token::Breakpoint);
    }

    fn write_reference(&mut self, name: &str) {
        self.tokens.push(Token::Reference(name.to_string()));
    }
}

/// Tokenize an expression for the line-wrapping formatter
#[derive(Default)]
struct TokenRepresenter {
    stream: TokenStream,
}

impl Visit for TokenRepresenter {
    fn visit_literal(&mut self, value: &str) {
        self.stream.write_text(escape_literal(value));
    }

    fn visit_range(&mut self, start: char, end: char) {
        self.stream.write_text(format!(
            "[{}-{}]",
            crate::render::escape_for_character_class(start),
            crate::render::escape_for_character_class(end)
        ));
    }

    fn visit_concatenation(&mut self, elements: &[Element]) {
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                self.stream.mark_breakpoint();
            }
            self.visit(element);
        }
    }

    fn visit_alternation(&mut self, elements: &[Element]) {
        self.stream.write_text("(");
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                self.stream.write_text("|");
                self.stream.mark_breakpoint();
            }
            self.visit(element);
        }
        self.stream.write_text(")");
    }

    fn visit_repetition(&mut self, element: &Element, min: Option<u32>, max: Option<u32>) {
        let suffix = repetition_suffix(min, max);
        if self_delimiting(element) {
            self.visit(element);
            self.stream.write_text(suffix);
        } else {
            self.stream.write_text("(");
            self.visit(element);
            self.stream.write_text(format!("){suffix}"));
        }
    }

    fn visit_case_insensitivity(&mut self, element: &Element) {
        self.stream.write_text("(?i:");
        self.visit(element);
        self.stream.write_text(")");
    }

    fn visit_character_class(&mut self, items: &[ClassItem]) {
        self.stream.write_text("[");
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.stream.mark_breakpoint();
            }
            self.stream.write_text(class_item_text(item));
        }
        self.stream.write_text("]");
    }

    fn visit_reference(&mut self, name: &str) {
        self.stream.write_reference(name);
    }
}

/// Emit a Python string literal for a run of tokens
///
/// Plain text becomes an ordinary string literal; as soon as a reference
/// occurs the literal becomes an f-string, with braces in the text doubled
/// so only the placeholders interpolate.
fn tokens_to_literal<'a, I>(tokens: I) -> String
where
    I: Iterator<Item = &'a Token> + Clone,
{
    let has_reference = tokens
        .clone()
        .any(|token| matches!(token, Token::Reference(_)));

    if !has_reference {
        let text: String = tokens
            .filter_map(|token| match token {
                Token::Text(value) => Some(value.as_str()),
                _ => None,
            })
            .collect();
        return py_string_repr(&text);
    }

    let mut composed = String::new();
    for token in tokens {
        match token {
            Token::Text(value) => {
                composed.push_str(&value.replace('{', "{{").replace('}', "}}"));
            }
            Token::Reference(name) => {
                composed.push('{');
                composed.push_str(name);
                composed.push('}');
            }
            Token::Breakpoint => {}
        }
    }
    format!("f{}", py_string_repr(&composed))
}

/// Quote a string the way Python's `repr` does
///
/// Double quotes are chosen when the text contains a single quote but no
/// double quote; backslashes and control characters are escaped either
/// way. Token text is ASCII by construction, so no wider escapes arise.
fn py_string_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7F => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// A run of tokens the formatter must not break in the middle
struct Segment {
    tokens: Vec<Token>,
    width: usize,
}

/// Split a token stream into maximal breakpoint-free segments
fn split_segments(tokens: Vec<Token>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut accumulator: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Breakpoint => {
                if !accumulator.is_empty() {
                    let width = accumulator.iter().map(Token::width).sum();
                    segments.push(Segment {
                        tokens: std::mem::take(&mut accumulator),
                        width,
                    });
                }
            }
            token => accumulator.push(token),
        }
    }

    if !accumulator.is_empty() {
        let width = accumulator.iter().map(Token::width).sum();
        segments.push(Segment {
            tokens: accumulator,
            width,
        });
    }

    segments
}

/// Pack segments greedily into lines that optimistically fit the width
fn wrap_segments(segments: Vec<Segment>, line_width: usize) -> Vec<Vec<Segment>> {
    let mut lines: Vec<Vec<Segment>> = Vec::new();
    let mut accumulator: Vec<Segment> = Vec::new();
    let mut accumulator_width = 0usize;

    for segment in segments {
        if accumulator_width + segment.width > line_width && !accumulator.is_empty() {
            lines.push(std::mem::take(&mut accumulator));
            accumulator_width = 0;
        }
        accumulator_width += segment.width;
        accumulator.push(segment);
    }

    if !accumulator.is_empty() {
        lines.push(accumulator);
    }

    lines
}

/// Render a rule table as Python assignments at the default width
pub fn represent_table(table: &IndexMap<String, Element>) -> String {
    represent_table_with_width(table, DEFAULT_LINE_WIDTH)
}

/// Render a rule table as Python assignments targeting the given width
///
/// Short rules go on one line; long rules become a parenthesized block of
/// adjacent string literals, one per wrapped line. The estimate counts the
/// identifier, the assignment and the raw token widths; quoting overhead is
/// not included.
pub fn represent_table_with_width(table: &IndexMap<String, Element>, line_width: usize) -> String {
    let mut out = String::new();

    for (rule_index, (identifier, element)) in table.iter().enumerate() {
        if rule_index > 0 {
            out.push('\n');
        }

        let mut representer = TokenRepresenter::default();
        representer.visit(element);
        let tokens = representer.stream.tokens;

        let estimated_width =
            identifier.len() + 3 + tokens.iter().map(Token::width).sum::<usize>();

        if estimated_width <= line_width {
            out.push_str(identifier);
            out.push_str(" = ");
            out.push_str(&tokens_to_literal(tokens.iter()));
        } else {
            out.push_str(identifier);
            out.push_str(" = (\n");

            let segments = split_segments(tokens);
            let body_width = line_width
                .saturating_sub(INDENT + identifier.len() + 3)
                .max(1);

            for (line_index, line) in wrap_segments(segments, body_width).iter().enumerate() {
                if line_index > 0 {
                    out.push('\n');
                }
                out.push_str("    ");
                out.push_str(&tokens_to_literal(
                    line.iter().flat_map(|segment| segment.tokens.iter()),
                ));
            }

            out.push_str("\n)");
        }
    }

    out
}
