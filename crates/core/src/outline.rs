//! Parser for the outline literal returned by the model.
//!
//! The model is asked to answer with a single bracketed list of lists of
//! quoted strings, written the way a scripting language writes a nested list
//! literal. This module accepts exactly that literal syntax and nothing that
//! could be executed: no names, calls, numbers or operators.
//!
//! Accepted string forms:
//! - single, double and triple quoted literals
//! - `u`/`U` (no-op) and `r`/`R` (raw) prefixes
//! - adjacent literals, which concatenate
//! - backslash escapes (`\n`, `\t`, `\xhh`, `\uXXXX`, octal, ...)
//!
//! Whitespace, newlines, trailing commas and `#` comments may appear between
//! tokens.

use crate::types::{Outline, SlideSpec};
use thiserror::Error;

/// A positioned error from [`parse_outline`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Byte offset into the input.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

/// The kinds of failure the outline parser reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unexpected character {found:?}, expected {expected}")]
    UnexpectedChar { found: char, expected: &'static str },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid escape sequence {0}")]
    InvalidEscape(String),

    #[error("unsupported string prefix {0:?}")]
    UnsupportedPrefix(String),

    #[error("outline is empty, expected at least a title entry")]
    EmptyOutline,

    #[error("outline entry has no strings")]
    EmptyEntry,

    #[error("unexpected text after the closing bracket")]
    TrailingCharacters,
}

/// Parse the model's reply into an [`Outline`].
///
/// Surrounding whitespace is allowed; anything else outside the outer
/// brackets is an error.
pub fn parse_outline(input: &str) -> Result<Outline, ParseError> {
    let mut parser = Parser::new(input);
    let outline = parser.outline()?;
    log::debug!(
        "Parsed outline with {} entries ({} content slides)",
        outline.len(),
        outline.content().len()
    );
    Ok(outline)
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
        }
    }

    fn outline(&mut self) -> Result<Outline, ParseError> {
        self.skip_ws();
        let start = self.offset();
        self.expect('[', "'['")?;

        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(']') => {
                    self.bump();
                    break;
                }
                Some('[') => {
                    let entry_start = self.offset();
                    let strings = self.entry()?;
                    let spec = SlideSpec::from_strings(strings)
                        .ok_or_else(|| self.error_at(entry_start, ParseErrorKind::EmptyEntry))?;
                    entries.push(spec);
                }
                Some(found) => {
                    return Err(self.error(ParseErrorKind::UnexpectedChar {
                        found,
                        expected: "'[' or ']'",
                    }))
                }
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd { expected: "']'" })),
            }

            if self.separator()? {
                break;
            }
        }

        self.skip_ws();
        if self.peek().is_some() {
            return Err(self.error(ParseErrorKind::TrailingCharacters));
        }
        Outline::from_specs(entries).ok_or_else(|| self.error_at(start, ParseErrorKind::EmptyOutline))
    }

    /// Parse one `[ "str", ... ]` entry. The cursor is on the `[`.
    fn entry(&mut self) -> Result<Vec<String>, ParseError> {
        self.bump();
        let mut strings = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(']') => {
                    self.bump();
                    return Ok(strings);
                }
                Some(found) => {
                    if !self.at_string_start() {
                        return Err(self.error(ParseErrorKind::UnexpectedChar {
                            found,
                            expected: "a string literal or ']'",
                        }));
                    }
                    strings.push(self.string()?);
                }
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd { expected: "']'" })),
            }

            if self.separator()? {
                return Ok(strings);
            }
        }
    }

    /// Consume `,` or the closing `]` after a list item.
    ///
    /// Returns true when the list was closed.
    fn separator(&mut self) -> Result<bool, ParseError> {
        self.skip_ws();
        match self.peek() {
            Some(',') => {
                self.bump();
                Ok(false)
            }
            Some(']') => {
                self.bump();
                Ok(true)
            }
            Some(found) => Err(self.error(ParseErrorKind::UnexpectedChar {
                found,
                expected: "',' or ']'",
            })),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd {
                expected: "',' or ']'",
            })),
        }
    }

    /// One string item: a literal followed by any adjacent literals.
    fn string(&mut self) -> Result<String, ParseError> {
        let mut value = self.literal()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if !self.at_string_start() {
                self.pos = save;
                return Ok(value);
            }
            value.push_str(&self.literal()?);
        }
    }

    /// True when the cursor is on a quote or on a letter prefix followed by one.
    fn at_string_start(&self) -> bool {
        match self.peek() {
            Some('\'' | '"') => true,
            Some(c) if c.is_ascii_alphabetic() => {
                let mut n = 1;
                while self.peek_at(n).is_some_and(|c| c.is_ascii_alphabetic()) {
                    n += 1;
                }
                n <= 2 && matches!(self.peek_at(n), Some('\'' | '"'))
            }
            _ => false,
        }
    }

    /// Parse a single (possibly prefixed) string literal.
    fn literal(&mut self) -> Result<String, ParseError> {
        let start = self.offset();
        let mut prefix = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphabetic()) {
            prefix.push(c);
            self.bump();
        }

        let raw = match prefix.as_str() {
            "" | "u" | "U" => false,
            "r" | "R" => true,
            _ => return Err(self.error_at(start, ParseErrorKind::UnsupportedPrefix(prefix.clone()))),
        };

        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            Some(found) => {
                return Err(self.error_at(
                    start,
                    ParseErrorKind::UnexpectedChar {
                        found,
                        expected: "a string literal",
                    },
                ))
            }
            None => {
                return Err(self.error(ParseErrorKind::UnexpectedEnd {
                    expected: "a string literal",
                }))
            }
        };

        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let mut value = String::new();
        loop {
            let c_offset = self.offset();
            let Some(c) = self.bump() else {
                return Err(self.error_at(start, ParseErrorKind::UnterminatedString));
            };

            match c {
                c if c == quote => {
                    if !triple {
                        return Ok(value);
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        return Ok(value);
                    }
                    value.push(c);
                }
                '\n' | '\r' if !triple => {
                    return Err(self.error_at(start, ParseErrorKind::UnterminatedString));
                }
                '\\' if raw => {
                    // A raw backslash still keeps the next character from
                    // closing the literal.
                    value.push('\\');
                    match self.bump() {
                        Some(next) => value.push(next),
                        None => {
                            return Err(self.error_at(start, ParseErrorKind::UnterminatedString))
                        }
                    }
                }
                '\\' => self.escape(&mut value, start, c_offset)?,
                c => value.push(c),
            }
        }
    }

    /// Decode the escape after a backslash at `at` and append it to `value`.
    fn escape(&mut self, value: &mut String, start: usize, at: usize) -> Result<(), ParseError> {
        let Some(e) = self.bump() else {
            return Err(self.error_at(start, ParseErrorKind::UnterminatedString));
        };

        match e {
            '\n' => {}
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            '\\' | '\'' | '"' => value.push(e),
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'a' => value.push('\x07'),
            'b' => value.push('\x08'),
            'f' => value.push('\x0c'),
            'v' => value.push('\x0b'),
            '0'..='7' => {
                let mut code = e.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                let ch = char::from_u32(code)
                    .ok_or_else(|| self.error_at(at, ParseErrorKind::InvalidEscape(format!("\\{:o}", code))))?;
                value.push(ch);
            }
            'x' => value.push(self.hex_escape(at, 'x', 2)?),
            'u' => value.push(self.hex_escape(at, 'u', 4)?),
            'U' => value.push(self.hex_escape(at, 'U', 8)?),
            'N' => {
                return Err(self.error_at(
                    at,
                    ParseErrorKind::InvalidEscape("\\N{...} (named escapes are not supported)".to_string()),
                ))
            }
            other => {
                value.push('\\');
                value.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, at: usize, marker: char, digits: usize) -> Result<char, ParseError> {
        let mut text = String::with_capacity(digits);
        for _ in 0..digits {
            match self.peek().filter(|c| c.is_ascii_hexdigit()) {
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
                None => break,
            }
        }

        let invalid = || ParseErrorKind::InvalidEscape(format!("\\{}{}", marker, text));
        if text.len() != digits {
            return Err(self.error_at(at, invalid()));
        }
        u32::from_str_radix(&text, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error_at(at, invalid()))
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' | '\x0c' => {
                    self.bump();
                }
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn expect(&mut self, want: char, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(found) => Err(self.error(ParseErrorKind::UnexpectedChar { found, expected })),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd { expected })),
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(offset, _)| offset)
            .unwrap_or(self.src.len())
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.offset(), kind)
    }

    fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        let before = &self.src[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        ParseError {
            kind,
            offset,
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(outline: &Outline) -> Vec<Vec<String>> {
        outline.clone().into()
    }

    #[test]
    fn test_parse_cells_outline() {
        let outline = parse_outline(
            r#"[["Intro to Cells"], ["Cell Structure","Has a nucleus","Has mitochondria"]]"#,
        )
        .unwrap();

        assert_eq!(outline.title(), "Intro to Cells");
        assert_eq!(outline.content().len(), 1);
        assert_eq!(outline.content()[0].title, "Cell Structure");
        assert_eq!(
            outline.content()[0].bullets,
            vec!["Has a nucleus", "Has mitochondria"]
        );
    }

    #[test]
    fn test_parse_multiline_with_trailing_commas_and_comments() {
        let input = "\n  [\n    ['Title'],  # title page\n    ['Topic', 'fact one', 'fact two',],\n  ]\n";
        let outline = parse_outline(input).unwrap();
        assert_eq!(
            entries(&outline),
            vec![
                vec!["Title".to_string()],
                vec![
                    "Topic".to_string(),
                    "fact one".to_string(),
                    "fact two".to_string()
                ],
            ]
        );
    }

    #[test]
    fn test_single_and_double_quotes_with_embedded_quotes() {
        let outline = parse_outline(r#"[["It's alive"], ['Say "hi"', 'don\'t']]"#).unwrap();
        assert_eq!(outline.title(), "It's alive");
        assert_eq!(outline.content()[0].title, "Say \"hi\"");
        assert_eq!(outline.content()[0].bullets, vec!["don't"]);
    }

    #[test]
    fn test_escapes() {
        let outline =
            parse_outline(r#"[["tab\there", "caf\xe9", "\u00e9t\u00e9", "\101\x42", "C:\\dir", "\d"]]"#)
                .unwrap();
        let spec = outline.title_spec();
        assert_eq!(spec.title, "tab\there");
        assert_eq!(spec.bullets, vec!["café", "été", "AB", "C:\\dir", "\\d"]);
    }

    #[test]
    fn test_prefixes_and_adjacent_literals() {
        let outline = parse_outline(r#"[[u"Uni" 'code', r"raw\n"]]"#).unwrap();
        assert_eq!(outline.title(), "Unicode");
        assert_eq!(outline.title_spec().bullets, vec!["raw\\n"]);
    }

    #[test]
    fn test_triple_quoted_literal_spans_lines() {
        let outline = parse_outline("[['''line one\nline \"two\"''']]").unwrap();
        assert_eq!(outline.title(), "line one\nline \"two\"");
    }

    #[test]
    fn test_missing_closing_bracket() {
        let err = parse_outline(r#"[["Title"], ["Topic", "fact"]"#).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedEnd {
                expected: "',' or ']'"
            }
        );
        assert_eq!(err.line, 1);
        assert_eq!(err.offset, 29);
    }

    #[test]
    fn test_truncated_inside_string() {
        let err = parse_outline(r#"[["Title"], ["Topic", "fa"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(err.column, 23);
    }

    #[test]
    fn test_newline_in_single_quoted_string() {
        let err = parse_outline("[['Title\nmore']]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!((err.line, err.column), (1, 3));
    }

    #[test]
    fn test_rejects_numbers_names_and_calls() {
        let input = "[\n  [\"a\"],\n  [\"b\" 1]\n]";
        let err = parse_outline(input).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedChar {
                found: '1',
                expected: "',' or ']'"
            }
        );
        assert_eq!((err.line, err.column), (3, 8));

        let err = parse_outline(r#"[["a", None]]"#).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedChar { found: 'N', .. }));

        let err = parse_outline(r#"[["a"], __import__("os")]"#).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedChar { found: '_', .. }));
    }

    #[test]
    fn test_rejects_bytes_and_format_strings() {
        let err = parse_outline(r#"[[b"bytes"]]"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnsupportedPrefix("b".to_string()));

        let err = parse_outline(r#"[[f"{x}"]]"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnsupportedPrefix("f".to_string()));
    }

    #[test]
    fn test_rejects_markup_around_literal() {
        let err = parse_outline("```python\n[[\"a\"]]\n```").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedChar { found: '`', .. }));

        let err = parse_outline(r#"[["a"]] Hope this helps!"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingCharacters);
    }

    #[test]
    fn test_empty_outline_and_empty_entry() {
        let err = parse_outline("[]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::EmptyOutline);

        let err = parse_outline(r#"[["Title"], []]"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::EmptyEntry);
        assert_eq!(err.column, 13);
    }

    #[test]
    fn test_bad_hex_escape() {
        let err = parse_outline(r#"[["\xZZ"]]"#).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidEscape("\\x".to_string()));
    }

    #[test]
    fn test_error_display_has_position() {
        let err = parse_outline("[[\"a\"]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected end of input, expected ',' or ']' at line 1, column 7"
        );
    }
}
