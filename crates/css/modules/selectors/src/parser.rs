//! Recursive-descent parser for simple selector sequences.
//! Reference: <https://www.w3.org/TR/selectors-3/#grammar>

use crate::case::to_lower_ascii;
use crate::error::{ParseError, ParseErrorKind};
use crate::matcher::{
    attribute_selector, class_selector, empty_selector, id_selector, intersection_selector,
    negated_selector, nth_child_selector, only_child_selector, root_selector, type_selector,
    universal_selector,
};
use crate::{AttrOperator, Selector};

/// Cursor over the selector source. Single use; discarded once compiled.
pub(crate) struct SelectorParser<'input> {
    /// Selector text being parsed.
    input: &'input str,
    /// Current byte offset into `input`.
    index: usize,
}

/// `[A-Za-z_]` or any non-ASCII byte.
fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || !byte.is_ascii()
}

fn is_name_char(byte: u8) -> bool {
    is_name_start(byte) || byte.is_ascii_digit() || byte == b'-'
}

fn is_newline(byte: u8) -> bool {
    matches!(byte, b'\n' | b'\r' | 0x0C)
}

impl<'input> SelectorParser<'input> {
    #[inline]
    pub(crate) fn new(input: &'input str) -> Self {
        Self { input, index: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.index
    }

    /// Bytes not yet consumed.
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.input.len().saturating_sub(self.index)
    }

    /// Input from `start` up to the cursor.
    #[inline]
    pub(crate) fn slice_from(&self, start: usize) -> &'input str {
        self.input.get(start..self.index).unwrap_or_default()
    }

    /// Build an error at the current offset.
    pub(crate) fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.index, kind)
    }

    pub(crate) fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError {
            selector: self.input.to_owned(),
            offset,
            kind,
        }
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input
            .as_bytes()
            .get(self.index.saturating_add(ahead))
            .copied()
    }

    #[inline]
    pub(crate) fn advance(&mut self, count: usize) {
        self.index = self.index.saturating_add(count).min(self.input.len());
    }

    /// Skip CSS whitespace (space, tab, CR, LF, form feed).
    #[inline]
    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.advance(1);
        }
    }

    /// Consume `expected` or fail naming `what` was wanted.
    pub(crate) fn expect_byte(&mut self, expected: u8, what: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(byte) if byte == expected => {
                self.advance(1);
                Ok(())
            }
            Some(_) => Err(self.error(ParseErrorKind::Expected { expected: what })),
            None => Err(self.error(ParseErrorKind::UnexpectedEof { expected: what })),
        }
    }

    /// Parse a type or universal selector followed by any number of id, class,
    /// attribute and pseudo-class selectors. Stops at the first byte that
    /// starts none of them. An empty sequence is the universal selector.
    pub(crate) fn parse_simple_selector_sequence(&mut self) -> Result<Selector, ParseError> {
        let mut result = match self.peek() {
            Some(b'*') => {
                self.advance(1);
                Some(universal_selector())
            }
            Some(_) if self.at_identifier_start() => {
                let tag = self.parse_identifier()?;
                Some(type_selector(&tag))
            }
            _ => None,
        };

        loop {
            let simple = match self.peek() {
                Some(b'#') => self.parse_id_selector()?,
                Some(b'.') => self.parse_class_selector()?,
                Some(b'[') => self.parse_attribute_selector()?,
                Some(b':') => self.parse_pseudo_class_selector()?,
                _ => break,
            };
            result = Some(match result {
                Some(previous) => intersection_selector(previous, simple),
                None => simple,
            });
        }

        Ok(result.unwrap_or(Selector::Universal))
    }

    /// Whether an identifier starts at the cursor.
    fn at_identifier_start(&self) -> bool {
        let starts_name = |ahead: usize| match self.peek_at(ahead) {
            Some(b'\\') => self.peek_at(ahead + 1).is_some_and(|next| !is_newline(next)),
            Some(byte) => is_name_start(byte),
            None => false,
        };
        if self.peek() == Some(b'-') {
            starts_name(1)
        } else {
            starts_name(0)
        }
    }

    /// `-`? name-start name-char*
    pub(crate) fn parse_identifier(&mut self) -> Result<String, ParseError> {
        if !self.at_identifier_start() {
            return Err(match self.peek() {
                Some(_) => self.error(ParseErrorKind::Expected {
                    expected: "identifier",
                }),
                None => self.error(ParseErrorKind::UnexpectedEof {
                    expected: "identifier",
                }),
            });
        }
        let mut out = String::new();
        if self.peek() == Some(b'-') {
            out.push('-');
            self.advance(1);
        }
        self.parse_name_into(&mut out)?;
        Ok(out)
    }

    /// name-char+, as used after `#`.
    pub(crate) fn parse_name(&mut self) -> Result<String, ParseError> {
        let start = self.index;
        let mut out = String::new();
        self.parse_name_into(&mut out)?;
        if self.index == start {
            return Err(match self.peek() {
                Some(_) => self.error(ParseErrorKind::Expected { expected: "name" }),
                None => self.error(ParseErrorKind::UnexpectedEof { expected: "name" }),
            });
        }
        Ok(out)
    }

    fn parse_name_into(&mut self, out: &mut String) -> Result<(), ParseError> {
        loop {
            let run_start = self.index;
            while self.peek().is_some_and(is_name_char) {
                self.advance(1);
            }
            // Runs end on an ASCII byte or at the end, so they are whole chars.
            if let Some(run) = self.input.get(run_start..self.index) {
                out.push_str(run);
            }
            if self.peek() == Some(b'\\') && self.peek_at(1).is_some_and(|next| !is_newline(next)) {
                out.push(self.parse_escape()?);
            } else {
                return Ok(());
            }
        }
    }

    /// `\` followed by 1-6 hex digits and one optional whitespace, or by any
    /// other character taken literally.
    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let start = self.index;
        self.advance(1);

        let hex_start = self.index;
        while self.index - hex_start < 6 && self.peek().is_some_and(|byte| byte.is_ascii_hexdigit())
        {
            self.advance(1);
        }
        if self.index > hex_start {
            let digits = self.slice_from(hex_start);
            let code = u32::from_str_radix(digits, 16)
                .map_err(|_| self.error_at(start, ParseErrorKind::InvalidEscape))?;
            if self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
                self.advance(2);
            } else if self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
                self.advance(1);
            }
            return match char::from_u32(code) {
                Some(ch) if code != 0 => Ok(ch),
                _ => Err(self.error_at(start, ParseErrorKind::InvalidEscape)),
            };
        }

        let Some(ch) = self.input.get(self.index..).and_then(|rest| rest.chars().next()) else {
            return Err(self.error(ParseErrorKind::UnexpectedEof {
                expected: "escaped character",
            }));
        };
        if matches!(ch, '\n' | '\r' | '\x0C') {
            return Err(self.error_at(start, ParseErrorKind::InvalidEscape));
        }
        self.advance(ch.len_utf8());
        Ok(ch)
    }

    /// A `"` or `'` quoted string. An escaped newline continues the line.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let start = self.index;
        let Some(quote) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnexpectedEof { expected: "string" }));
        };
        self.advance(1);

        let mut out = String::new();
        loop {
            let run_start = self.index;
            while self
                .peek()
                .is_some_and(|byte| byte != quote && byte != b'\\' && !is_newline(byte))
            {
                self.advance(1);
            }
            if let Some(run) = self.input.get(run_start..self.index) {
                out.push_str(run);
            }

            match self.peek() {
                Some(byte) if byte == quote => {
                    self.advance(1);
                    return Ok(out);
                }
                Some(b'\\') => match self.peek_at(1) {
                    None => return Err(self.error_at(start, ParseErrorKind::UnterminatedString)),
                    Some(b'\r') if self.peek_at(2) == Some(b'\n') => self.advance(3),
                    Some(byte) if is_newline(byte) => self.advance(2),
                    _ => out.push(self.parse_escape()?),
                },
                // End of input, or a raw newline.
                _ => return Err(self.error_at(start, ParseErrorKind::UnterminatedString)),
            }
        }
    }

    fn parse_id_selector(&mut self) -> Result<Selector, ParseError> {
        self.expect_byte(b'#', "'#'")?;
        let id = self.parse_name()?;
        Ok(id_selector(&id))
    }

    fn parse_class_selector(&mut self) -> Result<Selector, ParseError> {
        self.expect_byte(b'.', "'.'")?;
        let class = self.parse_identifier()?;
        Ok(class_selector(&class))
    }

    /// `[key]` or `[key op value]`, whitespace allowed inside the brackets.
    fn parse_attribute_selector(&mut self) -> Result<Selector, ParseError> {
        self.expect_byte(b'[', "'['")?;
        self.skip_whitespace();
        let key = self.parse_identifier()?;
        self.skip_whitespace();

        let operator: fn(String) -> AttrOperator = match self.peek() {
            Some(b']') => {
                self.advance(1);
                return Ok(attribute_selector(&key, AttrOperator::Exists));
            }
            Some(b'=') => {
                self.advance(1);
                AttrOperator::Equals
            }
            Some(lead @ (b'~' | b'|' | b'^' | b'$' | b'*')) => {
                self.advance(1);
                self.expect_byte(b'=', "'='")?;
                match lead {
                    b'~' => AttrOperator::Includes,
                    b'|' => AttrOperator::DashMatch,
                    b'^' => AttrOperator::Prefix,
                    b'$' => AttrOperator::Suffix,
                    _ => AttrOperator::Substring,
                }
            }
            Some(_) => {
                return Err(self.error(ParseErrorKind::Expected {
                    expected: "attribute operator or ']'",
                }));
            }
            None => {
                return Err(self.error(ParseErrorKind::UnexpectedEof { expected: "']'" }));
            }
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(b'"' | b'\'') => self.parse_string()?,
            Some(_) if self.at_identifier_start() => self.parse_identifier()?,
            Some(_) => {
                return Err(self.error(ParseErrorKind::Expected {
                    expected: "attribute value",
                }));
            }
            None => {
                return Err(self.error(ParseErrorKind::UnexpectedEof {
                    expected: "attribute value",
                }));
            }
        };
        self.skip_whitespace();
        self.expect_byte(b']', "']'")?;

        Ok(attribute_selector(&key, operator(value)))
    }

    /// `:name` or `:name(...)`. Names are ASCII-case-insensitive.
    fn parse_pseudo_class_selector(&mut self) -> Result<Selector, ParseError> {
        self.expect_byte(b':', "':'")?;
        let name_start = self.index;
        let name = self.parse_identifier()?;
        let lowered = to_lower_ascii(&name);

        match lowered.as_ref() {
            "not" => self.parse_negation(),
            "nth-child" => self.parse_nth_child(false, false),
            "nth-last-child" => self.parse_nth_child(true, false),
            "nth-of-type" => self.parse_nth_child(false, true),
            "nth-last-of-type" => self.parse_nth_child(true, true),
            "first-child" => Ok(nth_child_selector(0, 1, false, false)),
            "last-child" => Ok(nth_child_selector(0, 1, true, false)),
            "first-of-type" => Ok(nth_child_selector(0, 1, false, true)),
            "last-of-type" => Ok(nth_child_selector(0, 1, true, true)),
            "only-child" => Ok(only_child_selector(false)),
            "only-of-type" => Ok(only_child_selector(true)),
            "empty" => Ok(empty_selector()),
            "root" => Ok(root_selector()),
            _ => Err(self.error_at(
                name_start,
                ParseErrorKind::UnknownPseudoClass {
                    name: lowered.into_owned(),
                },
            )),
        }
    }

    /// `:not(` sequence `)`
    fn parse_negation(&mut self) -> Result<Selector, ParseError> {
        self.expect_byte(b'(', "'('")?;
        self.skip_whitespace();
        let operand_start = self.index;
        let operand = self.parse_simple_selector_sequence()?;
        if self.index == operand_start {
            return Err(self.error(ParseErrorKind::EmptyNegation));
        }
        self.skip_whitespace();
        self.expect_byte(b')', "')'")?;
        Ok(negated_selector(operand))
    }

    /// `(` an+b `)`
    fn parse_nth_child(&mut self, last: bool, of_type: bool) -> Result<Selector, ParseError> {
        self.expect_byte(b'(', "'('")?;
        self.skip_whitespace();
        let (step, offset) = self.parse_nth()?;
        self.skip_whitespace();
        self.expect_byte(b')', "')'")?;
        Ok(nth_child_selector(step, offset, last, of_type))
    }
}
