//! The `an+b` micro-syntax of `:nth-*` arguments.
//! Reference: <https://www.w3.org/TR/css-syntax-3/#anb-microsyntax>

use crate::case::to_lower_ascii;
use crate::error::{ParseError, ParseErrorKind};
use crate::parser::SelectorParser;

impl SelectorParser<'_> {
    /// Parse `odd`, `even`, `b`, or `[+-]?a?n ([+-] b)?` into `(a, b)`.
    /// The cursor must sit on the first non-whitespace byte of the argument.
    pub(crate) fn parse_nth(&mut self) -> Result<(i32, i32), ParseError> {
        let start = self.position();
        match self.peek() {
            Some(b'-') => {
                self.advance(1);
                self.parse_nth_step(start, -1)
            }
            Some(b'+') => {
                self.advance(1);
                self.parse_nth_step(start, 1)
            }
            Some(b'0'..=b'9') => self.parse_nth_step(start, 1),
            Some(b'n' | b'N') => {
                self.advance(1);
                self.parse_nth_offset(start, 1)
            }
            Some(b'o' | b'O' | b'e' | b'E') => {
                let keyword = self.parse_name()?;
                match to_lower_ascii(&keyword).as_ref() {
                    "odd" => Ok((2, 1)),
                    "even" => Ok((2, 0)),
                    _ => Err(self.error_at(start, ParseErrorKind::InvalidNth)),
                }
            }
            Some(_) => Err(self.error_at(start, ParseErrorKind::InvalidNth)),
            None => Err(self.error(ParseErrorKind::UnexpectedEof {
                expected: "an+b expression",
            })),
        }
    }

    /// After an optional sign: a coefficient followed by `n`, a bare `n`, or
    /// a bare integer meaning `0n+b`.
    fn parse_nth_step(&mut self, start: usize, sign: i32) -> Result<(i32, i32), ParseError> {
        match self.peek() {
            Some(b'0'..=b'9') => {
                let value = self.parse_integer(start, sign)?;
                if matches!(self.peek(), Some(b'n' | b'N')) {
                    self.advance(1);
                    self.parse_nth_offset(start, value)
                } else {
                    Ok((0, value))
                }
            }
            Some(b'n' | b'N') => {
                self.advance(1);
                self.parse_nth_offset(start, sign)
            }
            _ => Err(self.error_at(start, ParseErrorKind::InvalidNth)),
        }
    }

    /// The optional `[+-] b` after `n`. Whitespace may surround the sign.
    fn parse_nth_offset(&mut self, start: usize, step: i32) -> Result<(i32, i32), ParseError> {
        self.skip_whitespace();
        let sign = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok((step, 0)),
        };
        self.advance(1);
        self.skip_whitespace();
        if !self.peek().is_some_and(|byte| byte.is_ascii_digit()) {
            return Err(self.error_at(start, ParseErrorKind::InvalidNth));
        }
        let offset = self.parse_integer(start, sign)?;
        Ok((step, offset))
    }

    /// One or more ASCII digits, negated when `sign` is negative. The sign is
    /// applied before range checking, so `i32::MIN` is accepted.
    fn parse_integer(&mut self, start: usize, sign: i32) -> Result<i32, ParseError> {
        let digits_start = self.position();
        while self.peek().is_some_and(|byte| byte.is_ascii_digit()) {
            self.advance(1);
        }
        let digits = self.slice_from(digits_start);
        if digits.is_empty() {
            return Err(self.error_at(start, ParseErrorKind::InvalidNth));
        }
        let overflow = || self.error_at(digits_start, ParseErrorKind::IntegerOverflow);
        let magnitude = digits.parse::<i64>().map_err(|_| overflow())?;
        i32::try_from(magnitude * i64::from(sign)).map_err(|_| overflow())
    }
}
