//! Selector parse errors.

use thiserror::Error;

/// A selector that failed to compile, with the byte offset of the failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("parsing {selector:?}: {kind} at offset {offset}")]
pub struct ParseError {
    /// The full selector text that was being compiled.
    pub selector: String,
    /// Byte offset into `selector` where the problem was detected.
    pub offset: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

/// What went wrong while compiling a selector.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A valid sequence was parsed but input remains.
    #[error("{remaining} bytes left over")]
    LeftOver { remaining: usize },
    /// A byte that starts no valid continuation of the current production.
    #[error("expected {expected}")]
    Expected { expected: &'static str },
    /// Input ended inside a production.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    /// A quoted string hit end of input or a raw newline.
    #[error("unterminated string")]
    UnterminatedString,
    /// An escape naming NUL, a surrogate or a code point past U+10FFFF.
    #[error("invalid escape sequence")]
    InvalidEscape,
    /// A malformed `:nth-*` argument.
    #[error("invalid an+b expression")]
    InvalidNth,
    /// An `:nth-*` coefficient or offset outside `i32`.
    #[error("integer out of range")]
    IntegerOverflow,
    /// A pseudo-class this crate does not implement. `name` is lowercased.
    #[error("unsupported pseudo-class :{name}")]
    UnknownPseudoClass { name: String },
    /// `:not()` with nothing inside.
    #[error(":not() requires a selector")]
    EmptyNegation,
}
