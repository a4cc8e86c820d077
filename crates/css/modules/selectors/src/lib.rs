//! Selectors Level 3 — simple selector sequences compiled into matchers.
//! Reference: <https://www.w3.org/TR/selectors-3/>
//!
//! This crate compiles one simple selector sequence into a [`Selector`]:
//! - Type, universal, id, class and attribute selectors (all seven operators)
//! - Structural pseudo-classes (`:nth-*`, `:only-*`, `:first-*`, `:last-*`, `:empty`, `:root`)
//! - Negation with `:not(...)`
//! - Specificity calculation
//!
//! Combinators and selector lists are not supported. Documents are reached
//! only through [`ElementAdapter`], so any tree can be queried.

mod case;
mod error;
mod matcher;
mod nth;
mod parser;
mod serialize;
mod specificity;
#[cfg(test)]
mod test_tree;

use core::str::FromStr;
use log::debug;
use parser::SelectorParser;

// Re-export public API
pub use case::to_lower_ascii;
pub use error::{ParseError, ParseErrorKind};
pub use matcher::{
    attribute_dashmatch_selector, attribute_equals_selector, attribute_exists_selector,
    attribute_includes_selector, attribute_prefix_selector, attribute_selector,
    attribute_substring_selector, attribute_suffix_selector, class_selector, empty_selector,
    id_selector, intersection_selector, negated_selector, nth_child_selector,
    only_child_selector, root_selector, type_selector, universal_selector,
};
pub use specificity::Specificity;

/// An adapter that abstracts read-only document access for selector matching.
/// Implement this for your DOM layer.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// True for element nodes; text, comment and document nodes return false.
    fn is_element(&self, node: Self::Handle) -> bool;

    /// Tag name of an element. Empty for non-elements.
    fn tag_name(&self, node: Self::Handle) -> &str;

    /// Attributes in document order. Keys need not be unique.
    fn attributes(&self, node: Self::Handle) -> &[(String, String)];

    /// Character data of a text node, `None` for every other kind.
    fn text(&self, node: Self::Handle) -> Option<&str>;

    /// Parent node if any. The document node counts as a parent.
    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Children in document order.
    fn children(&self, node: Self::Handle) -> impl Iterator<Item = Self::Handle>;
}

/// Predicate applied to an attribute value.
/// Selectors Level 3 §6.3 — Attribute selectors
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[key]`
    Exists,
    /// `[key=val]`
    Equals(String),
    /// `[key~=val]` — whitespace-separated token list contains `val`.
    Includes(String),
    /// `[key|=val]` — equals `val` or starts with `val-`.
    DashMatch(String),
    /// `[key^=val]`
    Prefix(String),
    /// `[key$=val]`
    Suffix(String),
    /// `[key*=val]`
    Substring(String),
}

/// A compiled selector. Matching is a pure function of the node and its tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `*` — every element.
    Universal,
    /// Tag name, stored ASCII-lowercased.
    Type(String),
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[key ...]`, key stored ASCII-lowercased.
    Attribute { key: String, operator: AttrOperator },
    /// Both sides match.
    Intersection(Box<Selector>, Box<Selector>),
    /// `:not(...)`
    Negation(Box<Selector>),
    /// The `an+b` family: `step` is `a`, `offset` is `b`.
    NthChild {
        step: i32,
        offset: i32,
        last: bool,
        of_type: bool,
    },
    /// `:only-child` / `:only-of-type`
    OnlyChild { of_type: bool },
    /// `:empty`
    Empty,
    /// `:root`
    Root,
}

/// Compile a simple selector sequence.
///
/// # Errors
/// Returns a [`ParseError`] when the text is not a valid simple selector
/// sequence or has bytes left over after one.
pub fn compile(selector: &str) -> Result<Selector, ParseError> {
    let mut parser = SelectorParser::new(selector);
    let compiled = parser
        .parse_simple_selector_sequence()
        .inspect_err(|err| debug!("{err}"))?;

    let remaining = parser.remaining();
    if remaining > 0 {
        let err = parser.error(ParseErrorKind::LeftOver { remaining });
        debug!("{err}");
        return Err(err);
    }

    debug!("compiled {selector:?} into {compiled:?}");
    Ok(compiled)
}

impl FromStr for Selector {
    type Err = ParseError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        compile(selector)
    }
}
