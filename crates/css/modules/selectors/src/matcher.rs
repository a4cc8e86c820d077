//! Selector constructors and the matching engine.
//! Reference: <https://www.w3.org/TR/selectors-3/>

use crate::case::to_lower_ascii;
use crate::{AttrOperator, ElementAdapter, Selector};
use log::trace;

/// Match elements with the given tag name, ASCII-case-insensitively.
/// Selectors Level 3 §6.1 — Type selector
pub fn type_selector(tag: &str) -> Selector {
    Selector::Type(to_lower_ascii(tag).into_owned())
}

/// Match every element.
/// Selectors Level 3 §6.2 — Universal selector
pub fn universal_selector() -> Selector {
    Selector::Universal
}

/// Match elements whose `id` attribute equals `id`.
pub fn id_selector(id: &str) -> Selector {
    Selector::Id(id.to_owned())
}

/// Match elements whose `class` attribute includes `class` as a token.
pub fn class_selector(class: &str) -> Selector {
    Selector::Class(class.to_owned())
}

/// Match elements with an attribute named `key` whose value satisfies `operator`.
/// Selectors Level 3 §6.3 — Attribute selectors
pub fn attribute_selector(key: &str, operator: AttrOperator) -> Selector {
    Selector::Attribute {
        key: to_lower_ascii(key).into_owned(),
        operator,
    }
}

/// `[key]`: the element carries an attribute named `key`.
pub fn attribute_exists_selector(key: &str) -> Selector {
    attribute_selector(key, AttrOperator::Exists)
}

/// `[key=val]`: some `key` attribute equals `val` exactly.
pub fn attribute_equals_selector(key: &str, val: &str) -> Selector {
    attribute_selector(key, AttrOperator::Equals(val.to_owned()))
}

/// `[key~=val]`: some `key` attribute has `val` as a whitespace-separated token.
pub fn attribute_includes_selector(key: &str, val: &str) -> Selector {
    attribute_selector(key, AttrOperator::Includes(val.to_owned()))
}

/// `[key|=val]`: some `key` attribute is `val` or starts with `val-`.
pub fn attribute_dashmatch_selector(key: &str, val: &str) -> Selector {
    attribute_selector(key, AttrOperator::DashMatch(val.to_owned()))
}

/// `[key^=val]`: some `key` attribute starts with `val`.
pub fn attribute_prefix_selector(key: &str, val: &str) -> Selector {
    attribute_selector(key, AttrOperator::Prefix(val.to_owned()))
}

/// `[key$=val]`: some `key` attribute ends with `val`.
pub fn attribute_suffix_selector(key: &str, val: &str) -> Selector {
    attribute_selector(key, AttrOperator::Suffix(val.to_owned()))
}

/// `[key*=val]`: some `key` attribute contains `val`.
pub fn attribute_substring_selector(key: &str, val: &str) -> Selector {
    attribute_selector(key, AttrOperator::Substring(val.to_owned()))
}

/// Match nodes matched by both `left` and `right`.
pub fn intersection_selector(left: Selector, right: Selector) -> Selector {
    Selector::Intersection(Box::new(left), Box::new(right))
}

/// Match nodes not matched by `inner`.
/// Selectors Level 3 §6.6.7 — Negation pseudo-class
pub fn negated_selector(inner: Selector) -> Selector {
    Selector::Negation(Box::new(inner))
}

/// `:nth-child(an+b)`. With `last`, positions count from the end; with
/// `of_type`, only siblings sharing the tag name are counted.
/// Selectors Level 3 §6.6.5 — Structural pseudo-classes
pub fn nth_child_selector(step: i32, offset: i32, last: bool, of_type: bool) -> Selector {
    Selector::NthChild {
        step,
        offset,
        last,
        of_type,
    }
}

/// `:only-child`, or `:only-of-type` when `of_type` is set.
pub fn only_child_selector(of_type: bool) -> Selector {
    Selector::OnlyChild { of_type }
}

/// `:empty`: no element children and no non-empty text children.
/// Selectors Level 3 §6.6.5.12 — :empty pseudo-class
pub fn empty_selector() -> Selector {
    Selector::Empty
}

/// `:root`: an element whose parent is absent or not an element.
/// Selectors Level 3 §6.6.5.1 — :root pseudo-class
pub fn root_selector() -> Selector {
    Selector::Root
}

impl AttrOperator {
    /// Test an attribute value.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exists => true,
            Self::Equals(expected) => value == expected,
            Self::Includes(expected) => includes_token(value, expected),
            Self::DashMatch(expected) => {
                value == expected
                    || value
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix(expected) => value.starts_with(expected.as_str()),
            Self::Suffix(expected) => value.ends_with(expected.as_str()),
            Self::Substring(expected) => value.contains(expected.as_str()),
        }
    }
}

/// Whitespace here is space, tab, CR, LF and form feed. Empty tokens never match.
fn includes_token(value: &str, token: &str) -> bool {
    value.split_ascii_whitespace().any(|item| item == token)
}

impl Selector {
    /// Test a single node. Total: never fails, whatever the node.
    pub fn matches<A: ElementAdapter>(&self, adapter: &A, node: A::Handle) -> bool {
        match self {
            Self::Universal => adapter.is_element(node),
            Self::Type(tag) => {
                adapter.is_element(node) && adapter.tag_name(node).eq_ignore_ascii_case(tag)
            }
            Self::Id(id) => attribute_matches(adapter, node, "id", |value| value == id),
            Self::Class(class) => {
                attribute_matches(adapter, node, "class", |value| includes_token(value, class))
            }
            Self::Attribute { key, operator } => {
                attribute_matches(adapter, node, key, |value| operator.matches(value))
            }
            Self::Intersection(left, right) => {
                left.matches(adapter, node) && right.matches(adapter, node)
            }
            Self::Negation(inner) => !inner.matches(adapter, node),
            Self::NthChild {
                step,
                offset,
                last,
                of_type,
            } => matches_nth_child(adapter, node, *step, *offset, *last, *of_type),
            Self::OnlyChild { of_type } => matches_only_child(adapter, node, *of_type),
            Self::Empty => matches_empty(adapter, node),
            Self::Root => matches_root(adapter, node),
        }
    }

    /// Every matching node in `root`'s subtree, `root` included, in pre-order.
    pub fn match_all<A: ElementAdapter>(&self, adapter: &A, root: A::Handle) -> Vec<A::Handle> {
        let found: Vec<_> = PreOrder::new(adapter, root)
            .filter(|&node| self.matches(adapter, node))
            .collect();
        trace!("selector {self} matched {} nodes", found.len());
        found
    }

    /// The first match in the same order as [`Selector::match_all`].
    pub fn match_first<A: ElementAdapter>(
        &self,
        adapter: &A,
        root: A::Handle,
    ) -> Option<A::Handle> {
        PreOrder::new(adapter, root).find(|&node| self.matches(adapter, node))
    }

    /// Keep the matching nodes of `nodes`, preserving their order.
    pub fn filter<A, I>(&self, adapter: &A, nodes: I) -> Vec<A::Handle>
    where
        A: ElementAdapter,
        I: IntoIterator<Item = A::Handle>,
    {
        nodes
            .into_iter()
            .filter(|&node| self.matches(adapter, node))
            .collect()
    }
}

/// Depth-first pre-order walk with an explicit stack.
struct PreOrder<'adapter, A: ElementAdapter> {
    adapter: &'adapter A,
    pending: Vec<A::Handle>,
}

impl<'adapter, A: ElementAdapter> PreOrder<'adapter, A> {
    fn new(adapter: &'adapter A, root: A::Handle) -> Self {
        Self {
            adapter,
            pending: vec![root],
        }
    }
}

impl<A: ElementAdapter> Iterator for PreOrder<'_, A> {
    type Item = A::Handle;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        let adapter = self.adapter;
        let first_child = self.pending.len();
        self.pending.extend(adapter.children(node));
        // Children were pushed in document order; the stack pops from the end.
        if let Some(children) = self.pending.get_mut(first_child..) {
            children.reverse();
        }
        Some(node)
    }
}

fn attribute_matches<A: ElementAdapter>(
    adapter: &A,
    node: A::Handle,
    key: &str,
    test: impl Fn(&str) -> bool,
) -> bool {
    adapter.is_element(node)
        && adapter
            .attributes(node)
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case(key) && test(value.as_str()))
}

/// Element children of `parent`, restricted to `tag` when given.
fn counted_siblings<'adapter, A: ElementAdapter>(
    adapter: &'adapter A,
    parent: A::Handle,
    tag: Option<&'adapter str>,
) -> impl Iterator<Item = A::Handle> {
    adapter.children(parent).filter(move |&sibling| {
        adapter.is_element(sibling) && tag.is_none_or(|name| adapter.tag_name(sibling) == name)
    })
}

fn matches_nth_child<A: ElementAdapter>(
    adapter: &A,
    node: A::Handle,
    step: i32,
    offset: i32,
    last: bool,
    of_type: bool,
) -> bool {
    if !adapter.is_element(node) {
        return false;
    }
    let Some(parent) = adapter.parent(node) else {
        return false;
    };
    let tag = of_type.then(|| adapter.tag_name(node));

    let mut position = None;
    let mut count: i64 = 0;
    for sibling in counted_siblings(adapter, parent, tag) {
        count += 1;
        if sibling == node {
            position = Some(count);
            if !last {
                break;
            }
        }
    }

    // A node missing from its parent's children matches nothing.
    let Some(mut index) = position else {
        return false;
    };
    if last {
        index = count - index + 1;
    }
    nth_position_matches(i64::from(step), i64::from(offset), index)
}

/// Whether 1-based `position` equals `step * k + offset` for some `k >= 0`.
pub(crate) fn nth_position_matches(step: i64, offset: i64, position: i64) -> bool {
    let distance = position - offset;
    if step == 0 {
        return distance == 0;
    }
    distance % step == 0 && distance / step >= 0
}

fn matches_only_child<A: ElementAdapter>(adapter: &A, node: A::Handle, of_type: bool) -> bool {
    if !adapter.is_element(node) {
        return false;
    }
    let Some(parent) = adapter.parent(node) else {
        return false;
    };
    let tag = of_type.then(|| adapter.tag_name(node));
    counted_siblings(adapter, parent, tag).take(2).count() == 1
}

fn matches_empty<A: ElementAdapter>(adapter: &A, node: A::Handle) -> bool {
    adapter.is_element(node)
        && adapter.children(node).all(|child| {
            !adapter.is_element(child) && adapter.text(child).is_none_or(str::is_empty)
        })
}

fn matches_root<A: ElementAdapter>(adapter: &A, node: A::Handle) -> bool {
    adapter.is_element(node)
        && adapter
            .parent(node)
            .is_none_or(|parent| !adapter.is_element(parent))
}
