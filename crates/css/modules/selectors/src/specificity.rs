//! Selector specificity calculation.
//! Reference: <https://www.w3.org/TR/selectors-3/#specificity>

use crate::Selector;

/// Specificity triple (a, b, c): ids; classes, attributes and pseudo-classes; types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16);

impl Specificity {
    /// Component-wise saturating sum.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
        )
    }
}

impl Selector {
    /// Selectors Level 3 §9 — the universal selector counts nothing and a
    /// negation counts as its argument.
    pub fn specificity(&self) -> Specificity {
        match self {
            Self::Universal => Specificity::default(),
            Self::Id(_) => Specificity(1, 0, 0),
            Self::Class(_)
            | Self::Attribute { .. }
            | Self::NthChild { .. }
            | Self::OnlyChild { .. }
            | Self::Empty
            | Self::Root => Specificity(0, 1, 0),
            Self::Type(_) => Specificity(0, 0, 1),
            Self::Intersection(left, right) => left.specificity().saturating_add(right.specificity()),
            Self::Negation(inner) => inner.specificity(),
        }
    }
}
