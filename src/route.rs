//! The [`Route`] value object.
use crate::attr::Attributes;
use crate::bits::Prefix;

/// A single routing table entry: a prefix and its associated attributes.
///
/// Equality (and therefore deduplication on [`add`](crate::RoutingTable::add))
/// considers both the prefix and the full attribute map, so the same prefix
/// may carry several distinct attribute sets at once.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    prefix: Prefix,
    attrs: Attributes,
}

impl Route {
    /// Constructs a new route.
    #[must_use]
    pub fn new(prefix: Prefix, attrs: Attributes) -> Self {
        Self { prefix, attrs }
    }

    /// The route's prefix.
    #[must_use]
    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    /// The route's attributes.
    #[must_use]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }
}
