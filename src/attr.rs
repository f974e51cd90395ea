//! Route attribute values and the filter predicate used by every query and
//! mutating operation.
use std::collections::HashMap;

/// A single attribute value attached to a [`Route`](crate::route::Route).
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// A string-valued attribute.
    String(String),
    /// An integer-valued attribute.
    Integer(i64),
    /// A boolean-valued attribute.
    Boolean(bool),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

/// A route's attribute bag: an arbitrary mapping of names to
/// [`AttrValue`]s.
pub type Attributes = HashMap<String, AttrValue>;

/// A requested subset of attributes to match against a route.
///
/// An empty filter matches every route (vacuously true).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttrFilter(Attributes);

impl AttrFilter {
    /// The filter that matches every route.
    #[must_use]
    pub fn any() -> Self {
        Self(Attributes::new())
    }

    /// `true` if the filter has no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `attrs` satisfies every constraint in this filter.
    #[must_use]
    pub fn matches(&self, attrs: &Attributes) -> bool {
        self.0.iter().all(|(k, v)| attrs.get(k) == Some(v))
    }
}

impl From<Attributes> for AttrFilter {
    fn from(attrs: Attributes) -> Self {
        Self(attrs)
    }
}

impl FromIterator<(String, AttrValue)> for AttrFilter {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
