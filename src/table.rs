//! The shared operation contract implemented by [`PrefixTrie`](crate::PrefixTrie)
//! and [`RadixTrie`](crate::RadixTrie).
use crate::attr::{AttrFilter, Attributes};
use crate::bits::IntoPrefix;
use crate::error::Error;
use crate::route::Route;

/// An in-memory, longest-prefix-match routing table.
///
/// Both [`PrefixTrie`](crate::PrefixTrie) (an uncompressed binary trie) and
/// [`RadixTrie`](crate::RadixTrie) (a path-compressed PATRICIA trie)
/// implement this contract identically from the caller's perspective; they
/// differ only in memory layout and traversal cost.
///
/// Every operation accepts prefixes via [`IntoPrefix`], so textual CIDR
/// strings and already-parsed [`Prefix`](crate::bits::Prefix) values are
/// interchangeable.
pub trait RoutingTable: Default {
    /// Inserts a route. A route with an identical prefix and attribute set
    /// is a no-op.
    fn add<P: IntoPrefix>(&mut self, prefix: P, attrs: Attributes) -> Result<(), Error>;

    /// Returns the longest-prefix-match bucket for `prefix`, filtered by
    /// `attrs`. Returns an empty list if nothing along the path matches.
    fn get<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error>;

    /// With no `prefix`: every stored route, sorted. With `prefix` and
    /// `as_root = false`: the exact-match bucket at `prefix` (empty if
    /// absent). With `prefix` and `as_root = true`: every route in the
    /// subtree rooted at `prefix`, including `prefix` itself.
    ///
    /// `as_root = true` with no `prefix` is a [`UsageError`](crate::error::ErrorKind::UsageError).
    fn show<P: IntoPrefix>(
        &self,
        prefix: Option<P>,
        as_root: bool,
        attrs: &AttrFilter,
    ) -> Result<Vec<Route>, Error>;

    /// The route bucket at the deepest proper ancestor of `prefix`. Fails
    /// with [`NoExactMatch`](crate::error::ErrorKind::NoExactMatch) if
    /// `prefix` itself has no bucket.
    fn parent<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error>;

    /// Every route strictly descended from `prefix`. Fails if `prefix`
    /// itself has no bucket.
    fn children<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error>;

    /// Every route on the path from the root to `prefix`, inclusive.
    fn matching<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error>;

    /// Every route whose boundary interval lies within the wildcard range
    /// `[address, address | wildcard]`.
    fn wcmatch(
        &self,
        address: &str,
        wildcard: &str,
        attrs: &AttrFilter,
    ) -> Result<Vec<Route>, Error>;

    /// Removes routes at exactly `prefix`. With an empty `attrs`, clears the
    /// whole bucket; otherwise removes only matching routes, failing with
    /// [`NoAttrMatch`](crate::error::ErrorKind::NoAttrMatch) if none match.
    /// Fails with `NoExactMatch` if `prefix` has no bucket.
    fn delete<P: IntoPrefix>(&mut self, prefix: P, attrs: &AttrFilter) -> Result<(), Error>;

    /// With `prefix`: equivalent to [`delete`](Self::delete). With only
    /// `attrs`: removes every matching route anywhere in the table. With
    /// neither: empties the table.
    fn flush<P: IntoPrefix>(
        &mut self,
        prefix: Option<P>,
        attrs: &AttrFilter,
    ) -> Result<(), Error>;

    /// `true` if `get(prefix, AttrFilter::any())` is non-empty.
    fn contains<P: IntoPrefix>(&self, prefix: P) -> bool {
        self.get(prefix, &AttrFilter::any())
            .map(|routes| !routes.is_empty())
            .unwrap_or(false)
    }

    /// Every stored route, in unspecified (traversal) order. The result is a
    /// snapshot taken at the moment of the call, stable against any
    /// subsequent mutation of the table.
    fn iterate(&self) -> Vec<Route>;

    /// The total number of stored routes.
    fn len(&self) -> usize;

    /// `true` if the table holds no routes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sorts `routes` by ascending `(family, network id, length)`, preserving
/// relative order between routes with identical prefixes.
pub(crate) fn sort_routes(routes: &mut [Route]) {
    routes.sort_by_key(Route::prefix);
}
