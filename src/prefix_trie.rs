//! An uncompressed binary trie, with exactly one edge per bit.
use crate::attr::{AttrFilter, Attributes};
use crate::bits::{BitSpan, IntoPrefix, Prefix};
use crate::error::{err, Error, ErrorKind};
use crate::route::Route;
use crate::table::{sort_routes, RoutingTable};

#[derive(Default)]
struct Node {
    bucket: Option<Vec<Route>>,
    zero: Option<Box<Node>>,
    one: Option<Box<Node>>,
}

impl Node {
    fn is_empty(&self) -> bool {
        self.bucket.is_none() && self.zero.is_none() && self.one.is_none()
    }

    fn child(&self, bit: bool) -> Option<&Node> {
        if bit {
            self.one.as_deref()
        } else {
            self.zero.as_deref()
        }
    }

    fn child_slot(&mut self, bit: bool) -> &mut Option<Box<Node>> {
        if bit {
            &mut self.one
        } else {
            &mut self.zero
        }
    }
}

/// An in-memory longest-prefix-match routing table backed by an
/// uncompressed binary trie.
///
/// Lookups cost `O(L)` in the prefix length `L`, with one trie node per bit
/// on the path. [`RadixTrie`](crate::RadixTrie) trades lookup simplicity for
/// a path-compressed structure whose node count is bounded by the number of
/// stored prefixes rather than their bit-length.
#[derive(Default)]
pub struct PrefixTrie {
    root: Box<Node>,
    len: usize,
}

fn no_exact_match(prefix: Prefix) -> Error {
    err!(ErrorKind::NoExactMatch, format!("{prefix}"))
}

fn no_attr_match(prefix: Prefix) -> Error {
    err!(ErrorKind::NoAttrMatch, format!("{prefix}"))
}

fn filter_bucket(bucket: Option<&Vec<Route>>, attrs: &AttrFilter) -> Vec<Route> {
    let mut out: Vec<Route> = bucket
        .into_iter()
        .flatten()
        .filter(|r| attrs.matches(r.attrs()))
        .cloned()
        .collect();
    sort_routes(&mut out);
    out
}

fn collect_subtree(node: &Node, attrs: &AttrFilter, out: &mut Vec<Route>) {
    if let Some(bucket) = &node.bucket {
        out.extend(bucket.iter().filter(|r| attrs.matches(r.attrs())).cloned());
    }
    if let Some(c) = &node.zero {
        collect_subtree(c, attrs, out);
    }
    if let Some(c) = &node.one {
        collect_subtree(c, attrs, out);
    }
}

fn delete_rec(
    node: &mut Node,
    bits: &BitSpan,
    attrs: &AttrFilter,
    prefix: Prefix,
) -> Result<usize, Error> {
    if bits.is_empty() {
        let bucket = node.bucket.as_mut().ok_or_else(|| no_exact_match(prefix))?;
        if attrs.is_empty() {
            let removed = bucket.len();
            node.bucket = None;
            return Ok(removed);
        }
        let before = bucket.len();
        bucket.retain(|r| !attrs.matches(r.attrs()));
        let removed = before - bucket.len();
        if removed == 0 {
            return Err(no_attr_match(prefix));
        }
        if bucket.is_empty() {
            node.bucket = None;
        }
        return Ok(removed);
    }
    let bit = bits[0];
    let rest = &bits[1..];
    let slot = node.child_slot(bit);
    let child = slot.as_mut().ok_or_else(|| no_exact_match(prefix))?;
    let removed = delete_rec(child, rest, attrs, prefix)?;
    if child.is_empty() {
        *slot = None;
    }
    Ok(removed)
}

impl PrefixTrie {
    /// Constructs an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locate(&self, bits: &BitSpan) -> Option<&Node> {
        let mut node: &Node = &self.root;
        for bit in bits.iter().by_vals() {
            node = node.child(bit)?;
        }
        Some(node)
    }
}

impl RoutingTable for PrefixTrie {
    fn add<P: IntoPrefix>(&mut self, prefix: P, attrs: Attributes) -> Result<(), Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let mut node: &mut Node = &mut self.root;
        for bit in bits.iter().by_vals() {
            node = node.child_slot(bit).get_or_insert_with(Box::default).as_mut();
        }
        let bucket = node.bucket.get_or_insert_with(Vec::new);
        let route = Route::new(prefix, attrs);
        if !bucket.contains(&route) {
            bucket.push(route);
            self.len += 1;
        }
        Ok(())
    }

    fn get<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let mut node: &Node = &self.root;
        let mut best = node.bucket.as_ref();
        for bit in bits.iter().by_vals() {
            match node.child(bit) {
                Some(child) => {
                    node = child;
                    if node.bucket.is_some() {
                        best = node.bucket.as_ref();
                    }
                }
                None => break,
            }
        }
        Ok(filter_bucket(best, attrs))
    }

    fn show<P: IntoPrefix>(
        &self,
        prefix: Option<P>,
        as_root: bool,
        attrs: &AttrFilter,
    ) -> Result<Vec<Route>, Error> {
        let prefix = prefix.map(IntoPrefix::into_prefix).transpose()?;
        match (prefix, as_root) {
            (None, true) => Err(err!(ErrorKind::UsageError)),
            (None, false) => {
                let mut out = Vec::new();
                collect_subtree(&self.root, attrs, &mut out);
                sort_routes(&mut out);
                Ok(out)
            }
            (Some(prefix), false) => {
                let bits = prefix.bits();
                Ok(filter_bucket(
                    self.locate(&bits).and_then(|n| n.bucket.as_ref()),
                    attrs,
                ))
            }
            (Some(prefix), true) => {
                let bits = prefix.bits();
                let mut out = Vec::new();
                if let Some(node) = self.locate(&bits) {
                    collect_subtree(node, attrs, &mut out);
                }
                sort_routes(&mut out);
                Ok(out)
            }
        }
    }

    fn parent<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let mut node: &Node = &self.root;
        let mut ancestor = None;
        for bit in bits.iter().by_vals() {
            if node.bucket.is_some() {
                ancestor = node.bucket.as_ref();
            }
            match node.child(bit) {
                Some(child) => node = child,
                None => return Err(no_exact_match(prefix)),
            }
        }
        if node.bucket.is_none() {
            return Err(no_exact_match(prefix));
        }
        Ok(filter_bucket(ancestor, attrs))
    }

    fn children<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let node = self.locate(&bits).ok_or_else(|| no_exact_match(prefix))?;
        if node.bucket.is_none() {
            return Err(no_exact_match(prefix));
        }
        let mut out = Vec::new();
        if let Some(c) = &node.zero {
            collect_subtree(c, attrs, &mut out);
        }
        if let Some(c) = &node.one {
            collect_subtree(c, attrs, &mut out);
        }
        sort_routes(&mut out);
        Ok(out)
    }

    fn matching<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let mut node: &Node = &self.root;
        let mut out = Vec::new();
        if let Some(bucket) = &node.bucket {
            out.extend(bucket.iter().filter(|r| attrs.matches(r.attrs())).cloned());
        }
        for bit in bits.iter().by_vals() {
            match node.child(bit) {
                Some(child) => {
                    node = child;
                    if let Some(bucket) = &node.bucket {
                        out.extend(bucket.iter().filter(|r| attrs.matches(r.attrs())).cloned());
                    }
                }
                None => break,
            }
        }
        sort_routes(&mut out);
        Ok(out)
    }

    fn wcmatch(
        &self,
        address: &str,
        wildcard: &str,
        attrs: &AttrFilter,
    ) -> Result<Vec<Route>, Error> {
        let (qlo, qhi) = crate::bits::wildcard_boundaries(address, wildcard)?;
        let mut out = Vec::new();
        fn walk(node: &Node, attrs: &AttrFilter, qlo: u128, qhi: u128, out: &mut Vec<Route>) {
            if let Some(bucket) = &node.bucket {
                for route in bucket.iter().filter(|r| attrs.matches(r.attrs())) {
                    let (rlo, rhi) = route.prefix().boundaries();
                    if (rlo & qhi) == rlo && (qlo & rhi) == qlo {
                        out.push(route.clone());
                    }
                }
            }
            if let Some(c) = &node.zero {
                walk(c, attrs, qlo, qhi, out);
            }
            if let Some(c) = &node.one {
                walk(c, attrs, qlo, qhi, out);
            }
        }
        walk(&self.root, attrs, qlo, qhi, &mut out);
        sort_routes(&mut out);
        Ok(out)
    }

    fn delete<P: IntoPrefix>(&mut self, prefix: P, attrs: &AttrFilter) -> Result<(), Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let removed = delete_rec(&mut self.root, &bits, attrs, prefix)?;
        self.len -= removed;
        Ok(())
    }

    fn flush<P: IntoPrefix>(
        &mut self,
        prefix: Option<P>,
        attrs: &AttrFilter,
    ) -> Result<(), Error> {
        match prefix {
            Some(p) => self.delete(p, attrs),
            None if attrs.is_empty() => {
                self.root = Box::default();
                self.len = 0;
                Ok(())
            }
            None => {
                let mut out = Vec::new();
                collect_subtree(&self.root, &AttrFilter::any(), &mut out);
                let mut targets: Vec<Prefix> = out
                    .iter()
                    .filter(|r| attrs.matches(r.attrs()))
                    .map(Route::prefix)
                    .collect();
                targets.sort();
                targets.dedup();
                for prefix in targets {
                    self.delete(prefix, attrs)?;
                }
                Ok(())
            }
        }
    }

    fn iterate(&self) -> Vec<Route> {
        let mut out = Vec::new();
        collect_subtree(&self.root, &AttrFilter::any(), &mut out);
        out
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> PrefixTrie {
        PrefixTrie::new()
    }

    mod empty_table {
        use super::*;

        #[test]
        fn len_is_zero() {
            assert_eq!(setup().len(), 0);
            assert!(setup().is_empty());
        }

        #[test]
        fn get_returns_empty() {
            let t = setup();
            assert!(t.get("10.0.0.1/32", &AttrFilter::any()).unwrap().is_empty());
        }

        #[test]
        fn show_as_root_without_prefix_is_usage_error() {
            let t = setup();
            let err = t
                .show::<&str>(None, true, &AttrFilter::any())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UsageError);
        }

        #[test]
        fn delete_missing_prefix_is_no_exact_match() {
            let mut t = setup();
            let err = t.delete("10.0.0.0/8", &AttrFilter::any()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoExactMatch);
        }
    }

    mod with_overlapping_routes {
        use super::*;

        fn setup() -> PrefixTrie {
            let mut t = super::setup();
            t.add("10.0.0.0/8", Attributes::new()).unwrap();
            t.add("10.1.0.0/16", Attributes::new()).unwrap();
            t.add("10.1.1.0/24", Attributes::new()).unwrap();
            t
        }

        #[test]
        fn get_returns_longest_match() {
            let t = setup();
            let got = t.get("10.1.1.5/32", &AttrFilter::any()).unwrap();
            assert_eq!(got.len(), 1);
            assert_eq!(got[0].prefix().to_string(), "10.1.1.0/24");
        }

        #[test]
        fn get_falls_back_to_shorter_ancestor() {
            let t = setup();
            let got = t.get("10.2.0.1/32", &AttrFilter::any()).unwrap();
            assert_eq!(got[0].prefix().to_string(), "10.0.0.0/8");
        }

        #[test]
        fn get_outside_tree_is_empty() {
            let t = setup();
            assert!(t
                .get("11.0.0.1/32", &AttrFilter::any())
                .unwrap()
                .is_empty());
        }

        #[test]
        fn parent_of_deepest_route_is_the_middle_one() {
            let t = setup();
            let got = t.parent("10.1.1.0/24", &AttrFilter::any()).unwrap();
            assert_eq!(got[0].prefix().to_string(), "10.1.0.0/16");
        }

        #[test]
        fn children_of_root_route_excludes_itself() {
            let t = setup();
            let got = t.children("10.0.0.0/8", &AttrFilter::any()).unwrap();
            assert_eq!(got.len(), 2);
        }

        #[test]
        fn iterate_visits_every_route_exactly_once() {
            let t = setup();
            let mut got: Vec<_> = t.iterate().iter().map(|r| r.prefix().to_string()).collect();
            got.sort();
            assert_eq!(
                got,
                vec!["10.0.0.0/8", "10.1.0.0/16", "10.1.1.0/24"]
            );
        }

        #[test]
        fn deleting_middle_route_preserves_others() {
            let mut t = setup();
            t.delete("10.1.0.0/16", &AttrFilter::any()).unwrap();
            assert_eq!(t.len(), 2);
            let got = t.get("10.1.1.5/32", &AttrFilter::any()).unwrap();
            assert_eq!(got[0].prefix().to_string(), "10.1.1.0/24");
            let got = t.get("10.1.2.1/32", &AttrFilter::any()).unwrap();
            assert_eq!(got[0].prefix().to_string(), "10.0.0.0/8");
        }
    }

    mod with_same_prefix_multiple_attrs {
        use super::*;

        fn setup() -> PrefixTrie {
            let mut t = super::setup();
            let mut a = Attributes::new();
            a.insert("via".to_owned(), "A".into());
            t.add("10.0.0.0/8", a).unwrap();
            let mut b = Attributes::new();
            b.insert("via".to_owned(), "B".into());
            t.add("10.0.0.0/8", b).unwrap();
            t
        }

        #[test]
        fn delete_with_attrs_keeps_non_matching() {
            let mut t = setup();
            let filter: AttrFilter = [("via".to_owned(), "A".into())].into_iter().collect();
            t.delete("10.0.0.0/8", &filter).unwrap();
            assert_eq!(t.len(), 1);
        }

        #[test]
        fn delete_with_unmatched_attrs_fails() {
            let mut t = setup();
            let filter: AttrFilter = [("via".to_owned(), "C".into())].into_iter().collect();
            let err = t.delete("10.0.0.0/8", &filter).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoAttrMatch);
        }
    }

    mod flush {
        use super::*;

        #[test]
        fn flush_with_no_args_empties_table() {
            let mut t = super::setup();
            t.add("10.0.0.0/8", Attributes::new()).unwrap();
            t.add("192.168.0.0/16", Attributes::new()).unwrap();
            t.flush::<&str>(None, &AttrFilter::any()).unwrap();
            assert_eq!(t.len(), 0);
            assert!(t.show::<&str>(None, false, &AttrFilter::any()).unwrap().is_empty());
        }

        #[test]
        fn flush_by_attrs_removes_every_match() {
            let mut t = super::setup();
            let mut a = Attributes::new();
            a.insert("via".to_owned(), "A".into());
            t.add("10.0.0.0/8", a.clone()).unwrap();
            t.add("192.168.0.0/16", a).unwrap();
            t.add("172.16.0.0/12", Attributes::new()).unwrap();
            let filter: AttrFilter = [("via".to_owned(), "A".into())].into_iter().collect();
            t.flush::<&str>(None, &filter).unwrap();
            assert_eq!(t.len(), 1);
        }
    }
}
