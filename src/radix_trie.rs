//! A path-compressed, PATRICIA-style radix trie.
use crate::attr::{AttrFilter, Attributes};
use crate::bits::{common_prefix_len, BitSpan, BitString, IntoPrefix, Prefix};
use crate::error::{err, Error, ErrorKind};
use crate::route::Route;
use crate::table::{sort_routes, RoutingTable};

#[derive(Default)]
struct Node {
    bucket: Option<Vec<Route>>,
    /// Child edges, each labelled by a non-empty bit-string. No two labels
    /// share a common prefix (canonical form, invariant 2).
    edges: Vec<(BitString, Box<Node>)>,
}

/// An in-memory longest-prefix-match routing table backed by a
/// path-compressed radix (PATRICIA) trie.
///
/// Unlike [`PrefixTrie`](crate::PrefixTrie), node count is bounded by the
/// number of distinct branching points among stored prefixes rather than
/// their bit-length: inserting and deleting maintain the canonical form by
/// splitting edges on insert and splicing single-child, bucketless nodes
/// back into their parent on delete.
#[derive(Default)]
pub struct RadixTrie {
    root: Node,
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

/// Finds the (at most one, by invariant 2) edge whose label shares a
/// nonzero common prefix with `remaining`.
fn matching_edge_index(node: &Node, remaining: &BitSpan) -> Option<(usize, usize)> {
    node.edges.iter().enumerate().find_map(|(i, (label, _))| {
        let common = common_prefix_len(label, remaining);
        (common > 0).then_some((i, common))
    })
}

fn locate_exact<'a>(node: &'a Node, remaining: &BitSpan) -> Option<&'a Node> {
    if remaining.is_empty() {
        return Some(node);
    }
    let (idx, common) = matching_edge_index(node, remaining)?;
    let label_len = node.edges[idx].0.len();
    if common != label_len {
        return None;
    }
    locate_exact(&node.edges[idx].1, &remaining[common..])
}

fn get_rec<'a>(node: &'a Node, remaining: &BitSpan) -> Option<&'a Vec<Route>> {
    let own = node.bucket.as_ref();
    if remaining.is_empty() {
        return own;
    }
    if let Some((idx, common)) = matching_edge_index(node, remaining) {
        let label_len = node.edges[idx].0.len();
        if common == label_len {
            if let Some(deeper) = get_rec(&node.edges[idx].1, &remaining[common..]) {
                return Some(deeper);
            }
        }
    }
    own
}

fn walk_with_ancestor<'a>(
    node: &'a Node,
    remaining: &BitSpan,
    ancestor: &mut Option<&'a Vec<Route>>,
) -> Option<&'a Node> {
    if remaining.is_empty() {
        return Some(node);
    }
    if node.bucket.is_some() {
        *ancestor = node.bucket.as_ref();
    }
    let (idx, common) = matching_edge_index(node, remaining)?;
    let label_len = node.edges[idx].0.len();
    if common != label_len {
        return None;
    }
    walk_with_ancestor(&node.edges[idx].1, &remaining[common..], ancestor)
}

fn matching_rec(node: &Node, remaining: &BitSpan, attrs: &AttrFilter, out: &mut Vec<Route>) {
    if let Some(bucket) = &node.bucket {
        out.extend(bucket.iter().filter(|r| attrs.matches(r.attrs())).cloned());
    }
    if remaining.is_empty() {
        return;
    }
    if let Some((idx, common)) = matching_edge_index(node, remaining) {
        let label_len = node.edges[idx].0.len();
        if common == label_len {
            matching_rec(&node.edges[idx].1, &remaining[common..], attrs, out);
        }
    }
}

fn collect_subtree(node: &Node, attrs: &AttrFilter, out: &mut Vec<Route>) {
    if let Some(bucket) = &node.bucket {
        out.extend(bucket.iter().filter(|r| attrs.matches(r.attrs())).cloned());
    }
    for (_, child) in &node.edges {
        collect_subtree(child, attrs, out);
    }
}

fn wcmatch_rec(node: &Node, attrs: &AttrFilter, qlo: u128, qhi: u128, out: &mut Vec<Route>) {
    if let Some(bucket) = &node.bucket {
        for route in bucket.iter().filter(|r| attrs.matches(r.attrs())) {
            let (rlo, rhi) = route.prefix().boundaries();
            if (rlo & qhi) == rlo && (qlo & rhi) == qlo {
                out.push(route.clone());
            }
        }
    }
    for (_, child) in &node.edges {
        wcmatch_rec(child, attrs, qlo, qhi, out);
    }
}

/// Inserts `route` below `node`, splitting an edge if `remaining` diverges
/// partway along an existing label. Returns `true` if a new route was
/// actually added (as opposed to a duplicate no-op).
fn add_rec(node: &mut Node, remaining: &BitSpan, route: Route) -> bool {
    if remaining.is_empty() {
        let bucket = node.bucket.get_or_insert_with(Vec::new);
        if bucket.contains(&route) {
            return false;
        }
        bucket.push(route);
        return true;
    }
    if let Some((idx, common)) = matching_edge_index(node, remaining) {
        let label_len = node.edges[idx].0.len();
        if common == label_len {
            return add_rec(&mut node.edges[idx].1, &remaining[common..], route);
        }
        // split: replace `label -> child` with `common -> (suffix -> child)`
        let (label, child) = &mut node.edges[idx];
        let suffix: BitString = label[common..].to_bitvec();
        let new_label: BitString = label[..common].to_bitvec();
        let old_child = std::mem::take(child);
        let mut intermediate = Node::default();
        intermediate.edges.push((suffix, old_child));
        *label = new_label;
        **child = intermediate;
        add_rec(child, &remaining[common..], route)
    } else {
        let mut new_child = Node::default();
        new_child.bucket = Some(vec![route]);
        node.edges.push((remaining.to_bitvec(), Box::new(new_child)));
        true
    }
}

fn delete_rec(
    node: &mut Node,
    remaining: &BitSpan,
    attrs: &AttrFilter,
    prefix: Prefix,
) -> Result<usize, Error> {
    if remaining.is_empty() {
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
    let (idx, common) = matching_edge_index(node, remaining).ok_or_else(|| no_exact_match(prefix))?;
    let label_len = node.edges[idx].0.len();
    if common != label_len {
        return Err(no_exact_match(prefix));
    }
    let removed = delete_rec(&mut node.edges[idx].1, &remaining[common..], attrs, prefix)?;

    let child_has_bucket = node.edges[idx].1.bucket.is_some();
    let child_edge_count = node.edges[idx].1.edges.len();
    if !child_has_bucket {
        match child_edge_count {
            0 => {
                node.edges.remove(idx);
            }
            1 => {
                let (suffix, grandchild) = node.edges[idx].1.edges.pop().expect("exactly one");
                let mut new_label = std::mem::take(&mut node.edges[idx].0);
                new_label.extend_from_bitslice(&suffix);
                node.edges[idx] = (new_label, grandchild);
            }
            _ => {}
        }
    }
    Ok(removed)
}

impl RadixTrie {
    /// Constructs an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of distinct edges in the tree. Exposed for structural
    /// invariant checks in tests.
    #[cfg(test)]
    fn edge_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            node.edges.len() + node.edges.iter().map(|(_, c)| count(c)).sum::<usize>()
        }
        count(&self.root)
    }
}

impl RoutingTable for RadixTrie {
    fn add<P: IntoPrefix>(&mut self, prefix: P, attrs: Attributes) -> Result<(), Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let route = Route::new(prefix, attrs);
        if add_rec(&mut self.root, &bits, route) {
            self.len += 1;
        }
        Ok(())
    }

    fn get<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        Ok(filter_bucket(get_rec(&self.root, &bits), attrs))
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
                    locate_exact(&self.root, &bits).and_then(|n| n.bucket.as_ref()),
                    attrs,
                ))
            }
            (Some(prefix), true) => {
                let bits = prefix.bits();
                let mut out = Vec::new();
                if let Some(node) = locate_exact(&self.root, &bits) {
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
        let mut ancestor = None;
        let exact = walk_with_ancestor(&self.root, &bits, &mut ancestor);
        match exact {
            Some(node) if node.bucket.is_some() => Ok(filter_bucket(ancestor, attrs)),
            _ => Err(no_exact_match(prefix)),
        }
    }

    fn children<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let node = locate_exact(&self.root, &bits).ok_or_else(|| no_exact_match(prefix))?;
        if node.bucket.is_none() {
            return Err(no_exact_match(prefix));
        }
        let mut out = Vec::new();
        for (_, child) in &node.edges {
            collect_subtree(child, attrs, &mut out);
        }
        sort_routes(&mut out);
        Ok(out)
    }

    fn matching<P: IntoPrefix>(&self, prefix: P, attrs: &AttrFilter) -> Result<Vec<Route>, Error> {
        let prefix = prefix.into_prefix()?;
        let bits = prefix.bits();
        let mut out = Vec::new();
        matching_rec(&self.root, &bits, attrs, &mut out);
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
        wcmatch_rec(&self.root, attrs, qlo, qhi, &mut out);
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
                self.root = Node::default();
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

    fn setup() -> RadixTrie {
        RadixTrie::new()
    }

    mod empty_table {
        use super::*;

        #[test]
        fn len_is_zero() {
            assert_eq!(setup().len(), 0);
        }

        #[test]
        fn get_returns_empty() {
            let t = setup();
            assert!(t.get("10.0.0.1/32", &AttrFilter::any()).unwrap().is_empty());
        }
    }

    mod with_overlapping_routes {
        use super::*;

        fn setup() -> RadixTrie {
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
            assert_eq!(got[0].prefix().to_string(), "10.1.1.0/24");
        }

        #[test]
        fn get_falls_back_to_shorter_ancestor() {
            let t = setup();
            let got = t.get("10.2.0.1/32", &AttrFilter::any()).unwrap();
            assert_eq!(got[0].prefix().to_string(), "10.0.0.0/8");
        }

        #[test]
        fn children_of_root_route_excludes_itself() {
            let t = setup();
            let got = t.children("10.0.0.0/8", &AttrFilter::any()).unwrap();
            assert_eq!(got.len(), 2);
        }

        #[test]
        fn parent_of_deepest_route_is_the_middle_one() {
            let t = setup();
            let got = t.parent("10.1.1.0/24", &AttrFilter::any()).unwrap();
            assert_eq!(got[0].prefix().to_string(), "10.1.0.0/16");
        }

        #[test]
        fn match_collects_every_ancestor_on_path() {
            let t = setup();
            let got = t.matching("10.1.1.0/24", &AttrFilter::any()).unwrap();
            assert_eq!(got.len(), 3);
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
    }

    mod deletion_merges_single_child_nodes {
        use super::*;

        #[test]
        fn splice_after_removing_a_branch() {
            let mut t = setup();
            t.add("10.0.0.0/8", Attributes::new()).unwrap();
            t.add("10.128.0.0/9", Attributes::new()).unwrap();
            let edges_before = t.edge_count();
            assert!(edges_before >= 2);
            t.delete("10.128.0.0/9", &AttrFilter::any()).unwrap();
            assert_eq!(t.len(), 1);
            assert_eq!(t.edge_count(), 1);
            let got = t.get("10.1.1.1/32", &AttrFilter::any()).unwrap();
            assert_eq!(got[0].prefix().to_string(), "10.0.0.0/8");
        }
    }

    mod with_same_prefix_multiple_attrs {
        use super::*;

        fn setup() -> RadixTrie {
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
            assert_eq!(t.edge_count(), 0);
        }
    }
}
