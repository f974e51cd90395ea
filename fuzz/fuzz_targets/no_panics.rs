#![no_main]

use std::str::from_utf8;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use routing_table::{AttrFilter, Attributes, PrefixTrie, RadixTrie, RoutingTable};

#[derive(Debug, Arbitrary)]
enum Op {
    Add(String),
    Delete(String),
    Get(String),
    Parent(String),
    Children(String),
    Match(String),
    Wcmatch(String, String),
    Iterate,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut prefix_trie = PrefixTrie::new();
    let mut radix_trie = RadixTrie::new();

    for op in ops {
        match op {
            Op::Add(s) => {
                let _ = prefix_trie.add(s.as_str(), Attributes::new());
                let _ = radix_trie.add(s.as_str(), Attributes::new());
            }
            Op::Delete(s) => {
                let _ = prefix_trie.delete(s.as_str(), &AttrFilter::any());
                let _ = radix_trie.delete(s.as_str(), &AttrFilter::any());
            }
            Op::Get(s) => {
                let _ = prefix_trie.get(s.as_str(), &AttrFilter::any());
                let _ = radix_trie.get(s.as_str(), &AttrFilter::any());
            }
            Op::Parent(s) => {
                let _ = prefix_trie.parent(s.as_str(), &AttrFilter::any());
                let _ = radix_trie.parent(s.as_str(), &AttrFilter::any());
            }
            Op::Children(s) => {
                let _ = prefix_trie.children(s.as_str(), &AttrFilter::any());
                let _ = radix_trie.children(s.as_str(), &AttrFilter::any());
            }
            Op::Match(s) => {
                let _ = prefix_trie.matching(s.as_str(), &AttrFilter::any());
                let _ = radix_trie.matching(s.as_str(), &AttrFilter::any());
            }
            Op::Wcmatch(addr, wildcard) => {
                let _ = prefix_trie.wcmatch(&addr, &wildcard, &AttrFilter::any());
                let _ = radix_trie.wcmatch(&addr, &wildcard, &AttrFilter::any());
            }
            Op::Iterate => {
                let _ = prefix_trie.iterate();
                let _ = radix_trie.iterate();
            }
        }
    }

    assert_eq!(prefix_trie.len(), radix_trie.len());
    assert_eq!(prefix_trie.iterate().len(), prefix_trie.len());
    assert_eq!(radix_trie.iterate().len(), radix_trie.len());
});

#[allow(dead_code)]
fn parses_without_panicking(data: &[u8]) {
    if let Ok(s) = from_utf8(data) {
        let _ = s.parse::<routing_table::Prefix>();
    }
}
