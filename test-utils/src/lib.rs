//! Shared `proptest` strategies for generating arbitrary IPv4/IPv6 prefixes
//! and attribute sets, used by the routing table's equivalence tests and
//! benchmarks.
use proptest::prelude::*;

/// Generates an arbitrary textual IPv4 CIDR prefix, e.g. `"10.1.2.0/24"`.
pub fn ipv4_prefix() -> impl Strategy<Value = String> {
    (any::<u32>(), 0u8..=32)
        .prop_map(|(net, len)| format!("{}/{len}", std::net::Ipv4Addr::from(net)))
}

/// Generates an arbitrary textual IPv6 CIDR prefix, e.g. `"2001:db8::/32"`.
pub fn ipv6_prefix() -> impl Strategy<Value = String> {
    (any::<u128>(), 0u8..=128)
        .prop_map(|(net, len)| format!("{}/{len}", std::net::Ipv6Addr::from(net)))
}

/// Generates a small attribute set as `(key, value)` string pairs, with
/// repeated keys collapsing the way a `HashMap` would.
pub fn attr_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        ("[a-z]{1,6}", "[A-Za-z0-9]{1,8}"),
        0..4,
    )
}

/// Generates a batch of `(prefix, attrs)` pairs over IPv4 prefixes, suitable
/// for driving a sequence of `add` calls in an equivalence test.
pub fn ipv4_routes(max_len: usize) -> impl Strategy<Value = Vec<(String, Vec<(String, String)>)>> {
    prop::collection::vec((ipv4_prefix(), attr_pairs()), 0..max_len)
}

/// Generates a batch of `(prefix, attrs)` pairs over IPv6 prefixes.
pub fn ipv6_routes(max_len: usize) -> impl Strategy<Value = Vec<(String, Vec<(String, String)>)>> {
    prop::collection::vec((ipv6_prefix(), attr_pairs()), 0..max_len)
}
