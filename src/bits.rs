//! Prefix bit-string extraction and integer boundary arithmetic.
//!
//! This module is the routing table's sole external collaborator: it
//! delegates all address parsing and arithmetic to [`ipnet`], and exposes
//! only the handful of operations the trie implementations need (bit
//! extraction, network/broadcast boundaries, wildcard ranges).
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use bitvec::prelude::*;
use ipnet::IpNet;

use crate::error::{err, Error, ErrorKind};

/// The IP address family of a [`Prefix`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum Family {
    /// IPv4.
    V4,
    /// IPv6.
    V6,
}

impl Family {
    /// The number of bits in an address of this family.
    #[must_use]
    pub const fn max_len(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "ipv4"),
            Self::V6 => write!(f, "ipv6"),
        }
    }
}

/// A big-endian run of prefix bits, from 0 up to the address family's
/// maximum length.
///
/// The empty bit-string denotes the default route for a family.
pub type BitString = BitVec<u8, Msb0>;

/// A borrowed view of a [`BitString`], analogous to `&str` for `String`.
pub type BitSpan = bitvec::slice::BitSlice<u8, Msb0>;

/// Returns the length of the longest common prefix of `a` and `b`.
#[must_use]
pub fn common_prefix_len(a: &BitSpan, b: &BitSpan) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Returns `true` if `needle` is a prefix of `haystack` (including equal).
#[must_use]
pub fn starts_with(haystack: &BitSpan, needle: &BitSpan) -> bool {
    needle.len() <= haystack.len() && common_prefix_len(haystack, needle) == needle.len()
}

/// A network prefix: an address family, a network id, and a prefix length.
///
/// Construction always normalises host bits (non-strict parsing), so two
/// textually distinct inputs that cover the same network compare equal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Prefix {
    net: IpNet,
}

impl Prefix {
    /// Constructs a prefix from an already-parsed [`IpNet`], masking off any
    /// host bits.
    #[must_use]
    pub fn new(net: IpNet) -> Self {
        Self { net: net.trunc() }
    }

    /// The address family of this prefix.
    #[must_use]
    pub fn family(&self) -> Family {
        match self.net {
            IpNet::V4(_) => Family::V4,
            IpNet::V6(_) => Family::V6,
        }
    }

    /// The prefix length.
    #[must_use]
    pub fn len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// `true` if this is the default route (length zero) for its family.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The network id as an unsigned integer, left-aligned within the
    /// family's address width (i.e. host bits beyond `len()` are zero).
    #[must_use]
    pub fn network_id(&self) -> u128 {
        match self.net {
            IpNet::V4(n) => u128::from(u32::from(n.network())) << 96,
            IpNet::V6(n) => u128::from(n.network()),
        }
    }

    /// The bit-string corresponding to this prefix's network id, of length
    /// `self.len()`.
    #[must_use]
    pub fn bits(&self) -> BitString {
        let width = self.family().max_len();
        let full = self.network_id().to_be_bytes();
        // `network_id()` is left-aligned within the u128 (the v4 case is
        // shifted into the top 4 bytes), so the family's address bytes are
        // always the *leading* `width / 8` bytes of the big-endian form.
        let mut bits = BitString::from_slice(&full[..width as usize / 8]);
        bits.truncate(self.len() as usize);
        bits
    }

    /// The inclusive `(network, broadcast)` integer boundaries covered by
    /// this prefix.
    #[must_use]
    pub fn boundaries(&self) -> (u128, u128) {
        match self.net {
            IpNet::V4(n) => (
                u128::from(u32::from(n.network())) << 96,
                u128::from(u32::from(n.broadcast())) << 96,
            ),
            IpNet::V6(n) => (u128::from(n.network()), u128::from(n.broadcast())),
        }
    }
}

impl PartialOrd for Prefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Prefix {
    /// Ascending `(family, network id, length)`, matching the table's
    /// documented sort order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.family()
            .cmp(&other.family())
            .then_with(|| self.network_id().cmp(&other.network_id()))
            .then_with(|| self.len().cmp(&other.len()))
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

impl FromStr for Prefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net: IpNet = s
            .parse()
            .map_err(|e| err!(ErrorKind::InvalidAddress, format!("{s}"), e))?;
        Ok(Self::new(net))
    }
}

/// Types convertible into a [`Prefix`], accepted by every table operation
/// that takes a prefix argument.
pub trait IntoPrefix {
    /// Performs the conversion.
    fn into_prefix(self) -> Result<Prefix, Error>;
}

impl IntoPrefix for Prefix {
    fn into_prefix(self) -> Result<Prefix, Error> {
        Ok(self)
    }
}

impl IntoPrefix for &str {
    fn into_prefix(self) -> Result<Prefix, Error> {
        self.parse()
    }
}

impl IntoPrefix for IpNet {
    fn into_prefix(self) -> Result<Prefix, Error> {
        Ok(Prefix::new(self))
    }
}

/// Computes the inclusive wildcard-match range `[address, address |
/// wildcard]` for a given address and wildcard mask, both in the same
/// address family.
pub fn wildcard_boundaries(address: &str, wildcard: &str) -> Result<(u128, u128), Error> {
    use std::net::IpAddr;

    let addr: IpAddr = address
        .parse()
        .map_err(|e| err!(ErrorKind::InvalidAddress, format!("{address}"), e))?;
    let mask: IpAddr = wildcard
        .parse()
        .map_err(|e| err!(ErrorKind::InvalidAddress, format!("{wildcard}"), e))?;
    let (lo, hi) = match (addr, mask) {
        (IpAddr::V4(a), IpAddr::V4(m)) => {
            let lo = u32::from(a);
            let hi = lo | u32::from(m);
            (u128::from(lo) << 96, u128::from(hi) << 96)
        }
        (IpAddr::V6(a), IpAddr::V6(m)) => {
            let lo = u128::from(a);
            (lo, lo | u128::from(m))
        }
        _ => {
            return Err(err!(
                ErrorKind::InvalidAddress,
                format!("{address}/{wildcard}"),
                "address and wildcard mask must be the same family"
            ))
        }
    };
    Ok((lo, hi))
}

#[cfg(any(test, feature = "arbitrary"))]
use proptest::{arbitrary::Arbitrary, prelude::*};

#[cfg(any(test, feature = "arbitrary"))]
impl Arbitrary for Prefix {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_params: Self::Parameters) -> Self::Strategy {
        use ipnet::{Ipv4Net, Ipv6Net};
        use std::net::{Ipv4Addr, Ipv6Addr};

        let v4 = (any::<u32>(), 0u8..=32).prop_map(|(net, len)| {
            Prefix::new(IpNet::V4(
                Ipv4Net::new(Ipv4Addr::from(net), len).expect("length in range"),
            ))
        });
        let v6 = (any::<u128>(), 0u8..=128).prop_map(|(net, len)| {
            Prefix::new(IpNet::V6(
                Ipv6Net::new(Ipv6Addr::from(net), len).expect("length in range"),
            ))
        });
        prop_oneof![v4, v6].boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_host_bits() {
        let p: Prefix = "192.0.2.130/24".parse().unwrap();
        assert_eq!(p.to_string(), "192.0.2.0/24");
    }

    #[test]
    fn bits_len_matches_prefix_len() {
        let p: Prefix = "10.1.0.0/16".parse().unwrap();
        assert_eq!(p.bits().len(), 16);
    }

    #[test]
    fn default_route_has_empty_bits() {
        let p: Prefix = "0.0.0.0/0".parse().unwrap();
        assert!(p.bits().is_empty());
    }

    #[test]
    fn orders_by_network_then_length() {
        let a: Prefix = "10.0.0.0/8".parse().unwrap();
        let b: Prefix = "10.1.0.0/16".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn common_prefix_len_finds_shared_bits() {
        let a: Prefix = "192.168.0.0/24".parse().unwrap();
        let b: Prefix = "192.168.1.0/24".parse().unwrap();
        assert_eq!(common_prefix_len(&a.bits(), &b.bits()), 23);
    }
}
