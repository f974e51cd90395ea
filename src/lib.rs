//! An in-memory, longest-prefix-match IP routing table.
//!
//! This crate provides two interchangeable table implementations —
//! [`PrefixTrie`], an uncompressed binary trie, and [`RadixTrie`], a
//! path-compressed PATRICIA trie — both satisfying the [`RoutingTable`]
//! contract: insert routes carrying arbitrary attributes, and query them by
//! longest-prefix match, ancestor/descendant relationship, or wildcard
//! address range.
//!
//! ```
//! use routing_table::{AttrFilter, Attributes, PrefixTrie, RoutingTable};
//!
//! let mut table = PrefixTrie::new();
//! table.add("10.0.0.0/8", Attributes::new())?;
//! table.add("10.1.0.0/16", Attributes::new())?;
//!
//! let routes = table.get("10.1.2.3/32", &AttrFilter::any())?;
//! assert_eq!(routes[0].prefix().to_string(), "10.1.0.0/16");
//! # Ok::<(), routing_table::Error>(())
//! ```
#![doc(html_root_url = "https://docs.rs/routing-table/0.1.0-alpha.1")]

mod attr;
mod bits;
mod error;
mod prefix_trie;
mod radix_trie;
mod route;
mod table;

pub use attr::{AttrFilter, AttrValue, Attributes};
pub use bits::{Family, IntoPrefix, Prefix};
pub use error::{Error, ErrorKind};
pub use prefix_trie::PrefixTrie;
pub use radix_trie::RadixTrie;
pub use route::Route;
pub use table::RoutingTable;
