// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IPv4 and IPv6 addresses, CIDR networks, and longest-prefix-match sets.
//!
//! Addresses are plain integers in network bit order. [`Network`] pairs
//! one with a prefix length and supports containment, aggregation into a
//! supernet, and lazy splitting into subnets. Text is parsed without
//! allocating, through a [`token::Tokenizer`] which reads from both ends
//! of the input.
//!
//! ```
//! use ipkit::{Ipv4Network, Ipv6Network};
//!
//! let net: Ipv4Network = "192.120.12.99/24".parse().unwrap();
//! assert_eq!(net.to_string(), "192.120.12.0/24");
//!
//! let mapped: Ipv6Network = "::ffff:192.168.10.1/96".parse().unwrap();
//! assert_eq!(mapped.to_string(), "::ffff:0:0/96");
//! ```

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod any;
pub mod bits;
pub mod error;
pub mod network;
#[cfg(feature = "serde")]
mod serde_impls;
#[cfg(feature = "alloc")]
pub mod set;
pub mod token;
pub mod v4;
pub mod v6;

pub use any::{IpAddress, IpNetwork};
pub use bits::{AddressBits, AddressCount};
pub use error::{Error, ParseError, ParseResult, RangeError};
pub use network::{Address, Network, Subnets};
#[cfg(feature = "alloc")]
pub use set::{IpSet, Ipv4Set, Ipv6Set};
pub use v4::{Ipv4Address, Ipv4Network};
pub use v6::{Ipv6Address, Ipv6Network};
