// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Addresses and networks of either family.
//!
//! Operations which combine two values require both to be of the same
//! family, and fail with [`Error::FamilyMismatch`] otherwise.

use crate::error::{Error, ParseError, ParseResult, RangeError};
use crate::network::Address;
use crate::v4::{Ipv4Address, Ipv4Network};
use crate::v6::{Ipv6Address, Ipv6Network};
use core::fmt;
use core::str::FromStr;

/// An IPv4 or IPv6 address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IpAddress {
    V4(Ipv4Address),
    V6(Ipv6Address),
}

/// An IPv4 or IPv6 network.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IpNetwork {
    V4(Ipv4Network),
    V6(Ipv6Network),
}

impl IpAddress {
    /// Parses IPv6 text if it holds a colon, and IPv4 text otherwise.
    pub fn parse(text: &str) -> ParseResult<Self> {
        if is_ipv6_text(text) {
            Ipv6Address::parse(text).map(Self::V6)
        } else {
            Ipv4Address::parse(text).map(Self::V4)
        }
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    #[inline]
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Self::V4(_))
    }

    #[inline]
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Self::V6(_))
    }

    /// Width of the address in bits.
    #[inline]
    pub fn width(&self) -> u8 {
        match self {
            Self::V4(_) => Ipv4Address::BITS,
            Self::V6(_) => Ipv6Address::BITS,
        }
    }

    #[inline]
    pub fn as_v4(&self) -> Option<Ipv4Address> {
        match self {
            Self::V4(a) => Some(*a),
            Self::V6(_) => None,
        }
    }

    #[inline]
    pub fn as_v6(&self) -> Option<Ipv6Address> {
        match self {
            Self::V4(_) => None,
            Self::V6(a) => Some(*a),
        }
    }

    /// Writes the address in network byte order into `buf` at `offset`.
    ///
    /// Four bytes are written for IPv4 and sixteen for IPv6.
    pub fn write_bytes(self, buf: &mut [u8], offset: usize) -> Result<(), RangeError> {
        match self {
            Self::V4(a) => a.write_bytes(buf, offset),
            Self::V6(a) => a.write_bytes(buf, offset),
        }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(a) => fmt::Display::fmt(a, f),
            Self::V6(a) => fmt::Display::fmt(a, f),
        }
    }
}

impl fmt::Debug for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Ipv4Address> for IpAddress {
    #[inline]
    fn from(a: Ipv4Address) -> Self {
        Self::V4(a)
    }
}

impl From<Ipv6Address> for IpAddress {
    #[inline]
    fn from(a: Ipv6Address) -> Self {
        Self::V6(a)
    }
}

impl From<core::net::IpAddr> for IpAddress {
    fn from(ip: core::net::IpAddr) -> Self {
        match ip {
            core::net::IpAddr::V4(a) => Self::V4(a.into()),
            core::net::IpAddr::V6(a) => Self::V6(a.into()),
        }
    }
}

impl From<IpAddress> for core::net::IpAddr {
    fn from(ip: IpAddress) -> Self {
        match ip {
            IpAddress::V4(a) => Self::V4(a.into()),
            IpAddress::V6(a) => Self::V6(a.into()),
        }
    }
}

impl IpNetwork {
    /// Parses IPv6 text if it holds a colon, and IPv4 text otherwise.
    pub fn parse(text: &str) -> ParseResult<Self> {
        if is_ipv6_text(text) {
            Ipv6Network::parse(text).map(Self::V6)
        } else {
            Ipv4Network::parse(text).map(Self::V4)
        }
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Builds a network from any address within it.
    pub fn new(address: IpAddress, mask: u8) -> Result<Self, RangeError> {
        match address {
            IpAddress::V4(a) => Ipv4Network::new(a, mask).map(Self::V4),
            IpAddress::V6(a) => Ipv6Network::new(a, mask).map(Self::V6),
        }
    }

    #[inline]
    pub fn mask(&self) -> u8 {
        match self {
            Self::V4(n) => n.mask(),
            Self::V6(n) => n.mask(),
        }
    }

    #[inline]
    pub fn address(&self) -> IpAddress {
        match self {
            Self::V4(n) => IpAddress::V4(n.address()),
            Self::V6(n) => IpAddress::V6(n.address()),
        }
    }

    #[inline]
    pub fn end_address(&self) -> IpAddress {
        match self {
            Self::V4(n) => IpAddress::V4(n.end_address()),
            Self::V6(n) => IpAddress::V6(n.end_address()),
        }
    }

    #[inline]
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Self::V4(_))
    }

    #[inline]
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Self::V6(_))
    }

    #[inline]
    pub fn as_v4(&self) -> Option<Ipv4Network> {
        match self {
            Self::V4(n) => Some(*n),
            Self::V6(_) => None,
        }
    }

    #[inline]
    pub fn as_v6(&self) -> Option<Ipv6Network> {
        match self {
            Self::V4(_) => None,
            Self::V6(n) => Some(*n),
        }
    }

    pub fn contains(&self, other: &Self) -> Result<bool, Error> {
        match (self, other) {
            (Self::V4(a), Self::V4(b)) => Ok(a.contains(b)),
            (Self::V6(a), Self::V6(b)) => Ok(a.contains(b)),
            _ => Err(Error::FamilyMismatch),
        }
    }

    pub fn contains_or_equal(&self, other: &Self) -> Result<bool, Error> {
        match (self, other) {
            (Self::V4(a), Self::V4(b)) => Ok(a.contains_or_equal(b)),
            (Self::V6(a), Self::V6(b)) => Ok(a.contains_or_equal(b)),
            _ => Err(Error::FamilyMismatch),
        }
    }

    pub fn contains_address(&self, address: IpAddress) -> Result<bool, Error> {
        match (self, address) {
            (Self::V4(n), IpAddress::V4(a)) => Ok(n.contains_address(a)),
            (Self::V6(n), IpAddress::V6(a)) => Ok(n.contains_address(a)),
            _ => Err(Error::FamilyMismatch),
        }
    }

    #[inline]
    pub fn is_contained_in(&self, other: &Self) -> Result<bool, Error> {
        other.contains(self)
    }

    #[inline]
    pub fn is_contained_in_or_equal(&self, other: &Self) -> Result<bool, Error> {
        other.contains_or_equal(self)
    }

    /// The smallest network containing every network in `networks`.
    ///
    /// Fails on empty input, or if the networks are not all of one family.
    pub fn make_supernet<I>(networks: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut networks = networks.into_iter().peekable();
        let is_v4 = match networks.peek() {
            Some(first) => first.is_ipv4(),
            None => return Err(RangeError::EmptyInput.into()),
        };

        // Stops at the first network of the other family.
        let mut mismatch = false;
        let supernet = if is_v4 {
            let family = networks.map_while(|n| {
                let v4 = n.as_v4();
                mismatch |= v4.is_none();
                v4
            });
            Self::V4(Ipv4Network::make_supernet(family)?)
        } else {
            let family = networks.map_while(|n| {
                let v6 = n.as_v6();
                mismatch |= v6.is_none();
                v6
            });
            Self::V6(Ipv6Network::make_supernet(family)?)
        };

        if mismatch {
            return Err(Error::FamilyMismatch);
        }
        Ok(supernet)
    }

    /// Writes the network address in network byte order into `buf` at
    /// `offset`.
    pub fn write_bytes(&self, buf: &mut [u8], offset: usize) -> Result<(), RangeError> {
        self.address().write_bytes(buf, offset)
    }

    /// The IPv4 prefix string, or the plain text form for IPv6.
    pub fn prefix_string(&self) -> impl fmt::Display + '_ {
        PrefixString(self)
    }
}

fn is_ipv6_text(text: &str) -> bool {
    text.as_bytes().contains(&b':')
}

struct PrefixString<'a>(&'a IpNetwork);

impl fmt::Display for PrefixString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            IpNetwork::V4(n) => fmt::Display::fmt(&n.prefix_string(), f),
            IpNetwork::V6(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl fmt::Display for IpNetwork {
    /// `address/mask`. The alternate form `{:#}` leaves out the mask of a
    /// host route.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(n) => fmt::Display::fmt(n, f),
            Self::V6(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl fmt::Debug for IpNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(n) => fmt::Debug::fmt(n, f),
            Self::V6(n) => fmt::Debug::fmt(n, f),
        }
    }
}

impl FromStr for IpNetwork {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Ipv4Network> for IpNetwork {
    #[inline]
    fn from(n: Ipv4Network) -> Self {
        Self::V4(n)
    }
}

impl From<Ipv6Network> for IpNetwork {
    #[inline]
    fn from(n: Ipv6Network) -> Self {
        Self::V6(n)
    }
}

impl From<IpAddress> for IpNetwork {
    fn from(address: IpAddress) -> Self {
        match address {
            IpAddress::V4(a) => Self::V4(a.into()),
            IpAddress::V6(a) => Self::V6(a.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::string::ToString;
    use std::vec::Vec;

    fn net(text: &str) -> IpNetwork {
        text.parse().unwrap()
    }

    #[test]
    fn parse_either_family() {
        assert!(net("192.168.0.0/16").is_ipv4());
        assert!(net("2001:db8::/32").is_ipv6());
        assert!(net("::ffff:10.0.0.1").is_ipv6());
        assert_eq!(IpAddress::parse("10.1.2.3").unwrap().width(), 32);
        assert_eq!(IpAddress::parse("::1").unwrap().width(), 128);
        assert!(IpNetwork::try_parse("192.168.1.0/").is_none());
        assert!(IpNetwork::try_parse("2001:::4").is_none());
        assert_eq!(IpNetwork::parse("10.0.0.0/33"), Err(ParseError::MaskOutOfRange));
        assert_eq!(IpAddress::parse("2001::ffff::1"), Err(ParseError::DoubleCompression));
        assert_eq!(net("10.1.2.3/8").to_string(), "10.0.0.0/8");
        assert_eq!(net("10.1.2.3/8").prefix_string().to_string(), "10/8");
        assert_eq!(net("2001:db8::/32").prefix_string().to_string(), "2001:db8::/32");
    }

    #[test]
    fn same_family_operations() {
        let outer = net("10.0.0.0/8");
        let inner = net("10.20.0.0/16");
        assert_eq!(outer.contains(&inner), Ok(true));
        assert_eq!(inner.is_contained_in(&outer), Ok(true));
        assert_eq!(outer.contains_or_equal(&outer), Ok(true));
        assert_eq!(inner.is_contained_in_or_equal(&inner), Ok(true));
        assert_eq!(outer.contains_address(IpAddress::parse("10.9.9.9").unwrap()), Ok(true));
    }

    #[test]
    fn mixed_families() {
        let v4 = net("10.0.0.0/8");
        let v6 = net("::/0");
        assert_eq!(v4.contains(&v6), Err(Error::FamilyMismatch));
        assert_eq!(v6.contains_or_equal(&v4), Err(Error::FamilyMismatch));
        assert_eq!(v4.is_contained_in(&v6), Err(Error::FamilyMismatch));
        assert_eq!(
            v6.contains_address(IpAddress::parse("10.0.0.1").unwrap()),
            Err(Error::FamilyMismatch)
        );
        assert_eq!(IpNetwork::make_supernet([v4, v6]), Err(Error::FamilyMismatch));
        assert_eq!(IpNetwork::make_supernet([v6, v6, v4]), Err(Error::FamilyMismatch));
    }

    #[test]
    fn supernets() {
        assert_eq!(
            IpNetwork::make_supernet([net("192.168.0/24"), net("192.168.1/24")]),
            Ok(net("192.168.0.0/23"))
        );
        assert_eq!(
            IpNetwork::make_supernet([net("2001:db8:1::/48"), net("2001:db8:2::/48")]),
            Ok(net("2001:db8::/46"))
        );
        assert_eq!(
            IpNetwork::make_supernet(Vec::<IpNetwork>::new()),
            Err(Error::Range(RangeError::EmptyInput))
        );
    }

    #[test]
    fn conversions() {
        let std: core::net::IpAddr = "2001:db8::1".parse().unwrap();
        let ip = IpAddress::from(std);
        assert_eq!(ip.as_v6(), Some(Ipv6Address::parse("2001:db8::1").unwrap()));
        assert_eq!(core::net::IpAddr::from(ip), std);
        assert_eq!(IpNetwork::from(ip).mask(), 128);

        let mut buf = [0u8; 4];
        IpAddress::parse("1.2.3.4").unwrap().write_bytes(&mut buf, 0).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert!(net("::/0").write_bytes(&mut buf, 0).is_err());
    }
}
