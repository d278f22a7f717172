// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IPv4 addresses and networks.
//!
//! The dotted grammar accepts one to four octets, with missing trailing
//! octets taken as zero (`192.168` is `192.168.0.0`), and an optional
//! `/mask` defaulting to 32.

use crate::error::{ParseError, ParseResult, RangeError};
use crate::network::{Address, Network};
use crate::token::{Direction, Radix, Token, TokenKind, Tokenizer};
use core::fmt;
use core::str::FromStr;

/// An IPv4 address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ipv4Address(u32);

/// An IPv4 network.
pub type Ipv4Network = Network<Ipv4Address>;

impl Ipv4Address {
    /// `0.0.0.0`
    pub const MIN: Self = Self(0);
    /// `255.255.255.255`
    pub const MAX: Self = Self(u32::MAX);
    pub const UNSPECIFIED: Self = Self::MIN;
    pub const LOCALHOST: Self = Self::from_octets([127, 0, 0, 1]);

    #[inline]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn from_octets(octets: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(octets))
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// The address in network byte order.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.octets()
    }

    /// Reads four bytes in network byte order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RangeError> {
        Self::read_bytes(bytes, 0)
    }

    /// `::ffff:a.b.c.d`
    #[inline]
    pub const fn to_ipv6_mapped(self) -> crate::v6::Ipv6Address {
        crate::v6::Ipv6Address::new(0xffff_0000_0000 | self.0 as u128)
    }

    /// Parses a dotted address. A `/mask` is not accepted.
    pub fn parse(text: &str) -> ParseResult<Self> {
        Self::parse_ascii(text.as_bytes())
    }

    pub fn parse_ascii(text: &[u8]) -> ParseResult<Self> {
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut tokens = Tokenizer::new(text);
        let (address, after) = read_octets(&mut tokens)?;
        expect_end(after)?;
        Ok(Self(address))
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }
}

impl Address for Ipv4Address {
    type Bits = u32;

    #[inline]
    fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    fn to_bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl fmt::Debug for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Ipv4Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u32> for Ipv4Address {
    #[inline]
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<Ipv4Address> for u32 {
    #[inline]
    fn from(address: Ipv4Address) -> Self {
        address.0
    }
}

impl From<[u8; 4]> for Ipv4Address {
    #[inline]
    fn from(octets: [u8; 4]) -> Self {
        Self::from_octets(octets)
    }
}

impl From<core::net::Ipv4Addr> for Ipv4Address {
    #[inline]
    fn from(ip4: core::net::Ipv4Addr) -> Self {
        Self(ip4.to_bits())
    }
}

impl From<Ipv4Address> for core::net::Ipv4Addr {
    #[inline]
    fn from(ip4: Ipv4Address) -> Self {
        Self::from_bits(ip4.0)
    }
}

impl Network<Ipv4Address> {
    /// Parses `a[.b[.c[.d]]][/mask]`.
    pub fn parse(text: &str) -> ParseResult<Self> {
        Self::parse_ascii(text.as_bytes())
    }

    pub fn parse_ascii(text: &[u8]) -> ParseResult<Self> {
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut tokens = Tokenizer::new(text);
        let (address, after) = read_octets(&mut tokens)?;
        let mask = match after.kind {
            TokenKind::End => 32,
            TokenKind::Slash => {
                let mask = read_mask(tokens.next(Direction::Front, Radix::Decimal), 32)?;
                expect_end(tokens.next(Direction::Front, Radix::Decimal))?;
                mask
            }
            _ => return Err(ParseError::TrailingInput),
        };
        Ok(Self::truncated(Ipv4Address(address), mask))
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Parses a network with a single pass over the bytes.
    ///
    /// Intended for input whose shape is already known to be sound. It
    /// rejects bytes outside `0-9./`, more than three dots, empty octets,
    /// out of range octets and masks, and anything after the mask other
    /// than digits. It does not limit the number of digits per octet, so
    /// it accepts some text [`Self::parse`] rejects, such as
    /// `0000010.0.0.1`.
    pub fn parse_unstable(text: &str) -> ParseResult<Self> {
        let text = text.as_bytes();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        if text.len() > MAX_TEXT_LEN {
            return Err(ParseError::TrailingInput);
        }

        let mut address = 0u32;
        let mut field = 0u32;
        let mut digits = 0;
        let mut dots = 0;
        let mut in_mask = false;

        for &c in text {
            match c {
                b'0'..=b'9' => {
                    field = field * 10 + u32::from(c - b'0');
                    digits += 1;
                    if in_mask && field > 32 {
                        return Err(ParseError::MaskOutOfRange);
                    }
                    if !in_mask && field > 255 {
                        return Err(ParseError::OctetOutOfRange);
                    }
                }
                b'.' if !in_mask && dots < 3 && digits > 0 => {
                    address = (address << 8) | field;
                    field = 0;
                    digits = 0;
                    dots += 1;
                }
                b'/' if !in_mask && digits > 0 => {
                    address = (address << 8) | field;
                    field = 0;
                    digits = 0;
                    in_mask = true;
                }
                _ => return Err(ParseError::UnexpectedToken),
            }
        }

        if digits == 0 {
            return Err(ParseError::UnexpectedToken);
        }
        let mask = if in_mask {
            field as u8
        } else {
            address = (address << 8) | field;
            32
        };
        address <<= 8 * (3 - dots);

        Ok(Self::truncated(Ipv4Address(address), mask))
    }

    /// Text form with trailing zero octets left out where the mask
    /// allows, such as `192.168/16`.
    #[inline]
    pub fn prefix_string(&self) -> PrefixString {
        PrefixString(*self)
    }
}

impl FromStr for Network<Ipv4Address> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Longest accepted text: `255.255.255.255/32`.
const MAX_TEXT_LEN: usize = 18;

/// Displays an [`Ipv4Network`] in its shortened prefix form.
///
/// Returned by [`Ipv4Network::prefix_string`].
#[derive(Clone, Copy, Debug)]
pub struct PrefixString(Ipv4Network);

impl fmt::Display for PrefixString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let network = &self.0;
        let bits = network.address().bits();
        let mask = network.mask();
        let [a, b, c, _] = network.address().octets();

        if mask <= 8 && bits & 0x00ff_ffff == 0 {
            write!(f, "{a}/{mask}")
        } else if mask <= 16 && bits & 0x0000_ffff == 0 {
            write!(f, "{a}.{b}/{mask}")
        } else if mask <= 24 && bits & 0x0000_00ff == 0 {
            write!(f, "{a}.{b}.{c}/{mask}")
        } else {
            write!(f, "{network}")
        }
    }
}

/// Reads one to four dotted octets from the front.
///
/// Returns the address, with missing octets zeroed, and the token which
/// followed the last octet.
fn read_octets(tokens: &mut Tokenizer<'_>) -> ParseResult<(u32, Token)> {
    let mut address = 0u32;
    let mut octets = 0;
    let after = loop {
        address = (address << 8) | u32::from(read_octet(tokens, Direction::Front)?);
        octets += 1;

        let token = tokens.next(Direction::Front, Radix::Decimal);
        if octets == 4 || !token.is(TokenKind::Dot) {
            break token;
        }
    };
    Ok((address << (8 * (4 - octets)), after))
}

/// Reads exactly four dotted octets from the back.
pub(crate) fn read_octets_back(tokens: &mut Tokenizer<'_>) -> ParseResult<u32> {
    let mut address = 0u32;
    for i in 0..4 {
        if i > 0 && !tokens.next(Direction::Back, Radix::Decimal).is(TokenKind::Dot) {
            return Err(ParseError::UnexpectedToken);
        }
        address |= u32::from(read_octet(tokens, Direction::Back)?) << (8 * i);
    }
    Ok(address)
}

fn read_octet(tokens: &mut Tokenizer<'_>, direction: Direction) -> ParseResult<u8> {
    let token = tokens.next(direction, Radix::Decimal);
    if !token.is(TokenKind::Number) {
        return Err(ParseError::UnexpectedToken);
    }
    u8::try_from(token.value).map_err(|_| ParseError::OctetOutOfRange)
}

/// Validates a decimal mask token against the family width.
pub(crate) fn read_mask(token: Token, max: u8) -> ParseResult<u8> {
    if !token.is(TokenKind::Number) {
        return Err(ParseError::UnexpectedToken);
    }
    match u8::try_from(token.value) {
        Ok(mask) if mask <= max => Ok(mask),
        _ => Err(ParseError::MaskOutOfRange),
    }
}

fn expect_end(token: Token) -> ParseResult<()> {
    if token.is(TokenKind::End) {
        Ok(())
    } else {
        Err(ParseError::TrailingInput)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::string::ToString;
    use std::vec::Vec;

    fn net(text: &str) -> Ipv4Network {
        Ipv4Network::parse(text).unwrap()
    }

    fn addr(text: &str) -> Ipv4Address {
        Ipv4Address::parse(text).unwrap()
    }

    #[test]
    fn parse_network() {
        let n = net("192.120.12.99/24");
        assert_eq!(n.address(), addr("192.120.12.0"));
        assert_eq!(n.mask(), 24);

        assert_eq!(net("192/24").address(), Ipv4Address::from_octets([192, 0, 0, 0]));
        assert_eq!(net("255.255.255.255/20").address(), addr("255.255.240.0"));
        assert_eq!(net("192.168").address(), addr("192.168.0.0"));
        assert_eq!(net("192.168").mask(), 32);
        assert_eq!(net("0.0.0.0/0").mask(), 0);
    }

    #[test]
    fn reject_invalid() {
        for text in [
            "",
            "1922.168.1.0",
            "257.168.1.0",
            "192.168.1.2000",
            "192.168.1.0/",
            "192.168.1..0",
            "192.168.1..",
            "/111",
            "/33",
            "/256",
            "/ ",
            "192.168.1./4",
            "192.168.1.",
            "192.168..1",
            "192...",
            "192.",
            ".192",
            " 192",
            "192.168.1.0/33",
            "192.168.1.0/24/",
            "192.168.1.0/2.4",
            "192.168.1.0.5",
            "192.168.1.0 ",
        ] {
            assert!(Ipv4Network::try_parse(text).is_none(), "{text:?}");
        }
        assert_eq!(Ipv4Network::parse(""), Err(ParseError::Empty));
        assert_eq!(Ipv4Network::parse("257.0.0.0"), Err(ParseError::OctetOutOfRange));
        assert_eq!(Ipv4Network::parse("1.2.3.4/33"), Err(ParseError::MaskOutOfRange));
    }

    #[test]
    fn address_rejects_mask() {
        assert_eq!(Ipv4Address::parse("1.2.3.4/32"), Err(ParseError::TrailingInput));
        assert_eq!(addr("10.20"), Ipv4Address::new(0x0a14_0000));
    }

    #[test]
    fn derived_quantities() {
        // (mask, network, broadcast, size, hosts)
        let table: [(u8, &str, &str, u128, u32); 6] = [
            (0, "0.0.0.0", "255.255.255.255", 1 << 32, u32::MAX - 1),
            (23, "100.120.140.0", "100.120.141.255", 512, 510),
            (24, "100.120.140.0", "100.120.140.255", 256, 254),
            (30, "100.120.140.188", "100.120.140.191", 4, 2),
            (31, "100.120.140.188", "100.120.140.189", 2, 0),
            (32, "100.120.140.189", "100.120.140.189", 1, 1),
        ];
        for (mask, network, broadcast, size, hosts) in table {
            let n = Ipv4Network::new(addr("100.120.140.189"), mask).unwrap();
            assert_eq!(n.address(), addr(network), "/{mask}");
            assert_eq!(n.end_address(), addr(broadcast), "/{mask}");
            assert_eq!(n.size().get(), Some(size), "/{mask}");
            assert_eq!(n.host_count(), hosts, "/{mask}");
        }
    }

    #[test]
    fn masks() {
        let n = net("10.0.0.0/8");
        assert_eq!(n.netmask(), addr("255.0.0.0"));
        assert_eq!(n.wildcard(), addr("0.255.255.255"));
        assert_eq!(net("0/0").netmask(), Ipv4Address::MIN);
        assert_eq!(
            Ipv4Network::new(Ipv4Address::MAX, 33),
            Err(RangeError::MaskTooLong { mask: 33, max: 32 })
        );
    }

    #[test]
    fn from_range() {
        let n = Ipv4Network::from_range(addr("10.0.0.1"), addr("10.255.255.255"));
        assert_eq!(n, net("10.0.0.0/8"));
        let n = Ipv4Network::from_range(addr("192.168.1.7"), addr("192.168.1.7"));
        assert!(n.is_host());
    }

    #[test]
    fn containment() {
        let outer = net("192.168.0.0/16");
        let inner = net("192.168.10.0/24");
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&outer));
        assert!(outer.contains_or_equal(&outer));
        assert!(inner.is_contained_in(&outer));
        assert!(inner.is_contained_in_or_equal(&inner));
        assert!(outer.contains_address(addr("192.168.200.1")));
        assert!(!outer.contains_address(addr("192.169.0.0")));
        assert!(!net("192.169.0.0/24").is_contained_in(&outer));
    }

    #[test]
    fn supernets() {
        let s = Ipv4Network::make_supernet([net("192.168.0/24"), net("192.168.1/24")]);
        assert_eq!(s, Ok(net("192.168.0/23")));

        let s = Ipv4Network::make_supernet([net("192.168.0/24"), net("192.168.255/24")]);
        assert_eq!(s, Ok(net("192.168.0/16")));
        let s = Ipv4Network::make_supernet([net("192.168.255/24"), net("192.168.0/24")]);
        assert_eq!(s, Ok(net("192.168.0/16")));

        let six = [
            "192.168.98/24",
            "192.168.99/24",
            "192.168.100/24",
            "192.168.101/24",
            "192.168.104/24",
            "192.168.105/24",
        ];
        let s = Ipv4Network::make_supernet(six.iter().map(|text| net(text)));
        assert_eq!(s, Ok(net("192.168.96/20")));

        assert_eq!(Ipv4Network::make_supernet([net("10.0.0.0/8")]), Ok(net("10.0.0.0/8")));
        assert_eq!(
            Ipv4Network::supernet_of_addresses([addr("10.0.0.3"), addr("10.0.0.0")]),
            Ok(net("10.0.0.0/30"))
        );
        assert_eq!(
            Ipv4Network::make_supernet(Vec::<Ipv4Network>::new()),
            Err(RangeError::EmptyInput)
        );
    }

    #[test]
    fn split() {
        let subnets: Vec<_> = net("192.168.1.0/24").split(2).unwrap().collect();
        assert_eq!(
            subnets,
            [
                net("192.168.1.0/26"),
                net("192.168.1.64/26"),
                net("192.168.1.128/26"),
                net("192.168.1.192/26"),
            ]
        );

        assert_eq!(net("192.168.1.0/24").split(8).unwrap().count(), 256);
        assert!(net("192.168.1.0/24").split(9).is_err());
        assert!(net("0.0.0.0/0").split(33).is_err());
        assert_eq!(
            net("192.168.1.0/24").split(0).unwrap_err(),
            RangeError::SplitOutOfRange { mask: 24, increment: 0, max: 32 }
        );

        let mut all = net("0.0.0.0/0").split(32).unwrap();
        let first: Vec<_> = all.by_ref().take(5).collect();
        assert_eq!(first[4], net("0.0.0.4/32"));
        let top: Vec<_> = net("255.255.255.0/24").split(8).unwrap().skip(254).collect();
        assert_eq!(top, [net("255.255.255.254/32"), net("255.255.255.255/32")]);
    }

    #[test]
    fn display() {
        assert_eq!(net("192.168.10.1/24").to_string(), "192.168.10.0/24");
        assert_eq!(net("192.168.10.1").to_string(), "192.168.10.1/32");
        assert_eq!(format!("{:#}", net("192.168.10.1")), "192.168.10.1");
        assert_eq!(format!("{:#}", net("192.168.10.1/24")), "192.168.10.0/24");
    }

    #[test]
    fn prefix_strings() {
        assert_eq!(net("192.168.10.1/24").prefix_string().to_string(), "192.168.10/24");
        assert_eq!(net("192.168.10.1/32").prefix_string().to_string(), "192.168.10.1/32");
        assert_eq!(net("192.168.10/17").prefix_string().to_string(), "192.168.0/17");
        assert_eq!(net("192.168.10.1/16").prefix_string().to_string(), "192.168/16");
        assert_eq!(net("10.1.2.3/8").prefix_string().to_string(), "10/8");
    }

    #[test]
    fn bytes() {
        let a = addr("192.168.10.1");
        assert_eq!(a.to_bytes(), [192, 168, 10, 1]);
        assert_eq!(Ipv4Address::from_bytes(&[192, 168, 10, 1]), Ok(a));

        let mut buf = [0u8; 6];
        a.write_bytes(&mut buf, 2).unwrap();
        assert_eq!(buf, [0, 0, 192, 168, 10, 1]);
        assert_eq!(Ipv4Address::read_bytes(&buf, 2), Ok(a));
        assert_eq!(
            a.write_bytes(&mut buf, 3),
            Err(RangeError::BufferTooSmall { needed: 7, available: 6 })
        );
        assert!(Ipv4Address::read_bytes(&buf, 9).is_err());
    }

    #[test]
    fn unstable() {
        assert_eq!(Ipv4Network::parse_unstable("192.120.12.99/24"), Ok(net("192.120.12.0/24")));
        assert_eq!(Ipv4Network::parse_unstable("192.168"), Ok(net("192.168.0.0/32")));
        assert_eq!(Ipv4Network::parse_unstable("192/24"), Ok(net("192.0.0.0/24")));
        assert_eq!(Ipv4Network::parse_unstable("0000010.0.0.1"), Ok(net("10.0.0.1")));
        for text in [
            "", "192.168.1.0/", "192.168.1..0", "1.2.3.4.5", "256.0.0.0",
            "1.2.3.4/33", "1.2.3.4/2/4", "1.2.3.4/2.4", "a.b.c.d", " 192",
            "255.255.255.255/032",
        ] {
            assert!(Ipv4Network::parse_unstable(text).is_err(), "{text:?}");
        }
    }

    #[test]
    fn std_conversions() {
        let a = addr("10.1.2.3");
        let std: core::net::Ipv4Addr = a.into();
        assert_eq!(std, core::net::Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(Ipv4Address::from(std), a);
    }
}
