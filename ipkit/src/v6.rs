// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IPv6 addresses and networks.
//!
//! Text is resolved from both ends. A `/mask` suffix and an embedded
//! IPv4 tail are recognised from the back first. The groups are then
//! read from the front up to any `::`, and whatever follows the `::` is
//! read from the back into the last slots.

use crate::error::{ParseError, ParseResult, RangeError};
use crate::network::{Address, Network};
use crate::token::{Direction, Radix, Token, TokenKind, Tokenizer};
use crate::v4::{self, Ipv4Address};
use core::fmt;
use core::str::FromStr;

/// An IPv6 address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ipv6Address(u128);

/// An IPv6 network.
pub type Ipv6Network = Network<Ipv6Address>;

impl Ipv6Address {
    /// `::`
    pub const MIN: Self = Self(0);
    /// `ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff`
    pub const MAX: Self = Self(u128::MAX);
    pub const UNSPECIFIED: Self = Self::MIN;
    pub const LOCALHOST: Self = Self(1);

    #[inline]
    pub const fn new(bits: u128) -> Self {
        Self(bits)
    }

    /// Builds an address from the first and last 64 transmitted bits.
    #[inline]
    pub const fn from_halves(high: u64, low: u64) -> Self {
        Self(((high as u128) << 64) | low as u128)
    }

    #[inline]
    pub const fn from_octets(octets: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(octets))
    }

    pub const fn from_segments(segments: [u16; 8]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < 8 {
            bits = (bits << 16) | segments[i] as u128;
            i += 1;
        }
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u128 {
        self.0
    }

    /// The first 64 transmitted bits.
    #[inline]
    pub const fn high(self) -> u64 {
        (self.0 >> 64) as u64
    }

    /// The last 64 transmitted bits.
    #[inline]
    pub const fn low(self) -> u64 {
        self.0 as u64
    }

    #[inline]
    pub const fn octets(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    pub const fn segments(self) -> [u16; 8] {
        let mut segments = [0u16; 8];
        let mut i = 0;
        while i < 8 {
            segments[i] = (self.0 >> (112 - 16 * i)) as u16;
            i += 1;
        }
        segments
    }

    /// The address in network byte order.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.octets()
    }

    /// Reads sixteen bytes in network byte order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RangeError> {
        Self::read_bytes(bytes, 0)
    }

    /// The embedded address, if this is an IPv4-mapped address.
    pub const fn to_ipv4_mapped(self) -> Option<Ipv4Address> {
        if self.0 >> 32 == 0xffff {
            Some(Ipv4Address::new(self.0 as u32))
        } else {
            None
        }
    }

    /// The sixteen bytes as dotted decimal.
    #[inline]
    pub fn decimal_dotted(self) -> DecimalDotted {
        DecimalDotted(self)
    }

    /// Parses an address. A `/mask` is not accepted.
    pub fn parse(text: &str) -> ParseResult<Self> {
        Self::parse_ascii(text.as_bytes())
    }

    pub fn parse_ascii(text: &[u8]) -> ParseResult<Self> {
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        read_address(&mut Tokenizer::new(text)).map(Self)
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }
}

impl Address for Ipv6Address {
    type Bits = u128;

    #[inline]
    fn from_bits(bits: u128) -> Self {
        Self(bits)
    }

    #[inline]
    fn to_bits(self) -> u128 {
        self.0
    }
}

/// Start and length of the first longest run of zero groups.
fn longest_zero_run(segments: &[u16; 8]) -> (usize, usize) {
    let mut best = (0, 0);
    let mut run = (0, 0);
    for (i, &segment) in segments.iter().enumerate() {
        if segment != 0 {
            run.1 = 0;
            continue;
        }
        if run.1 == 0 {
            run.0 = i;
        }
        run.1 += 1;
        if run.1 > best.1 {
            best = run;
        }
    }
    best
}

fn write_groups(f: &mut fmt::Formatter<'_>, groups: &[u16]) -> fmt::Result {
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            f.write_str(":")?;
        }
        write!(f, "{group:x}")?;
    }
    Ok(())
}

/// Whether the address is `::ffff:a.b.c.d` with a nonzero `a.b`, the
/// form written with a dotted tail.
fn has_dotted_tail(segments: &[u16; 8]) -> bool {
    segments[..5].iter().all(|&s| s == 0) && segments[5] == 0xffff && segments[6] != 0
}

impl fmt::Display for Ipv6Address {
    /// Lowercase hex groups, with the longest run of two or more zero
    /// groups written as `::` (RFC 5952). IPv4-mapped addresses end in
    /// dotted decimal, unless the upper half of the IPv4 part is zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segments = self.segments();
        if has_dotted_tail(&segments) {
            return write!(f, "::ffff:{}", Ipv4Address::new(self.0 as u32));
        }
        match longest_zero_run(&segments) {
            (start, len) if len >= 2 => {
                write_groups(f, &segments[..start])?;
                f.write_str("::")?;
                write_groups(f, &segments[start + len..])
            }
            _ => write_groups(f, &segments),
        }
    }
}

impl fmt::Debug for Ipv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Ipv6Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u128> for Ipv6Address {
    #[inline]
    fn from(bits: u128) -> Self {
        Self(bits)
    }
}

impl From<Ipv6Address> for u128 {
    #[inline]
    fn from(address: Ipv6Address) -> Self {
        address.0
    }
}

impl From<[u8; 16]> for Ipv6Address {
    #[inline]
    fn from(octets: [u8; 16]) -> Self {
        Self::from_octets(octets)
    }
}

impl From<[u16; 8]> for Ipv6Address {
    #[inline]
    fn from(segments: [u16; 8]) -> Self {
        Self::from_segments(segments)
    }
}

impl From<core::net::Ipv6Addr> for Ipv6Address {
    #[inline]
    fn from(ip6: core::net::Ipv6Addr) -> Self {
        Self(ip6.to_bits())
    }
}

impl From<Ipv6Address> for core::net::Ipv6Addr {
    #[inline]
    fn from(ip6: Ipv6Address) -> Self {
        Self::from_bits(ip6.0)
    }
}

/// Displays an [`Ipv6Address`] or [`Ipv6Network`] byte by byte in
/// decimal, such as `32.1.13.184.0.0.0.0.0.0.0.0.0.0.0.1`.
#[derive(Clone, Copy, Debug)]
pub struct DecimalDotted(Ipv6Address);

impl fmt::Display for DecimalDotted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.octets().iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{byte}")?;
        }
        Ok(())
    }
}

impl Network<Ipv6Address> {
    /// Parses an address with an optional `/mask`.
    pub fn parse(text: &str) -> ParseResult<Self> {
        Self::parse_ascii(text.as_bytes())
    }

    pub fn parse_ascii(text: &[u8]) -> ParseResult<Self> {
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut tokens = Tokenizer::new(text);
        let mask = read_mask_suffix(&mut tokens)?;
        let address = read_address(&mut tokens)?;
        Ok(Self::truncated(Ipv6Address(address), mask))
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Parses a network by splitting the bytes directly.
    ///
    /// Intended for input whose shape is already known to be sound. It
    /// still rejects bad digits, bad group counts, repeated `::` and out
    /// of range masks, but an embedded IPv4 tail is taken as the last 32
    /// bits without checking the groups before it, so `::1.2.3.4` and
    /// `64:ff9b::1.2.3.4` are accepted here and rejected by
    /// [`Self::parse`].
    pub fn parse_unstable(text: &str) -> ParseResult<Self> {
        let text = text.as_bytes();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }

        let (body, mask) = match text.iter().rposition(|&c| c == b'/') {
            Some(i) => (&text[..i], parse_decimal_mask(&text[i + 1..], 128)?),
            None => (text, 128),
        };

        let mut segments = [0u16; 8];
        let mut groups = body;
        let mut slots = 8;
        if let Some(colon) = body.iter().rposition(|&c| c == b':') {
            let tail = &body[colon + 1..];
            if tail.contains(&b'.') {
                let v4 = Ipv4Address::parse_ascii(tail)?.bits();
                segments[6] = (v4 >> 16) as u16;
                segments[7] = v4 as u16;
                slots = 6;
                // Keep the colon when it is the second half of a `::`.
                groups = match body[..colon].last() {
                    Some(b':') => &body[..=colon],
                    _ => &body[..colon],
                };
            }
        }

        let compressed = groups.windows(2).position(|w| w == b"::");
        match compressed {
            None => {
                if split_groups(groups, &mut segments[..slots])? != slots {
                    return Err(ParseError::TooFewGroups);
                }
            }
            Some(i) => {
                let front = split_groups(&groups[..i], &mut segments[..slots])?;
                if front >= slots {
                    return Err(ParseError::TooManyGroups);
                }
                let mut back = [0u16; 8];
                let room = slots - front - 1;
                let count = split_groups(&groups[i + 2..], &mut back[..room])?;
                segments[slots - count..slots].copy_from_slice(&back[..count]);
            }
        }

        Ok(Self::truncated(Ipv6Address::from_segments(segments), mask))
    }

    /// The network address as dotted decimal bytes, followed by the mask.
    #[inline]
    pub fn decimal_dotted(&self) -> DecimalDottedNetwork {
        DecimalDottedNetwork(*self)
    }
}

impl FromStr for Network<Ipv6Address> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Displays an [`Ipv6Network`] as `decimal-dotted/mask`.
#[derive(Clone, Copy, Debug)]
pub struct DecimalDottedNetwork(Ipv6Network);

impl fmt::Display for DecimalDottedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0.address().decimal_dotted(), self.0.mask())
    }
}

/// Splits `text` on single colons into `slots`, returning the count.
/// Empty text has no groups.
fn split_groups(text: &[u8], slots: &mut [u16]) -> ParseResult<usize> {
    if text.is_empty() {
        return Ok(0);
    }
    let mut count = 0;
    for group in text.split(|&c| c == b':') {
        let slot = slots.get_mut(count).ok_or(ParseError::TooManyGroups)?;
        *slot = parse_hex_group(group)?;
        count += 1;
    }
    Ok(count)
}

fn parse_hex_group(group: &[u8]) -> ParseResult<u16> {
    if group.is_empty() {
        return Err(ParseError::UnexpectedToken);
    }
    if group.len() > 4 {
        return Err(ParseError::GroupOutOfRange);
    }
    group.iter().try_fold(0u16, |acc, &c| {
        let digit = (c as char).to_digit(16).ok_or(ParseError::UnexpectedToken)?;
        Ok((acc << 4) | digit as u16)
    })
}

fn parse_decimal_mask(text: &[u8], max: u8) -> ParseResult<u8> {
    if text.is_empty() || text.len() > 3 {
        return Err(ParseError::MaskOutOfRange);
    }
    let mut mask = 0u16;
    for &c in text {
        if !c.is_ascii_digit() {
            return Err(ParseError::UnexpectedToken);
        }
        mask = mask * 10 + u16::from(c - b'0');
    }
    match u8::try_from(mask) {
        Ok(mask) if mask <= max => Ok(mask),
        _ => Err(ParseError::MaskOutOfRange),
    }
}

/// Strips a trailing `/mask` if there is one, returning the mask or 128.
fn read_mask_suffix(tokens: &mut Tokenizer<'_>) -> ParseResult<u8> {
    let number = tokens.peek(Direction::Back, Radix::Decimal);
    if number.is(TokenKind::Number)
        && tokens.peek(Direction::Back, Radix::Decimal).is(TokenKind::Slash)
    {
        let mask = v4::read_mask(number, 128)?;
        tokens.adopt_peek();
        return Ok(mask);
    }
    tokens.reset_peek();
    Ok(128)
}

/// Reads the whole remaining input as an address.
fn read_address(tokens: &mut Tokenizer<'_>) -> ParseResult<u128> {
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    if has_ipv4_tail(tokens) {
        return read_mapped(tokens);
    }
    let mut segments = [0u16; 8];
    read_groups(tokens, &mut segments)?;
    Ok(Ipv6Address::from_segments(segments).0)
}

fn has_ipv4_tail(tokens: &mut Tokenizer<'_>) -> bool {
    let tail = tokens.peek(Direction::Back, Radix::Decimal).is(TokenKind::Number)
        && tokens.peek(Direction::Back, Radix::Decimal).is(TokenKind::Dot);
    tokens.reset_peek();
    tail
}

/// Reads `<zero groups>:ffff:a.b.c.d` from the back.
fn read_mapped(tokens: &mut Tokenizer<'_>) -> ParseResult<u128> {
    let v4 = v4::read_octets_back(tokens)?;
    match tokens.next(Direction::Back, Radix::Hexadecimal).kind {
        TokenKind::Colon => {}
        // `::a.b.c.d`, the deprecated IPv4-compatible form.
        TokenKind::DoubleColon => return Err(ParseError::NotMapped),
        _ => return Err(ParseError::UnexpectedToken),
    }
    if tokens.next(Direction::Back, Radix::Hexadecimal) != Token::number(0xffff) {
        return Err(ParseError::NotMapped);
    }

    // The five groups ahead of `ffff` must all be zero.
    let mut head = [0u16; 5];
    match tokens.next(Direction::Back, Radix::Hexadecimal).kind {
        // The `::` covers at least one of the five.
        TokenKind::DoubleColon => read_tail(tokens, &mut head[1..])?,
        TokenKind::Colon => read_groups(tokens, &mut head)?,
        _ => return Err(ParseError::UnexpectedToken),
    }
    if head.iter().any(|&group| group != 0) {
        return Err(ParseError::NotMapped);
    }

    Ok(Ipv4Address::new(v4).to_ipv6_mapped().0)
}

/// Reads hextets into every slot of `slots`, expanding at most one `::`.
///
/// Groups before the `::` are read from the front, and groups after it
/// from the back into the last slots. A `::` stands for at least one
/// group, and the input must be consumed entirely.
fn read_groups(tokens: &mut Tokenizer<'_>, slots: &mut [u16]) -> ParseResult<()> {
    let mut front = 0;
    let mut token = tokens.next(Direction::Front, Radix::Hexadecimal);
    if !token.is(TokenKind::DoubleColon) {
        loop {
            slots[front] = hextet(token)?;
            front += 1;
            match tokens.next(Direction::Front, Radix::Hexadecimal).kind {
                TokenKind::End if front == slots.len() => return Ok(()),
                TokenKind::End => return Err(ParseError::TooFewGroups),
                TokenKind::DoubleColon => break,
                TokenKind::Colon if front < slots.len() => {}
                TokenKind::Colon => return Err(ParseError::TooManyGroups),
                _ => return Err(ParseError::UnexpectedToken),
            }
            token = tokens.next(Direction::Front, Radix::Hexadecimal);
        }
    }

    if front >= slots.len() {
        return Err(ParseError::TooManyGroups);
    }
    read_tail(tokens, &mut slots[front + 1..])
}

/// Reads colon separated hextets from the back into the end of `slots`.
///
/// There may be fewer groups than slots, or none at all.
fn read_tail(tokens: &mut Tokenizer<'_>, slots: &mut [u16]) -> ParseResult<()> {
    if tokens.is_empty() {
        return Ok(());
    }
    let mut filled = 0;
    loop {
        if filled == slots.len() {
            return Err(ParseError::TooManyGroups);
        }
        let token = tokens.next(Direction::Back, Radix::Hexadecimal);
        slots[slots.len() - 1 - filled] = hextet(token)?;
        filled += 1;
        match tokens.next(Direction::Back, Radix::Hexadecimal).kind {
            TokenKind::End => return Ok(()),
            TokenKind::Colon => {}
            TokenKind::DoubleColon => return Err(ParseError::DoubleCompression),
            _ => return Err(ParseError::UnexpectedToken),
        }
    }
}

fn hextet(token: Token) -> ParseResult<u16> {
    if token.is(TokenKind::Number) {
        Ok(token.value)
    } else {
        Err(ParseError::UnexpectedToken)
    }
}
