// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Errors returned by parsing and network arithmetic.

use thiserror::Error;

/// Convenience type for fallible parsing of address and network text.
pub type ParseResult<T> = Result<T, ParseError>;

/// Text which does not match the address or network grammar.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum ParseError {
    /// The input was empty.
    #[error("empty input")]
    Empty,
    /// A token appeared where the grammar does not allow it.
    #[error("unexpected token")]
    UnexpectedToken,
    /// An IPv4 octet was greater than 255.
    #[error("octet out of range")]
    OctetOutOfRange,
    /// An IPv6 group did not fit in 16 bits.
    #[error("group out of range")]
    GroupOutOfRange,
    /// The prefix length exceeded the width of the address family.
    #[error("prefix length out of range")]
    MaskOutOfRange,
    /// More IPv6 groups were given than the address can hold.
    #[error("too many groups")]
    TooManyGroups,
    /// An uncompressed IPv6 address had fewer than eight groups.
    #[error("too few groups")]
    TooFewGroups,
    /// More than one `::` appeared in an IPv6 address.
    #[error("more than one `::`")]
    DoubleCompression,
    /// An embedded IPv4 tail was not preceded by `::ffff:`.
    #[error("embedded IPv4 address is not IPv4-mapped")]
    NotMapped,
    /// Input remained after a complete address or network.
    #[error("trailing input")]
    TrailingInput,
}

/// A value which violates an arithmetic precondition.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum RangeError {
    /// A prefix length was wider than the address family.
    #[error("prefix length {mask} exceeds {max}")]
    MaskTooLong { mask: u8, max: u8 },
    /// A split increment was zero, or would extend the prefix past the
    /// width of the address family.
    #[error("cannot split a /{mask} by {increment} bits (maximum /{max})")]
    SplitOutOfRange { mask: u8, increment: u8, max: u8 },
    /// An aggregate was requested over no networks.
    #[error("input was empty")]
    EmptyInput,
    /// A byte buffer was too short for the address.
    #[error("buffer holds {available} bytes, {needed} needed")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Any error from this crate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Range(#[from] RangeError),
    /// A family-erased operation was given one IPv4 and one IPv6 operand.
    #[error("operands belong to different address families")]
    FamilyMismatch,
}
