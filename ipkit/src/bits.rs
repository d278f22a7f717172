// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-width integers backing each address family.
//!
//! An address is held in a native unsigned integer whose most significant
//! bit is the first bit on the wire. Conversion to and from the wire goes
//! through [`zerocopy`]'s network-endian integers, so the host's own byte
//! order never leaks into the address value.

use core::fmt;
use core::hash::Hash;
use core::ops::{BitAnd, BitOr, BitXor, Not};
use zerocopy::byteorder::network_endian::{U128, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Number of leading zero bits in each possible byte.
static LEADING_ZEROS: [u8; 256] = leading_zero_table();

const fn leading_zero_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut zeros = 0;
        while zeros < 8 && (byte << zeros) & 0x80 == 0 {
            zeros += 1;
        }
        table[byte] = zeros as u8;
        byte += 1;
    }
    table
}

/// An unsigned integer wide enough to hold one address of a family.
///
/// Shifts by the full width are defined to produce zero, unlike the
/// native operators.
pub trait AddressBits:
    Copy
    + Default
    + Eq
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Display
    + fmt::LowerHex
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Width of the integer in bits.
    const BITS: u8;
    /// Width of the integer in bytes.
    const BYTES: usize = Self::BITS as usize / 8;
    const ZERO: Self;
    const ONE: Self;
    /// All bits set.
    const ONES: Self;

    /// The network-order representation of this integer.
    type Wire: FromBytes
        + IntoBytes
        + Immutable
        + KnownLayout
        + Unaligned
        + Copy;

    fn to_wire(self) -> Self::Wire;

    fn from_wire(wire: Self::Wire) -> Self;

    /// Left shift, yielding zero once `n` reaches the width.
    fn shl(self, n: u8) -> Self;

    /// Right shift, yielding zero once `n` reaches the width.
    fn shr(self, n: u8) -> Self;

    fn wrapping_add(self, rhs: Self) -> Self;

    fn wrapping_sub(self, rhs: Self) -> Self;

    /// The value with the top `len` bits set and all others clear.
    ///
    /// `len` values past the width saturate to [`Self::ONES`].
    #[inline]
    fn prefix_mask(len: u8) -> Self {
        if len == 0 {
            Self::ZERO
        } else {
            Self::ONES.shl(Self::BITS.saturating_sub(len))
        }
    }

    /// Number of leading bits in which `self` and `other` agree.
    ///
    /// Walks the differing bits a byte at a time, most significant
    /// first, through a precomputed leading-zero table.
    fn common_prefix_len(self, other: Self) -> u8 {
        let diff = (self ^ other).to_wire();
        let mut len = 0;
        for byte in diff.as_bytes() {
            let zeros = LEADING_ZEROS[usize::from(*byte)];
            len += zeros;
            if zeros < 8 {
                break;
            }
        }
        len
    }
}

macro_rules! address_bits {
    ($int:ty, $wire:ty) => {
        impl AddressBits for $int {
            const BITS: u8 = <$int>::BITS as u8;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const ONES: Self = <$int>::MAX;

            type Wire = $wire;

            #[inline]
            fn to_wire(self) -> Self::Wire {
                <$wire>::new(self)
            }

            #[inline]
            fn from_wire(wire: Self::Wire) -> Self {
                wire.get()
            }

            #[inline]
            fn shl(self, n: u8) -> Self {
                self.checked_shl(u32::from(n)).unwrap_or(0)
            }

            #[inline]
            fn shr(self, n: u8) -> Self {
                self.checked_shr(u32::from(n)).unwrap_or(0)
            }

            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$int>::wrapping_add(self, rhs)
            }

            #[inline]
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$int>::wrapping_sub(self, rhs)
            }
        }
    };
}

address_bits!(u32, U32);
address_bits!(u128, U128);

/// The number of addresses in a network: an exact power of two.
///
/// Held as the exponent so that the full IPv6 space (`2^128`) still
/// has a value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AddressCount {
    log2: u8,
}

impl AddressCount {
    /// A count of `2^log2` addresses.
    ///
    /// Exponents past 128 are clamped to 128.
    #[inline]
    pub const fn from_log2(log2: u8) -> Self {
        Self { log2: if log2 > 128 { 128 } else { log2 } }
    }

    #[inline]
    pub const fn log2(self) -> u8 {
        self.log2
    }

    /// The count as an integer, or `None` if it is `2^128`.
    #[inline]
    pub const fn get(self) -> Option<u128> {
        1u128.checked_shl(self.log2 as u32)
    }
}

impl fmt::Display for AddressCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(count) => write!(f, "{count}"),
            // 2^128 is u128::MAX + 1, and u128::MAX ends in a 5.
            None => write!(f, "{}{}", u128::MAX / 10, u128::MAX % 10 + 1),
        }
    }
}
