// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CIDR networks and the algebra over them.
//!
//! [`Network`] is generic over the address family. The stored address
//! always has every bit past the prefix cleared, whichever constructor
//! produced it.

use crate::bits::{AddressBits, AddressCount};
use crate::error::RangeError;
use core::fmt;
use core::hash::Hash;
use core::iter::FusedIterator;
use zerocopy::{FromBytes, IntoBytes};

/// A host address of one family.
pub trait Address:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The integer holding the address.
    type Bits: AddressBits;

    /// Width of the address in bits.
    const BITS: u8 = <Self::Bits as AddressBits>::BITS;

    fn from_bits(bits: Self::Bits) -> Self;

    fn to_bits(self) -> Self::Bits;

    /// Reads an address in network byte order from `buf` at `offset`.
    fn read_bytes(buf: &[u8], offset: usize) -> Result<Self, RangeError> {
        let too_small = RangeError::BufferTooSmall {
            needed: offset.saturating_add(Self::Bits::BYTES),
            available: buf.len(),
        };
        let src = buf.get(offset..).ok_or(too_small)?;
        let (wire, _) =
            <Self::Bits as AddressBits>::Wire::read_from_prefix(src)
                .map_err(|_| too_small)?;
        Ok(Self::from_bits(Self::Bits::from_wire(wire)))
    }

    /// Writes the address in network byte order into `buf` at `offset`.
    fn write_bytes(
        self,
        buf: &mut [u8],
        offset: usize,
    ) -> Result<(), RangeError> {
        let too_small = RangeError::BufferTooSmall {
            needed: offset.saturating_add(Self::Bits::BYTES),
            available: buf.len(),
        };
        let dst = buf.get_mut(offset..).ok_or(too_small)?;
        self.to_bits().to_wire().write_to_prefix(dst).map_err(|_| too_small)
    }
}

/// An address and prefix length.
///
/// Networks order by address, then by prefix length.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Network<A> {
    address: A,
    mask: u8,
}

impl<A: Address> Network<A> {
    /// Builds a network from any address within it.
    ///
    /// Fails if `mask` is wider than the address family.
    pub fn new(address: A, mask: u8) -> Result<Self, RangeError> {
        if mask > A::BITS {
            return Err(RangeError::MaskTooLong { mask, max: A::BITS });
        }
        Ok(Self::truncated(address, mask))
    }

    /// Builds a network from the raw integer of any address within it.
    pub fn from_bits(bits: A::Bits, mask: u8) -> Result<Self, RangeError> {
        Self::new(A::from_bits(bits), mask)
    }

    /// A network holding exactly one address.
    #[inline]
    pub fn host(address: A) -> Self {
        Self { address, mask: A::BITS }
    }

    /// The smallest network whose prefix is shared by `first` and `last`.
    pub fn from_range(first: A, last: A) -> Self {
        let mask = first.to_bits().common_prefix_len(last.to_bits());
        Self::truncated(first, mask)
    }

    /// Caller guarantees `mask <= A::BITS`.
    #[inline]
    pub(crate) fn truncated(address: A, mask: u8) -> Self {
        let bits = address.to_bits() & A::Bits::prefix_mask(mask);
        Self { address: A::from_bits(bits), mask }
    }

    /// The first address of the network.
    #[inline]
    pub fn address(&self) -> A {
        self.address
    }

    /// The prefix length.
    #[inline]
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// `mask` leading one bits.
    #[inline]
    pub fn netmask(&self) -> A {
        A::from_bits(A::Bits::prefix_mask(self.mask))
    }

    /// The complement of [`Self::netmask`].
    #[inline]
    pub fn wildcard(&self) -> A {
        A::from_bits(!A::Bits::prefix_mask(self.mask))
    }

    /// The last address of the network. For IPv4 this is the broadcast
    /// address.
    #[inline]
    pub fn end_address(&self) -> A {
        A::from_bits(self.address.to_bits() | self.wildcard().to_bits())
    }

    /// Number of addresses in the network.
    #[inline]
    pub fn size(&self) -> AddressCount {
        AddressCount::from_log2(A::BITS - self.mask)
    }

    /// Number of usable host addresses: the size less the network and
    /// broadcast addresses, except that a host route has one.
    pub fn host_count(&self) -> A::Bits {
        if self.mask == A::BITS {
            A::Bits::ONE
        } else {
            self.wildcard().to_bits().wrapping_sub(A::Bits::ONE)
        }
    }

    #[inline]
    pub fn is_host(&self) -> bool {
        self.mask == A::BITS
    }

    /// Whether `other` lies within this network and is strictly smaller.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.mask < other.mask && self.covers(other)
    }

    /// Whether `other` lies within this network or is equal to it.
    #[inline]
    pub fn contains_or_equal(&self, other: &Self) -> bool {
        self.mask <= other.mask && self.covers(other)
    }

    #[inline]
    pub fn contains_address(&self, address: A) -> bool {
        address.to_bits() & A::Bits::prefix_mask(self.mask)
            == self.address.to_bits()
    }

    #[inline]
    pub fn is_contained_in(&self, other: &Self) -> bool {
        other.contains(self)
    }

    #[inline]
    pub fn is_contained_in_or_equal(&self, other: &Self) -> bool {
        other.contains_or_equal(self)
    }

    fn covers(&self, other: &Self) -> bool {
        self.contains_address(other.address)
    }

    /// The smallest network containing every network in `networks`.
    ///
    /// The result does not depend on the order of the input.
    pub fn make_supernet<I>(networks: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut networks = networks.into_iter();
        let first = networks.next().ok_or(RangeError::EmptyInput)?;

        // Every bit within the common prefix survives the AND, so
        // comparing the accumulator against each new address finds where
        // that address leaves the prefix.
        let mut acc = first.address.to_bits();
        let mut shortest = first.mask;
        for network in networks {
            let bits = network.address.to_bits();
            shortest = shortest.min(network.mask).min(acc.common_prefix_len(bits));
            acc = acc & bits;
        }

        let supernet = Self::truncated(A::from_bits(acc), shortest);
        log::trace!("computed supernet {:?}", supernet);
        Ok(supernet)
    }

    /// The smallest network containing every address in `addresses`.
    pub fn supernet_of_addresses<I>(addresses: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = A>,
    {
        Self::make_supernet(addresses.into_iter().map(Self::host))
    }

    /// Splits the network into `2^increment` networks, `increment` bits
    /// longer, in ascending order.
    ///
    /// Fails if `increment` is zero or the new prefix would be wider than
    /// the address family.
    pub fn split(&self, increment: u8) -> Result<Subnets<A>, RangeError> {
        let out_of_range = RangeError::SplitOutOfRange {
            mask: self.mask,
            increment,
            max: A::BITS,
        };
        let mask = self
            .mask
            .checked_add(increment)
            .filter(|&mask| increment > 0 && mask <= A::BITS)
            .ok_or(out_of_range)?;

        let step = A::Bits::ONE.shl(A::BITS - mask);
        let last = self.end_address().to_bits() & A::Bits::prefix_mask(mask);
        Ok(Subnets {
            next: Some(self.address.to_bits()),
            last,
            step,
            mask,
        })
    }
}

impl<A: Address> From<A> for Network<A> {
    #[inline]
    fn from(address: A) -> Self {
        Self::host(address)
    }
}

impl<A: Address> fmt::Debug for Network<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.mask)
    }
}

impl<A: Address> fmt::Display for Network<A> {
    /// `address/mask`. The alternate form `{:#}` leaves out the mask of a
    /// host route.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() && self.is_host() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{}/{}", self.address, self.mask)
        }
    }
}

/// The networks produced by [`Network::split`].
///
/// Each network is derived from the previous one as it is requested.
#[derive(Clone, Debug)]
pub struct Subnets<A: Address> {
    next: Option<A::Bits>,
    last: A::Bits,
    step: A::Bits,
    mask: u8,
}

impl<A: Address> Iterator for Subnets<A> {
    type Item = Network<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        // Stopping on the last network rather than on overflow keeps the
        // top of the address space reachable.
        self.next = if current == self.last {
            None
        } else {
            Some(current.wrapping_add(self.step))
        };
        Some(Network { address: A::from_bits(current), mask: self.mask })
    }
}

impl<A: Address> FusedIterator for Subnets<A> {}
