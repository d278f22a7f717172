// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Longest-prefix-match maps from networks to values.

use crate::network::{Address, Network};
use crate::v4::Ipv4Address;
use crate::v6::Ipv6Address;
use alloc::collections::btree_map::{self, BTreeMap};
use core::fmt;

/// Values keyed by network, queried by longest prefix match.
///
/// Keys compare by exact address and prefix length, so `10.0.0.0/8` and
/// `10.0.0.0/16` are separate entries. Lookups borrow the set shared and
/// mutation borrows it unique, so concurrent readers need no locking.
#[derive(Clone, PartialEq, Eq)]
pub struct IpSet<A, V> {
    entries: BTreeMap<Network<A>, V>,
}

pub type Ipv4Set<V> = IpSet<Ipv4Address, V>;
pub type Ipv6Set<V> = IpSet<Ipv6Address, V>;

impl<A: Address, V: fmt::Debug> fmt::Debug for IpSet<A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<A: Address, V> Default for IpSet<A, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Address, V> IpSet<A, V> {
    pub const fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `value` for `network`, returning any value it replaced.
    pub fn insert(&mut self, network: Network<A>, value: V) -> Option<V> {
        let old = self.entries.insert(network, value);
        if old.is_some() {
            log::trace!("replaced value for {:?}", network);
        }
        old
    }

    /// The value stored for exactly `network`.
    #[inline]
    pub fn get(&self, network: &Network<A>) -> Option<&V> {
        self.entries.get(network)
    }

    #[inline]
    pub fn get_mut(&mut self, network: &Network<A>) -> Option<&mut V> {
        self.entries.get_mut(network)
    }

    /// The most specific stored network which contains or equals
    /// `network`, with its value.
    pub fn longest_match(&self, network: &Network<A>) -> Option<(Network<A>, &V)> {
        (0..=network.mask()).rev().find_map(|mask| {
            let candidate = Network::truncated(network.address(), mask);
            self.entries.get(&candidate).map(|value| (candidate, value))
        })
    }

    /// The most specific stored network containing `address`.
    #[inline]
    pub fn longest_match_address(&self, address: A) -> Option<(Network<A>, &V)> {
        self.longest_match(&Network::host(address))
    }

    /// Removes the entry for exactly `network`.
    pub fn remove(&mut self, network: &Network<A>) -> Option<V> {
        let value = self.entries.remove(network);
        if value.is_some() {
            log::trace!("removed {:?}", network);
        }
        value
    }

    /// Removes every entry which `network` contains or equals, returning
    /// how many were removed.
    pub fn remove_within(&mut self, network: &Network<A>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !network.contains_or_equal(key));
        let removed = before - self.entries.len();
        log::trace!("removed {} entries within {:?}", removed, network);
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in ascending network order.
    pub fn iter(&self) -> btree_map::Iter<'_, Network<A>, V> {
        self.entries.iter()
    }

    pub fn networks(&self) -> btree_map::Keys<'_, Network<A>, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, Network<A>, V> {
        self.entries.values()
    }
}

impl<A: Address, V> FromIterator<(Network<A>, V)> for IpSet<A, V> {
    fn from_iter<I: IntoIterator<Item = (Network<A>, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<A: Address, V> Extend<(Network<A>, V)> for IpSet<A, V> {
    fn extend<I: IntoIterator<Item = (Network<A>, V)>>(&mut self, iter: I) {
        for (network, value) in iter {
            self.insert(network, value);
        }
    }
}

impl<'a, A: Address, V> IntoIterator for &'a IpSet<A, V> {
    type Item = (&'a Network<A>, &'a V);
    type IntoIter = btree_map::Iter<'a, Network<A>, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<A: Address, V> IntoIterator for IpSet<A, V> {
    type Item = (Network<A>, V);
    type IntoIter = btree_map::IntoIter<Network<A>, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::v4::Ipv4Network;
    use crate::v6::Ipv6Network;
    use std::vec::Vec;

    fn v4(text: &str) -> Ipv4Network {
        text.parse().unwrap()
    }

    #[test]
    fn generic_lookup() {
        let mut set = Ipv4Set::new();
        set.insert(v4("10.0.0.0/8"), "C");
        set.insert(v4("10.10.0.0/16"), "B");
        set.insert(v4("10.10.10.0/24"), "A");
        set.insert(v4("192.168.0.0/16"), "D");

        let lookup = |text: &str| set.longest_match(&v4(text)).map(|(_, v)| *v);
        assert_eq!(lookup("10.11.22.33"), Some("C"));
        assert_eq!(lookup("10.10.22.33"), Some("B"));
        assert_eq!(lookup("10.10.10.33"), Some("A"));
        assert_eq!(lookup("10.10.10.0/24"), Some("A"));
        assert_eq!(lookup("10.10.0.0/15"), Some("C"));
        assert_eq!(lookup("192.168.1.1"), Some("D"));
        assert_eq!(lookup("11.0.0.0"), None);
        assert_eq!(lookup("0.0.0.0/0"), None);

        let (network, _) = set.longest_match_address("10.10.10.10".parse().unwrap()).unwrap();
        assert_eq!(network, v4("10.10.10.0/24"));
    }

    #[test]
    fn default_route() {
        let mut set = Ipv6Set::new();
        set.insert(Ipv6Network::parse("::/0").unwrap(), 0);
        set.insert(Ipv6Network::parse("2001:db8::/32").unwrap(), 1);
        let a = Ipv6Network::parse("2001:db8::1").unwrap();
        let b = Ipv6Network::parse("fe80::1").unwrap();
        assert_eq!(set.longest_match(&a).map(|(_, v)| *v), Some(1));
        assert_eq!(set.longest_match(&b).map(|(_, v)| *v), Some(0));
    }

    #[test]
    fn overwrite_and_remove() {
        let mut set = Ipv4Set::new();
        assert_eq!(set.insert(v4("10.0.0.0/8"), 1), None);
        assert_eq!(set.insert(v4("10.0.0.0/8"), 2), Some(1));
        assert_eq!(set.insert(v4("10.0.0.0/16"), 3), None);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&v4("10.0.0.0/8")), Some(&2));

        assert_eq!(set.remove(&v4("10.0.0.0/9")), None);
        assert_eq!(set.remove(&v4("10.0.0.0/8")), Some(2));
        assert_eq!(set.len(), 1);
        assert_eq!(set.longest_match(&v4("10.0.1.1")).map(|(_, v)| *v), Some(3));
        assert_eq!(set.longest_match(&v4("10.1.0.0")), None);
    }

    #[test]
    fn remove_within() {
        let mut set: Ipv4Set<()> = [
            "10.0.0.0/8",
            "10.1.0.0/16",
            "10.1.2.0/24",
            "10.2.0.0/16",
            "11.0.0.0/8",
        ]
        .iter()
        .map(|text| (v4(text), ()))
        .collect();

        assert_eq!(set.remove_within(&v4("10.1.0.0/16")), 2);
        let left: Vec<_> = set.networks().copied().collect();
        assert_eq!(left, [v4("10.0.0.0/8"), v4("10.2.0.0/16"), v4("11.0.0.0/8")]);
        assert_eq!(set.remove_within(&v4("0.0.0.0/0")), 3);
        assert!(set.is_empty());
    }

    #[test]
    fn debug_lists_entries() {
        let mut set = Ipv4Set::new();
        assert_eq!(format!("{set:?}"), "{}");
        set.insert(v4("10.0.0.0/8"), 1);
        set.insert(v4("10.1.0.0/16"), 2);
        assert_eq!(format!("{set:?}"), "{10.0.0.0/8: 1, 10.1.0.0/16: 2}");
    }

    #[test]
    fn many_networks() {
        let mut set = Ipv4Set::new();
        for i in 0..=255u8 {
            let network = Ipv4Network::new(Ipv4Address::from_octets([192, 168, i, 0]), 24).unwrap();
            set.insert(network, i);
        }
        set.insert(v4("192.168.0.0/16"), 0);
        assert_eq!(set.len(), 257);

        for i in 0..=255u8 {
            let address = Ipv4Address::from_octets([192, 168, i, 17]);
            let (network, value) = set.longest_match_address(address).unwrap();
            assert_eq!(*value, i);
            assert_eq!(network.mask(), 24);
        }
        let (network, _) = set.longest_match(&v4("192.168.0.0/17")).unwrap();
        assert_eq!(network, v4("192.168.0.0/16"));
    }
}
