// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Route summarization: the fewest networks covering exactly the same
//! addresses as a given list.

use ipkit::{Address, Network};

/// Collapses `networks` into the smallest equivalent list, in ascending
/// order.
///
/// Networks contained in another are dropped, and pairs of sibling
/// networks are merged into their common supernet until none remain.
pub fn summarize<A: Address>(networks: &[Network<A>]) -> Vec<Network<A>> {
    let mut out: Vec<Network<A>> = Vec::with_capacity(networks.len());
    let mut sorted = networks.to_vec();
    sorted.sort();

    for network in sorted {
        if out.last().is_some_and(|last| last.contains_or_equal(&network)) {
            continue;
        }
        out.push(network);
        // A merge can make the previous entry mergeable in turn.
        while out.len() >= 2 {
            let (a, b) = (out[out.len() - 2], out[out.len() - 1]);
            let Some(parent) = merge_siblings(a, b) else {
                break;
            };
            out.truncate(out.len() - 2);
            out.push(parent);
        }
    }
    out
}

/// The parent of `a` and `b` if they are its two halves.
fn merge_siblings<A: Address>(a: Network<A>, b: Network<A>) -> Option<Network<A>> {
    if a.mask() != b.mask() || a.mask() == 0 || a == b {
        return None;
    }
    let parent = Network::make_supernet([a, b]).ok()?;
    (parent.mask() + 1 == a.mask()).then_some(parent)
}

/// Carves `network` into blocks of prefix length `mask`, skipping any that
/// overlap `taken`. Nothing is returned unless `mask` is longer than the
/// network's own prefix.
pub fn free_blocks<A: Address>(
    network: Network<A>,
    mask: u8,
    taken: &[Network<A>],
) -> Vec<Network<A>> {
    let Some(increment) = mask.checked_sub(network.mask()) else {
        return vec![];
    };
    let Ok(blocks) = network.split(increment) else {
        return vec![];
    };
    blocks
        .filter(|block| {
            !taken
                .iter()
                .any(|t| t.contains_or_equal(block) || block.contains(t))
        })
        .collect()
}
