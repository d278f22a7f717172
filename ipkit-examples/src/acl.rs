// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A most-specific-match access list over both address families.

use ipkit::{IpAddress, IpNetwork, Ipv4Set, Ipv6Set, ParseError};

/// What to do with traffic matching a rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Allow,
    Deny,
}

/// An error reading an access list rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuleError {
    /// The line did not start with `allow` or `deny`.
    BadAction,
    /// The network after the action did not parse.
    BadNetwork(ParseError),
}

/// Rules keyed by network. The most specific rule covering an address
/// wins, and addresses no rule covers get the default action.
#[derive(Debug)]
pub struct Acl {
    default: Action,
    v4: Ipv4Set<Action>,
    v6: Ipv6Set<Action>,
}

impl Acl {
    pub fn new(default: Action) -> Self {
        Self { default, v4: Ipv4Set::new(), v6: Ipv6Set::new() }
    }

    /// Adds a rule, replacing any previous rule for the same network.
    pub fn add(&mut self, network: IpNetwork, action: Action) {
        let old = match network {
            IpNetwork::V4(n) => self.v4.insert(n, action),
            IpNetwork::V6(n) => self.v6.insert(n, action),
        };
        if let Some(old) = old {
            log::debug!("rule for {network} changed from {old:?} to {action:?}");
        }
    }

    /// Adds a rule written as `allow <network>` or `deny <network>`.
    pub fn add_rule(&mut self, line: &str) -> Result<(), RuleError> {
        let (action, network) =
            line.trim().split_once(' ').ok_or(RuleError::BadAction)?;
        let action = match action {
            "allow" => Action::Allow,
            "deny" => Action::Deny,
            _ => return Err(RuleError::BadAction),
        };
        let network =
            IpNetwork::parse(network.trim()).map_err(RuleError::BadNetwork)?;
        self.add(network, action);
        Ok(())
    }

    /// Drops every rule within `network`.
    pub fn remove_within(&mut self, network: IpNetwork) -> usize {
        match network {
            IpNetwork::V4(n) => self.v4.remove_within(&n),
            IpNetwork::V6(n) => self.v6.remove_within(&n),
        }
    }

    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn evaluate(&self, address: IpAddress) -> Action {
        let matched = match address {
            IpAddress::V4(a) => self
                .v4
                .longest_match_address(a)
                .map(|(n, action)| (IpNetwork::V4(n), *action)),
            IpAddress::V6(a) => self
                .v6
                .longest_match_address(a)
                .map(|(n, action)| (IpNetwork::V6(n), *action)),
        };
        match matched {
            Some((network, action)) => {
                log::trace!("{address} matched {network}: {action:?}");
                action
            }
            None => self.default,
        }
    }
}
