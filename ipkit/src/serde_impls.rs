// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serde support via the canonical text forms.
//!
//! Networks always serialize with their mask.

use crate::any::{IpAddress, IpNetwork};
use crate::v4::{Ipv4Address, Ipv4Network};
use crate::v6::{Ipv6Address, Ipv6Network};
use core::fmt;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

macro_rules! serde_via_str {
    ($($ty:ty => $expecting:literal),* $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                struct TextVisitor;

                impl<'de> Visitor<'de> for TextVisitor {
                    type Value = $ty;

                    fn expecting(
                        &self,
                        f: &mut fmt::Formatter<'_>,
                    ) -> fmt::Result {
                        f.write_str($expecting)
                    }

                    fn visit_str<E: de::Error>(
                        self,
                        v: &str,
                    ) -> Result<Self::Value, E> {
                        v.parse().map_err(E::custom)
                    }
                }

                deserializer.deserialize_str(TextVisitor)
            }
        }
    )*};
}

serde_via_str! {
    Ipv4Address => "an IPv4 address",
    Ipv6Address => "an IPv6 address",
    IpAddress => "an IPv4 or IPv6 address",
    Ipv4Network => "an IPv4 network",
    Ipv6Network => "an IPv6 network",
    IpNetwork => "an IPv4 or IPv6 network",
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn text_form() {
        let n: Ipv4Network = "10.1.2.3/8".parse().unwrap();
        assert_eq!(serde_json::to_string(&n).unwrap(), "\"10.0.0.0/8\"");
        let host: Ipv6Network = "::1".parse().unwrap();
        assert_eq!(serde_json::to_string(&host).unwrap(), "\"::1/128\"");

        let back: IpNetwork = serde_json::from_str("\"2001:db8::/32\"").unwrap();
        assert!(back.is_ipv6());
        let a: Ipv4Address = serde_json::from_str("\"192.168.1.1\"").unwrap();
        assert_eq!(a.octets(), [192, 168, 1, 1]);
        assert!(serde_json::from_str::<Ipv6Address>("\"2001:::4\"").is_err());
        assert!(serde_json::from_str::<IpAddress>("17").is_err());
    }
}
