//! Originating client address resolution.
//!
//! The candidates are, in order, the IP of the peer the request arrived from and the first entry
//! of its `X-Forwarded-For` header. The first candidate that isn't empty, isn't considered
//! loopback, and isn't inside one of the configured ignored networks wins.

use axum::http::HeaderMap;
use ipnetwork::IpNetwork;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

pub const LOOPBACK: &str = "127.0.0.1";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// How a candidate address is recognized as loopback.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoopbackMatch {
    /// The candidate is loopback when [`LOOPBACK`] starts with it. Only `127.0.0.1` itself (and
    /// its prefixes, like `127.0`) match; `127.0.0.2` and `::1` do not.
    #[default]
    LegacyPrefix,
    /// The candidate is loopback when it parses as an IP address in `127.0.0.0/8` or `::1`.
    AnyLoopback,
}

impl LoopbackMatch {
    #[must_use]
    pub fn matches(self, candidate: &str) -> bool {
        match self {
            LoopbackMatch::LegacyPrefix => LOOPBACK.starts_with(candidate),
            LoopbackMatch::AnyLoopback => match candidate.parse::<IpAddr>() {
                Ok(ip) => ip.is_loopback(),
                Err(_) => candidate == LOOPBACK,
            },
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AddressPolicy {
    pub loopback_match: LoopbackMatch,
    /// Networks whose addresses are never reported as the client, e.g. a fronting proxy's subnet.
    pub ignored_networks: Vec<IpNetwork>,
}

impl AddressPolicy {
    /// The ordered candidate list for a request from `remote` carrying `headers`.
    #[must_use]
    pub fn candidates(remote: SocketAddr, headers: &HeaderMap) -> Vec<String> {
        let mut candidates = vec![remote.ip().to_string()];
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim);
        if let Some(forwarded) = forwarded {
            candidates.push(forwarded.to_string());
        }
        candidates
    }

    /// Best guess at the address the request originated from, or `None` if every candidate was
    /// skipped.
    #[must_use]
    pub fn resolve(&self, remote: SocketAddr, headers: &HeaderMap) -> Option<String> {
        Self::candidates(remote, headers)
            .into_iter()
            .find(|candidate| !self.skipped(candidate))
    }

    fn skipped(&self, candidate: &str) -> bool {
        if candidate.is_empty() || self.loopback_match.matches(candidate) {
            return true;
        }
        match candidate.parse::<IpAddr>() {
            Ok(ip) => self.ignored_networks.iter().any(|net| net.contains(ip)),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(value));
        headers
    }

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn transport_address_without_port() {
        let policy = AddressPolicy::default();
        assert_eq!(
            policy.resolve(addr("203.0.113.5:4512"), &HeaderMap::new()),
            Some("203.0.113.5".to_string())
        );
    }

    #[test]
    fn loopback_peer_falls_back_to_forwarded_for() {
        let headers = forwarded("198.51.100.9, 10.0.0.1");
        assert_eq!(
            AddressPolicy::candidates(addr("127.0.0.1:4512"), &headers),
            vec!["127.0.0.1".to_string(), "198.51.100.9".to_string()]
        );
        assert_eq!(
            AddressPolicy::default().resolve(addr("127.0.0.1:4512"), &headers),
            Some("198.51.100.9".to_string())
        );
    }

    #[test]
    fn peer_address_wins_over_forwarded_for() {
        let headers = forwarded("198.51.100.9");
        assert_eq!(
            AddressPolicy::default().resolve(addr("203.0.113.5:80"), &headers),
            Some("203.0.113.5".to_string())
        );
    }

    #[test]
    fn nothing_found_behind_loopback_without_header() {
        assert_eq!(
            AddressPolicy::default().resolve(addr("127.0.0.1:4512"), &HeaderMap::new()),
            None
        );
        assert_eq!(
            AddressPolicy::default().resolve(addr("127.0.0.1:4512"), &forwarded("")),
            None
        );
    }

    #[test]
    fn legacy_prefix_only_recognizes_the_literal() {
        let policy = LoopbackMatch::LegacyPrefix;
        assert!(policy.matches("127.0.0.1"));
        assert!(policy.matches("127.0"));
        assert!(!policy.matches("127.0.0.2"));
        assert!(!policy.matches("::1"));
        assert!(!policy.matches("127.0.0.10"));
    }

    #[test]
    fn any_loopback_recognizes_whole_ranges() {
        let policy = LoopbackMatch::AnyLoopback;
        assert!(policy.matches("127.0.0.1"));
        assert!(policy.matches("127.0.0.2"));
        assert!(policy.matches("::1"));
        assert!(!policy.matches("127.0"));
        assert!(!policy.matches("198.51.100.9"));
    }

    #[test]
    fn ipv6_loopback_peer_depends_on_policy() {
        let headers = forwarded("2001:db8::7");
        let legacy = AddressPolicy::default();
        assert_eq!(
            legacy.resolve(addr("[::1]:4512"), &headers),
            Some("::1".to_string())
        );

        let strict = AddressPolicy {
            loopback_match: LoopbackMatch::AnyLoopback,
            ..AddressPolicy::default()
        };
        assert_eq!(
            strict.resolve(addr("[::1]:4512"), &headers),
            Some("2001:db8::7".to_string())
        );
    }

    #[test]
    fn ignored_networks_are_skipped() {
        let policy = AddressPolicy {
            ignored_networks: vec!["10.0.0.0/8".parse().unwrap()],
            ..AddressPolicy::default()
        };
        assert_eq!(
            policy.resolve(addr("10.1.2.3:443"), &forwarded("198.51.100.9")),
            Some("198.51.100.9".to_string())
        );
        assert_eq!(
            policy.resolve(addr("10.1.2.3:443"), &forwarded("10.9.9.9")),
            None
        );
    }

    #[test]
    fn policy_deserializes_from_config() {
        let policy: AddressPolicy = serde_json::from_str(
            r#"{ "loopback_match": "any_loopback", "ignored_networks": ["192.0.2.0/24"] }"#,
        )
        .unwrap();
        assert_eq!(policy.loopback_match, LoopbackMatch::AnyLoopback);
        assert_eq!(policy.ignored_networks.len(), 1);
    }
}
