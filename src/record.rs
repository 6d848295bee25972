//! DNS records written by providers, and the name arithmetic shared by routing and aggregation.
//!
//! Records carry names relative to their zone, e.g. the hostname `home.dyn.example.com` is written
//! into zone `dyn.example.com` as a record named `home`. The zone apex is named `@`.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::net::IpAddr;
use std::time::Duration;
use trust_dns_proto::rr::RecordType;

/// TTL given to every address record built from an update request.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A single address record, named relative to the zone it lives in.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub ttl: Duration,
    pub ip: IpAddr,
}

impl Record {
    /// Build an address record with the [`DEFAULT_TTL`].
    pub fn address(name: impl Into<String>, ip: IpAddr) -> Self {
        Record {
            name: name.into(),
            ttl: DEFAULT_TTL,
            ip,
        }
    }

    /// `A` for IPv4 addresses, `AAAA` for IPv6.
    pub fn record_type(&self) -> RecordType {
        match self.ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::AAAA,
        }
    }

    /// True when `other` occupies the same name and type, regardless of value.
    pub fn same_slot(&self, other: &Record) -> bool {
        self.name == other.name && self.record_type() == other.record_type()
    }
}

/// Lowercase a name and strip its trailing root separator, if any.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

/// The name of `fqdn` relative to `zone`. Names outside of `zone` are returned unchanged, the apex
/// becomes `@`.
pub fn relative_name(fqdn: &str, zone: &str) -> String {
    if fqdn == zone {
        return "@".to_string();
    }
    match fqdn.strip_suffix(zone).and_then(|n| n.strip_suffix('.')) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fqdn.to_string(),
    }
}

/// The fully qualified form (without trailing root separator) of `name` relative to `zone`.
pub fn absolute_name(name: &str, zone: &str) -> String {
    match name {
        "" | "@" => zone.to_string(),
        _ => format!("{name}.{zone}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_and_absolute_names() {
        assert_eq!(relative_name("home.dyn.example.com", "example.com"), "home.dyn");
        assert_eq!(relative_name("example.com", "example.com"), "@");
        assert_eq!(relative_name("example.org", "example.com"), "example.org");
        assert_eq!(relative_name("badexample.com", "example.com"), "badexample.com");

        assert_eq!(absolute_name("home.dyn", "example.com"), "home.dyn.example.com");
        assert_eq!(absolute_name("@", "example.com"), "example.com");
    }

    #[test]
    fn normalize_strips_root_and_case() {
        assert_eq!(normalize_name(" Home.Example.COM. "), "home.example.com");
        assert_eq!(normalize_name("example.com"), "example.com");
    }

    #[test]
    fn record_type_follows_address_family() {
        let v4 = Record::address("a", "192.0.2.1".parse().unwrap());
        let v6 = Record::address("a", "2001:db8::1".parse().unwrap());
        assert_eq!(v4.record_type(), RecordType::A);
        assert_eq!(v6.record_type(), RecordType::AAAA);
        assert!(!v4.same_slot(&v6));
        assert_eq!(v4.ttl.as_secs(), 300);
    }
}
