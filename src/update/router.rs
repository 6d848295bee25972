use crate::provider::Registry;
use crate::record::{relative_name, Record};
use crate::reply::ReturnCode;
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::{debug, warn};

/// Records to write, by provider index and then by zone.
pub type ChangeList = BTreeMap<usize, BTreeMap<String, Vec<Record>>>;

/// Assign each hostname to the first provider, in registry order, owning a zone the hostname is
/// a subdomain of. Within a provider zones are tried in listing order, and the first match wins.
///
/// Hostnames no provider owns are marked [`ReturnCode::NoHost`] in `codes` right away.
pub fn route(
    hosts: &[String],
    ip: IpAddr,
    registry: &Registry,
    zones: &[Vec<String>],
    codes: &mut [ReturnCode],
) -> ChangeList {
    let mut changes = ChangeList::new();

    'hostnames: for (idx, hostname) in hosts.iter().enumerate() {
        for (x, provider) in registry.iter().enumerate() {
            let provider_zones = zones.get(x).map(Vec::as_slice).unwrap_or_default();

            for zone in provider_zones {
                if hostname.ends_with(&format!(".{zone}")) {
                    debug!(
                        "hostname {hostname} matches zone {zone} (provider {})",
                        provider.name()
                    );
                    changes
                        .entry(x)
                        .or_default()
                        .entry(zone.clone())
                        .or_default()
                        .push(Record::address(relative_name(hostname, zone), ip));
                    continue 'hostnames;
                }
            }

            debug!(
                zones = ?provider_zones,
                "hostname {hostname} is not supported by provider {}",
                provider.name()
            );
        }

        warn!("hostname {hostname} not supported by providers");
        if let Some(code) = codes.get_mut(idx) {
            *code = ReturnCode::NoHost;
        }
    }

    changes
}
