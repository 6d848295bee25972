//! The update dispatch engine.
//!
//! Handling an update for a list of hostnames and a resolved address runs in four steps:
//!
//! 1. [`discover_zones`]: ask every provider, concurrently, which zones it owns.
//! 2. [`route`]: give each hostname to the first provider and zone owning it, building one
//!    address record per hostname. Hostnames nobody owns become `nohost`.
//! 3. [`dispatch`]: write each (provider, zone) batch of records concurrently.
//! 4. [`aggregate`]: fold every batch's outcome back onto the hostnames' return codes.
//!
//! The same [`Gate`] bounds concurrency in steps 1 and 3. Steps run one after another, and the
//! return codes are only touched once every job has finished.

use crate::gate::Gate;
use crate::provider::Registry;
use crate::reply::ReturnCode;
use std::net::IpAddr;

pub mod dispatch;
pub mod router;
pub mod zones;

pub use dispatch::{aggregate, dispatch, Job};
pub use router::{route, ChangeList};
pub use zones::discover_zones;

/// Publish `ip` under every hostname in `hosts`, returning one code per hostname in the same
/// order.
pub async fn update(
    registry: &Registry,
    gate: &Gate,
    hosts: &[String],
    ip: IpAddr,
) -> Vec<ReturnCode> {
    let mut codes = vec![ReturnCode::NoChange; hosts.len()];

    let zones = discover_zones(registry, gate).await;
    let changes = route(hosts, ip, registry, &zones, &mut codes);
    let jobs = dispatch(registry, gate, changes).await;
    aggregate(&jobs, hosts, &mut codes);

    codes
}
