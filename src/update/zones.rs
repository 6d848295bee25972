use crate::gate::Gate;
use crate::provider::Registry;
use crate::record::normalize_name;
use tracing::error;

/// Ask every provider for its zones, at most `gate.size()` at a time.
///
/// The result is aligned with the registry: entry `i` holds the zones of provider `i`, in the
/// order the provider listed them. A provider that fails to list its zones is logged and
/// contributes none, without affecting the others.
pub async fn discover_zones(registry: &Registry, gate: &Gate) -> Vec<Vec<String>> {
    let mut pending = Vec::with_capacity(registry.len());

    for (idx, provider) in registry.iter().enumerate() {
        let permit = gate.acquire().await;
        let provider = provider.clone();
        pending.push(tokio::spawn(async move {
            let _permit = permit;
            match provider.list_zones().await {
                Ok(zones) => zones.iter().map(|zone| normalize_name(zone)).collect(),
                Err(err) => {
                    error!(
                        provider = %provider.name(),
                        provider_idx = idx,
                        "could not fetch zones: {err}"
                    );
                    Vec::new()
                }
            }
        }));
    }

    gate.wait_all().await;

    let mut zones = Vec::with_capacity(pending.len());
    for (idx, handle) in pending.into_iter().enumerate() {
        zones.push(handle.await.unwrap_or_else(|err| {
            error!(provider_idx = idx, "zone listing task failed: {err}");
            Vec::new()
        }));
    }
    zones
}
