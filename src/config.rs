use crate::error::Error;
use crate::gate;
use crate::provider::{DynProvider, LocalProvider, StaticZonesProvider};
use crate::record::normalize_name;
use crate::record_store::{DynRecordStore, FileRecordStore, InMemoryRecordStore};
use ipnetwork::IpNetwork;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use trust_dns_server::client::rr::{LowerName, Name};

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    /// Networks whose peers may speak for someone else's address, via `myip` or
    /// `X-Forwarded-For`.
    #[serde(default)]
    pub trusted_remotes: Vec<IpNetwork>,
    /// Only publish public addresses, falling back to the server's own address.
    #[serde(default)]
    pub no_local_ip: bool,
    /// Username to password. Authorization is disabled when empty.
    #[serde(default)]
    pub users: HashMap<String, String>,
    /// Upper bound of simultaneous provider calls per request.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    pub record_store_state_path: Option<String>,
    pub dns: Option<DnsConfig>,
    /// Providers in priority order: a hostname goes to the first provider with a matching zone.
    pub providers: Vec<ProviderConfig>,
}

fn default_max_concurrency() -> usize {
    gate::DEFAULT_SIZE
}

/// Configuration of one provider, tagged by `name`.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Writes into the built-in record store.
    Local { zones: Vec<String> },
    /// Wraps `provider`, listing `zones` instead of asking it.
    StaticZones {
        zones: Vec<String>,
        provider: Box<ProviderConfig>,
    },
}

impl ProviderConfig {
    /// Instantiate the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a provider without zones, and
    /// [`Error::MissingCapabilities`] if a wrapped provider can't work with records.
    pub fn build(&self, record_store: &DynRecordStore) -> Result<DynProvider, Error> {
        match self {
            ProviderConfig::Local { zones } => {
                if zones.is_empty() {
                    return Err(Error::InvalidConfig(
                        "local provider must specify at least one zone".to_string(),
                    ));
                }
                Ok(Arc::new(LocalProvider::new(
                    zones.clone(),
                    record_store.clone(),
                )))
            }
            ProviderConfig::StaticZones { zones, provider } => {
                if zones.is_empty() {
                    return Err(Error::InvalidConfig(
                        "static_zones provider must specify at least one zone".to_string(),
                    ));
                }
                let inner = provider.build(record_store)?;
                Ok(Arc::new(StaticZonesProvider::new(inner, zones.clone())?))
            }
        }
    }

    /// Zones written into the built-in record store by this provider.
    fn local_zones(&self) -> Vec<String> {
        match self {
            ProviderConfig::Local { zones } => zones.iter().map(|z| normalize_name(z)).collect(),
            ProviderConfig::StaticZones { provider, .. } => provider.local_zones(),
        }
    }
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct DnsConfig {
    pub udp_bind_addr: SocketAddr,
    pub tcp_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub tcp_timeout: Duration,
    pub ns_domain: LowerName,
    pub ns_admin: String,
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Check the values serde can't.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoProviders`] when no provider is configured, [`Error::InvalidConfig`] for
    /// a `max_concurrency` of zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.providers.is_empty() {
            return Err(Error::NoProviders);
        }
        if self.max_concurrency == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Open the record store, file-backed when a state path is configured.
    ///
    /// # Errors
    ///
    /// See [`FileRecordStore::try_from_file`].
    pub async fn record_store(&self) -> Result<DynRecordStore, Error> {
        let record_store: DynRecordStore = match &self.record_store_state_path {
            Some(path) => Arc::new(RwLock::new(FileRecordStore::try_from_file(path).await?)),
            None => Arc::new(RwLock::new(InMemoryRecordStore::default())),
        };
        Ok(record_store)
    }

    /// Every zone held in the built-in record store, in provider order.
    pub fn served_zones(&self) -> Vec<String> {
        let mut zones: Vec<String> = vec![];
        for zone in self.providers.iter().flat_map(ProviderConfig::local_zones) {
            if !zones.contains(&zone) {
                zones.push(zone);
            }
        }
        zones
    }
}

impl DnsConfig {
    pub fn ns_admin(&self) -> Result<Name, Error> {
        Ok(Name::from_str(&self.sanitized_ns_admin())?)
    }

    fn sanitized_ns_admin(&self) -> Cow<str> {
        match self.ns_admin.split_once('@') {
            Some((user, domain)) => {
                let user = user.replace('.', "\\.");
                Cow::Owned(format!("{user}.{domain}"))
            }
            _ => Cow::Borrowed(&self.ns_admin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    const EXAMPLE: &str = r#"{
        "api_bind_addr": "0.0.0.0:8245",
        "api_timeout": 30,
        "trusted_remotes": ["127.0.0.0/8", "fd00::/8"],
        "no_local_ip": true,
        "users": { "router": "hunter2" },
        "dns": {
            "udp_bind_addr": "0.0.0.0:53",
            "tcp_bind_addr": "0.0.0.0:53",
            "tcp_timeout": 5,
            "ns_domain": "ns1.example.com.",
            "ns_admin": "dns.admin@example.com"
        },
        "providers": [
            { "name": "local", "zones": ["dyn.example.com."] },
            {
                "name": "static_zones",
                "zones": ["example.org"],
                "provider": { "name": "local", "zones": ["example.org", "dyn.example.com"] }
            }
        ]
    }"#;

    #[test]
    fn parses_example_config() {
        let config: Config = serde_json::from_str(EXAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.api_timeout, Duration::from_secs(30));
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.trusted_remotes.len(), 2);
        assert!(config.no_local_ip);
        assert_eq!(config.users.get("router").map(String::as_str), Some("hunter2"));
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.served_zones(), vec!["dyn.example.com", "example.org"]);

        let dns = config.dns.unwrap();
        assert_eq!(dns.sanitized_ns_admin(), "dns\\.admin.example.com");
        assert!(dns.ns_admin().is_ok());
    }

    #[test]
    fn defaults_and_validation() {
        let config: Config = serde_json::from_str(
            r#"{ "api_bind_addr": "127.0.0.1:8245", "api_timeout": 5, "providers": [] }"#,
        )
        .unwrap();
        assert!(config.users.is_empty());
        assert!(config.trusted_remotes.is_empty());
        assert!(matches!(config.validate(), Err(Error::NoProviders)));

        let config: Config = serde_json::from_str(
            r#"{ "api_bind_addr": "127.0.0.1:8245", "api_timeout": 5, "max_concurrency": 0,
                 "providers": [{ "name": "local", "zones": ["example.com"] }] }"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn providers_are_built_from_config() {
        let record_store: DynRecordStore = Arc::new(RwLock::new(InMemoryRecordStore::default()));

        let config = ProviderConfig::Local { zones: vec![] };
        assert!(matches!(
            config.build(&record_store),
            Err(Error::InvalidConfig(_))
        ));

        let config: ProviderConfig = serde_json::from_str(
            r#"{ "name": "static_zones", "zones": ["example.org"],
                 "provider": { "name": "local", "zones": ["example.org"] } }"#,
        )
        .unwrap();
        let provider = config.build(&record_store).unwrap();
        assert_eq!(provider.name(), "static_zones(local)");
    }
}
