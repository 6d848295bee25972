//! A [`Provider`] decorator with a fixed zone list.
//!
//! Record operations are forwarded to the wrapped provider unchanged. Zone listings never reach
//! it: the configured zones are returned instead. This admits backends that can't list zones, or
//! narrows one that lists too many.

use crate::error::Error;
use crate::provider::{admit, Capability, DynProvider, Provider, RECORD_CAPABILITIES};
use crate::record::Record;
use async_trait::async_trait;

#[allow(clippy::module_name_repetitions)]
pub struct StaticZonesProvider {
    provider: DynProvider,
    zones: Vec<String>,
}

impl StaticZonesProvider {
    /// Wrap `provider`, answering zone listings with `zones`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCapabilities`] if `provider` can't get, append, set and delete
    /// records.
    pub fn new(provider: DynProvider, zones: Vec<String>) -> Result<Self, Error> {
        admit(provider.as_ref(), &RECORD_CAPABILITIES)?;
        Ok(StaticZonesProvider { provider, zones })
    }
}

#[async_trait]
impl Provider for StaticZonesProvider {
    fn name(&self) -> String {
        format!("static_zones({})", self.provider.name())
    }

    fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = RECORD_CAPABILITIES.to_vec();
        capabilities.push(Capability::ZoneLister);
        capabilities
    }

    async fn list_zones(&self) -> Result<Vec<String>, Error> {
        Ok(self.zones.clone())
    }

    async fn get_records(&self, zone: &str) -> Result<Vec<Record>, Error> {
        self.provider.get_records(zone).await
    }

    async fn append_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        self.provider.append_records(zone, records).await
    }

    async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        self.provider.set_records(zone, records).await
    }

    async fn delete_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        self.provider.delete_records(zone, records).await
    }
}
