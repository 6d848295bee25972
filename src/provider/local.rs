//! A [`Provider`] writing into dyncrab's own [record store][crate::record_store].
//!
//! The zones it manages are configured statically. Records written here are served by the
//! [DNS server][crate::dns] when it is enabled.

use crate::error::Error;
use crate::provider::{Capability, Provider, REQUIRED_CAPABILITIES};
use crate::record::{normalize_name, Record};
use crate::record_store::DynRecordStore;
use async_trait::async_trait;

#[allow(clippy::module_name_repetitions)]
pub struct LocalProvider {
    zones: Vec<String>,
    record_store: DynRecordStore,
}

impl LocalProvider {
    pub fn new(zones: Vec<String>, record_store: DynRecordStore) -> Self {
        LocalProvider {
            zones: zones.iter().map(|zone| normalize_name(zone)).collect(),
            record_store,
        }
    }

    fn managed_zone(&self, zone: &str) -> Result<String, Error> {
        let zone = normalize_name(zone);
        if self.zones.contains(&zone) {
            Ok(zone)
        } else {
            Err(Error::UnknownZone(zone))
        }
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn name(&self) -> String {
        "local".to_string()
    }

    fn capabilities(&self) -> Vec<Capability> {
        REQUIRED_CAPABILITIES.to_vec()
    }

    async fn list_zones(&self) -> Result<Vec<String>, Error> {
        Ok(self.zones.clone())
    }

    async fn get_records(&self, zone: &str) -> Result<Vec<Record>, Error> {
        let zone = self.managed_zone(zone)?;
        Ok(self.record_store.read().await.get_records(&zone).await)
    }

    async fn append_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        let zone = self.managed_zone(zone)?;
        self.record_store
            .write()
            .await
            .append_records(&zone, records)
            .await
    }

    async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        let zone = self.managed_zone(zone)?;
        let written = self
            .record_store
            .write()
            .await
            .set_records(&zone, records)
            .await?;
        tracing::debug!("wrote {} of {} records in {zone}", written.len(), records.len());
        Ok(written)
    }

    async fn delete_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        let zone = self.managed_zone(zone)?;
        self.record_store
            .write()
            .await
            .delete_records(&zone, records)
            .await
    }
}
