//! Record storage backing the [`local`][crate::provider::local] provider and the
//! [DNS server][crate::dns].
//!
//! Zones hold address records named relative to the zone. Two implementations are provided,
//! [`memory::InMemoryRecordStore`] and [`file::FileRecordStore`]. The former is not durable across
//! restarts. The latter will write its state to disk for each change and load this state again on
//! startup.

use crate::error::Error;
use crate::record::Record;
use std::sync::Arc;
use tokio::sync::RwLock;
use trust_dns_proto::rr::RecordType;

pub mod file;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use file::FileRecordStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryRecordStore;

/// `DynRecordStore` is a type alias for a [`RecordStore`] that can be used by multiple read/write
/// consumers that coordinate through an [`Arc`] and a [`RwLock`] wrapping the [`RecordStore`].
#[allow(clippy::module_name_repetitions)]
pub type DynRecordStore = Arc<RwLock<dyn RecordStore + Send + Sync>>;

/// An async trait describing storage of address records, keyed by zone.
#[async_trait::async_trait]
pub trait RecordStore {
    /// Get every record in `zone`.
    async fn get_records(&self, zone: &str) -> Vec<Record>;

    /// Add `records` to `zone`, returning what was added.
    async fn append_records(&mut self, zone: &str, records: &[Record])
        -> Result<Vec<Record>, Error>;

    /// Replace records of the same name and type in `zone`, returning only the records that
    /// differ from what was stored before.
    async fn set_records(&mut self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error>;

    /// Remove the records of `zone` matching `records` by name, type and address, returning what
    /// was removed.
    async fn delete_records(&mut self, zone: &str, records: &[Record])
        -> Result<Vec<Record>, Error>;

    /// Records of `record_type` named `name` (relative) in `zone`.
    async fn lookup(&self, zone: &str, name: &str, record_type: RecordType) -> Vec<Record>;
}
