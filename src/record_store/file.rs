//! A JSON file-backed implementation of the [`RecordStore`][super::RecordStore] trait.
//!
//! Wraps a [`InMemoryRecordStore`][super::memory::InMemoryRecordStore] instance, persisting
//! changes to a JSON file on disk that can be reloaded across restarts.
use crate::error::Error;
use crate::record::Record;
use crate::record_store::memory::InMemoryRecordStore;
use crate::record_store::RecordStore;
use std::io::ErrorKind;
use tokio::fs::File;
use tokio::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use trust_dns_proto::rr::RecordType;

/// A file-backed record store. After each change a JSON file on disk is updated with the new
/// data. This file can be reloaded across restarts to avoid losing state.
///
/// Wraps a [`InMemoryRecordStore`][super::memory::InMemoryRecordStore], operating the same way
/// except for maintaining state beyond in-memory.
#[derive(Default, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileRecordStore {
    record_store: InMemoryRecordStore,
    path: String,
}

impl FileRecordStore {
    /// Save the state of the record store as JSON to the store's configured path, or return an
    /// Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if a record in the store can't be serialized to JSON.
    ///
    /// Returns [`Error::IO`] if the serialized state can't be written to the backing file path.
    pub async fn save(&self) -> Result<(), Error> {
        let data = serde_json::to_string_pretty(&self.record_store)?;
        let mut output_file = File::create(&self.path).await?;
        output_file.write_all(data.as_bytes()).await?;
        output_file.flush().await?;
        Ok(())
    }

    /// Load a [`FileRecordStore`] from the JSON state located at the given path, creating an empty
    /// state file if there is none yet, or return an Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the JSON state file is invalid.
    ///
    /// Returns [`Error::IO`] if the path can't be opened or read.
    pub async fn try_from_file(p: &str) -> Result<Self, Error> {
        let contents = match File::open(p).await {
            Ok(mut f) => {
                let mut buf = vec![];
                f.read_to_end(&mut buf).await?;
                buf
            }
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Self::write_empty_state(File::create(&p).await?).await?,
                _ => return Err(Error::IO(err)),
            },
        };

        let record_store: InMemoryRecordStore = serde_json::from_slice(&contents)?;
        Ok(Self {
            path: p.to_string(),
            record_store,
        })
    }

    async fn write_empty_state(mut f: File) -> io::Result<Vec<u8>> {
        let default_data = serde_json::to_string_pretty(&InMemoryRecordStore::default())?;
        let default_bytes = default_data.as_bytes();
        f.write_all(default_bytes).await?;
        f.flush().await?;
        Ok(default_bytes.to_vec())
    }

    async fn save_if_changed(&self, changed: Vec<Record>) -> Result<Vec<Record>, Error> {
        if !changed.is_empty() {
            self.save().await?;
        }
        Ok(changed)
    }
}

#[async_trait::async_trait]
impl RecordStore for FileRecordStore {
    async fn get_records(&self, zone: &str) -> Vec<Record> {
        self.record_store.get_records(zone).await
    }

    async fn append_records(
        &mut self,
        zone: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, Error> {
        let added = self.record_store.append_records(zone, records).await?;
        self.save_if_changed(added).await
    }

    async fn set_records(&mut self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        let written = self.record_store.set_records(zone, records).await?;
        self.save_if_changed(written).await
    }

    async fn delete_records(
        &mut self,
        zone: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, Error> {
        let removed = self.record_store.delete_records(zone, records).await?;
        self.save_if_changed(removed).await
    }

    async fn lookup(&self, zone: &str, name: &str, record_type: RecordType) -> Vec<Record> {
        self.record_store.lookup(zone, name, record_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let mut store = FileRecordStore::try_from_file(path).await.unwrap();
        assert!(store.get_records("example.com").await.is_empty());

        let home = Record::address("home", "203.0.113.9".parse().unwrap());
        store
            .set_records("example.com", &[home.clone()])
            .await
            .unwrap();

        let reloaded = FileRecordStore::try_from_file(path).await.unwrap();
        assert_eq!(
            reloaded.lookup("example.com", "home", RecordType::A).await,
            vec![home]
        );
    }

    #[tokio::test]
    async fn invalid_state_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = FileRecordStore::try_from_file(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidJSON(_)));
    }
}
