use crate::error::Error;
use crate::record::Record;
use crate::record_store::RecordStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trust_dns_proto::rr::RecordType;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryRecordStore {
    zones: BTreeMap<String, Vec<Record>>,
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_records(&self, zone: &str) -> Vec<Record> {
        self.zones.get(zone).map_or(Vec::default(), Clone::clone)
    }

    async fn append_records(
        &mut self,
        zone: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, Error> {
        self.zones
            .entry(zone.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(records.to_vec())
    }

    async fn set_records(&mut self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        let entries = self.zones.entry(zone.to_string()).or_default();
        let mut written = vec![];
        for record in records {
            let mut slot = entries.iter().filter(|e| e.same_slot(record));
            if let (Some(existing), None) = (slot.next(), slot.next()) {
                if existing == record {
                    continue;
                }
            }
            entries.retain(|e| !e.same_slot(record));
            entries.push(record.clone());
            written.push(record.clone());
        }
        Ok(written)
    }

    async fn delete_records(
        &mut self,
        zone: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, Error> {
        let Some(entries) = self.zones.get_mut(zone) else {
            return Ok(vec![]);
        };
        let (removed, kept): (Vec<Record>, Vec<Record>) = entries
            .drain(..)
            .partition(|e| records.iter().any(|r| r.same_slot(e) && r.ip == e.ip));
        *entries = kept;
        Ok(removed)
    }

    async fn lookup(&self, zone: &str, name: &str, record_type: RecordType) -> Vec<Record> {
        self.zones
            .get(zone)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.name == name && r.record_type() == record_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
