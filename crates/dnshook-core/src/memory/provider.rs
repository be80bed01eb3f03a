// # Memory DNS Provider
//
// In-memory implementation of DnsProvider.
//
// ## Purpose
//
// Hosts a fixed set of zones and their records in process memory, and
// answers with the same statuses a real provider uses (201 create, 200
// update, 204 delete, 404 for unknown ids). Every call is journaled.
//
// ## When to Use
//
// - Local runs of the daemon without provider credentials
// - Tests that need to observe exactly which provider calls were made
//
// Nothing survives a restart.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::Error;
use crate::model::{ExistingRecord, RecordId, RecordType, ZoneId};
use crate::traits::{DnsProvider, RecordPage, WriteResponse, ZoneEntry, ZonePage};

/// TTL given to records seeded without one
const DEFAULT_SEED_TTL: u32 = 3600;

/// One provider call, as seen by the memory provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ListZones {
        page: u32,
    },
    ListRecords {
        zone_id: ZoneId,
        name: String,
        record_type: RecordType,
    },
    Create {
        zone_id: ZoneId,
        name: String,
        record_type: RecordType,
        content: String,
        ttl: u32,
    },
    Update {
        zone_id: ZoneId,
        record_id: RecordId,
        name: String,
        content: String,
        ttl: u32,
    },
    Delete {
        zone_id: ZoneId,
        record_id: RecordId,
    },
}

impl ProviderCall {
    /// Create, update or delete
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            ProviderCall::Create { .. } | ProviderCall::Update { .. } | ProviderCall::Delete { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct StoredRecord {
    id: RecordId,
    zone_id: ZoneId,
    name: String,
    record_type: RecordType,
    content: String,
    ttl: u32,
}

impl StoredRecord {
    fn to_existing(&self) -> ExistingRecord {
        ExistingRecord {
            id: self.id.clone(),
            content: self.content.clone(),
            ttl: self.ttl,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    zones: Vec<ZoneEntry>,
    records: Vec<StoredRecord>,
    next_zone_id: u64,
    next_record_id: u64,
    calls: Vec<ProviderCall>,
}

impl Inner {
    fn has_zone(&self, zone_id: &ZoneId) -> bool {
        self.zones.iter().any(|z| &z.id == zone_id)
    }

    fn position(&self, zone_id: &ZoneId, record_id: &RecordId) -> Option<usize> {
        self.records
            .iter()
            .position(|r| &r.zone_id == zone_id && &r.id == record_id)
    }
}

/// In-memory DNS provider
///
/// Cloning shares the underlying zones, records and call journal.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryProvider {
    /// Create a provider hosting `zones`, with ids "1", "2", ... in order
    pub fn new<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        for zone in zones {
            provider.add_zone(zone);
        }
        provider
    }

    /// Host another zone and return its id
    pub fn add_zone(&self, name: impl Into<String>) -> ZoneId {
        let mut inner = self.lock();
        inner.next_zone_id += 1;
        let id = ZoneId(inner.next_zone_id.to_string());
        inner.zones.push(ZoneEntry {
            id: id.clone(),
            name: name.into(),
        });
        id
    }

    /// Id of a hosted zone
    pub fn zone_id(&self, name: &str) -> Option<ZoneId> {
        self.lock()
            .zones
            .iter()
            .find(|z| z.name == name)
            .map(|z| z.id.clone())
    }

    /// Seed a record without journaling a call
    pub fn insert_record(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
        content: &str,
    ) -> RecordId {
        let mut inner = self.lock();
        insert(&mut inner, zone_id, name, record_type, content, DEFAULT_SEED_TTL)
    }

    /// Records for a name/type, in insertion order
    pub fn records(&self, zone_id: &ZoneId, name: &str, record_type: RecordType) -> Vec<ExistingRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| &r.zone_id == zone_id && r.name == name && r.record_type == record_type)
            .map(StoredRecord::to_existing)
            .collect()
    }

    /// Every call made so far, oldest first
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    /// Number of create/update/delete calls made so far
    pub fn write_count(&self) -> usize {
        self.lock().calls.iter().filter(|c| c.is_write()).count()
    }

    /// Forget the call journal
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn insert(
    inner: &mut Inner,
    zone_id: &ZoneId,
    name: &str,
    record_type: RecordType,
    content: &str,
    ttl: u32,
) -> RecordId {
    inner.next_record_id += 1;
    let id = RecordId(inner.next_record_id.to_string());
    inner.records.push(StoredRecord {
        id: id.clone(),
        zone_id: zone_id.clone(),
        name: name.to_string(),
        record_type,
        content: content.to_string(),
        ttl,
    });
    id
}

fn not_found(what: &str) -> WriteResponse {
    WriteResponse::new(404, serde_json::json!({ "message": format!("{} not found", what) }).to_string())
}

#[async_trait]
impl DnsProvider for MemoryProvider {
    async fn list_zones(&self, page: u32, page_size: u32) -> Result<ZonePage, Error> {
        let mut inner = self.lock();
        inner.calls.push(ProviderCall::ListZones { page });

        let page_size = page_size.max(1) as usize;
        let total_pages = inner.zones.len().div_ceil(page_size).max(1) as u32;
        let zones = inner
            .zones
            .iter()
            .skip((page.max(1) as usize - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();

        Ok(ZonePage { zones, total_pages })
    }

    async fn list_records(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
    ) -> Result<RecordPage, Error> {
        let mut inner = self.lock();
        inner.calls.push(ProviderCall::ListRecords {
            zone_id: zone_id.clone(),
            name: name.to_string(),
            record_type,
        });

        if !inner.has_zone(zone_id) {
            return Err(Error::provider("memory", format!("unknown zone id {}", zone_id)));
        }

        let records = inner
            .records
            .iter()
            .filter(|r| &r.zone_id == zone_id && r.name == name && r.record_type == record_type)
            .map(StoredRecord::to_existing)
            .collect();

        Ok(RecordPage {
            records,
            total_pages: 1,
        })
    }

    async fn create_record(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
        content: &str,
        ttl: u32,
    ) -> Result<WriteResponse, Error> {
        let mut inner = self.lock();
        inner.calls.push(ProviderCall::Create {
            zone_id: zone_id.clone(),
            name: name.to_string(),
            record_type,
            content: content.to_string(),
            ttl,
        });

        if !inner.has_zone(zone_id) {
            return Ok(not_found("Zone"));
        }

        let id = insert(&mut inner, zone_id, name, record_type, content, ttl);
        let body = serde_json::json!({
            "data": { "id": id, "name": name, "type": record_type, "content": content, "ttl": ttl }
        });
        Ok(WriteResponse::new(201, body.to_string()))
    }

    async fn update_record(
        &self,
        zone_id: &ZoneId,
        record_id: &RecordId,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<WriteResponse, Error> {
        let mut inner = self.lock();
        inner.calls.push(ProviderCall::Update {
            zone_id: zone_id.clone(),
            record_id: record_id.clone(),
            name: name.to_string(),
            content: content.to_string(),
            ttl,
        });

        let Some(index) = inner.position(zone_id, record_id) else {
            return Ok(not_found("Record"));
        };

        let record = &mut inner.records[index];
        record.name = name.to_string();
        record.content = content.to_string();
        record.ttl = ttl;
        let body = serde_json::json!({
            "data": { "id": record.id, "name": record.name, "type": record.record_type, "content": record.content, "ttl": record.ttl }
        });
        Ok(WriteResponse::new(200, body.to_string()))
    }

    async fn delete_record(
        &self,
        zone_id: &ZoneId,
        record_id: &RecordId,
    ) -> Result<WriteResponse, Error> {
        let mut inner = self.lock();
        inner.calls.push(ProviderCall::Delete {
            zone_id: zone_id.clone(),
            record_id: record_id.clone(),
        });

        let Some(index) = inner.position(zone_id, record_id) else {
            return Ok(not_found("Record"));
        };

        inner.records.remove(index);
        Ok(WriteResponse::new(204, ""))
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zone_listing_pages() {
        let provider = MemoryProvider::new(["a.com", "b.com", "c.com"]);

        let first = provider.list_zones(1, 2).await.unwrap();
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.zones.len(), 2);

        let second = provider.list_zones(2, 2).await.unwrap();
        assert_eq!(second.zones.len(), 1);
        assert_eq!(second.zones[0].name, "c.com");
    }

    #[tokio::test]
    async fn write_statuses_match_the_provider_contract() {
        let provider = MemoryProvider::new(["example.com"]);
        let zone = provider.zone_id("example.com").unwrap();

        let created = provider
            .create_record(&zone, "test", RecordType::Txt, "abc123", 60)
            .await
            .unwrap();
        assert_eq!(created.status, 201);

        let record = provider.records(&zone, "test", RecordType::Txt).remove(0);
        let updated = provider
            .update_record(&zone, &record.id, "test", "def456", 60)
            .await
            .unwrap();
        assert_eq!(updated.status, 200);
        assert_eq!(provider.records(&zone, "test", RecordType::Txt)[0].content, "def456");

        let deleted = provider.delete_record(&zone, &record.id).await.unwrap();
        assert_eq!(deleted.status, 204);
        assert!(deleted.body.is_empty());

        let missing = provider.delete_record(&zone, &record.id).await.unwrap();
        assert_eq!(missing.status, 404);

        assert_eq!(provider.write_count(), 4);
    }

    #[tokio::test]
    async fn seeded_records_are_not_journaled() {
        let provider = MemoryProvider::new(["example.com"]);
        let zone = provider.zone_id("example.com").unwrap();
        provider.insert_record(&zone, "@", RecordType::A, "192.0.2.1");

        assert!(provider.calls().is_empty());
        let page = provider.list_records(&zone, "@", RecordType::A).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].ttl, DEFAULT_SEED_TTL);
    }
}
