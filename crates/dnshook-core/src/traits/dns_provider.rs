// # DNS Provider Trait
//
// Defines the provider capability the core talks to: a zone listing and
// record create/read/update/delete keyed by zone id.
//
// ## Implementations
//
// - DNSimple: `dnshook-provider-dnsimple` crate
// - In-memory: `dnshook_core::memory::MemoryProvider`
//
// ## Usage
//
// ```rust,ignore
// use dnshook_core::DnsProvider;
// use dnshook_core::model::{RecordType, ZoneId};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let page = provider.list_zones(1, 100).await?;
//     let records = provider
//         .list_records(&ZoneId("1".into()), "test", RecordType::Txt)
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::model::{ExistingRecord, RecordId, RecordType, ZoneId};

/// A zone as it appears in the provider's listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    pub id: ZoneId,
    pub name: String,
}

/// One page of the provider's zone listing
#[derive(Debug, Clone, Default)]
pub struct ZonePage {
    pub zones: Vec<ZoneEntry>,
    /// Total number of pages the provider reports
    pub total_pages: u32,
}

/// First page of records matching a name/type query
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub records: Vec<ExistingRecord>,
    /// Total number of pages the provider reports
    pub total_pages: u32,
}

/// Raw outcome of a provider write
///
/// The provider reports what came back; deciding whether the status means
/// success is the record client's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResponse {
    pub status: u16,
    pub body: String,
}

impl WriteResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks;
/// one instance is shared by every cached processor.
///
/// # Contract
///
/// - Each method performs a single provider API call.
/// - No retry, backoff or caching: the zone resolver owns the only retry
///   loop in the system, and callers retry whole requests.
/// - Transport failures and unreadable responses are `Err`. A response
///   that arrived is returned as-is from the write methods, whatever its
///   status.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List one page of zones in the account
    ///
    /// Pages are 1-based.
    async fn list_zones(&self, page: u32, page_size: u32) -> Result<ZonePage, crate::Error>;

    /// Query records with exactly this name and type
    ///
    /// Only the first page is fetched.
    async fn list_records(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
    ) -> Result<RecordPage, crate::Error>;

    /// Create a record
    async fn create_record(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
        content: &str,
        ttl: u32,
    ) -> Result<WriteResponse, crate::Error>;

    /// Rewrite an existing record's content and TTL
    ///
    /// The record type is not sent: providers refuse type changes on update.
    async fn update_record(
        &self,
        zone_id: &ZoneId,
        record_id: &RecordId,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<WriteResponse, crate::Error>;

    /// Delete a record
    async fn delete_record(
        &self,
        zone_id: &ZoneId,
        record_id: &RecordId,
    ) -> Result<WriteResponse, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
