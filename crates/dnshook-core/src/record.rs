//! Record client bound to one (zone id, record name, record type)
//!
//! Each method is one provider call. Success is decided here by the exact
//! status the provider uses for that operation: 201 for create, 200 for
//! update, 204 for delete. Anything else is
//! [`Error::ProviderWriteFailed`] with the status and body attached.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{Error, Result, WriteOperation};
use crate::model::{ExistingRecord, RecordId, RecordName, RecordType, ZoneId};
use crate::traits::{DnsProvider, WriteResponse};

/// Status the provider answers a successful create with
pub const STATUS_CREATED: u16 = 201;

/// Status the provider answers a successful update with
pub const STATUS_UPDATED: u16 = 200;

/// Status the provider answers a successful delete with
pub const STATUS_DELETED: u16 = 204;

/// Provider record operations for a single name/type
pub struct RecordClient {
    provider: Arc<dyn DnsProvider>,
    zone_id: ZoneId,
    name: RecordName,
    record_type: RecordType,
}

impl RecordClient {
    pub fn new(
        provider: Arc<dyn DnsProvider>,
        zone_id: ZoneId,
        name: RecordName,
        record_type: RecordType,
    ) -> Self {
        Self {
            provider,
            zone_id,
            name,
            record_type,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn name(&self) -> &RecordName {
        &self.name
    }

    /// Current records for this name/type, in provider order
    ///
    /// Only the first page is read. A name/type pair should only ever have
    /// a handful of records, so a multi-page answer is logged as an anomaly
    /// and the first page is used as-is.
    pub async fn list(&self) -> Result<Vec<ExistingRecord>> {
        let page = self
            .provider
            .list_records(&self.zone_id, self.name.as_str(), self.record_type)
            .await?;

        if page.total_pages > 1 {
            let anomaly = Error::ProviderReadAnomaly {
                record_name: self.name.to_string(),
                record_type: self.record_type.to_string(),
                total_pages: page.total_pages,
            };
            warn!(zone_id = %self.zone_id, "{}", anomaly);
        }

        Ok(page.records)
    }

    /// Create a record holding `value`
    pub async fn create(&self, value: &str, ttl: u32) -> Result<()> {
        info!(
            zone_id = %self.zone_id,
            name = %self.name,
            record_type = %self.record_type,
            "creating new record"
        );
        let response = self
            .provider
            .create_record(&self.zone_id, self.name.as_str(), self.record_type, value, ttl)
            .await?;
        expect_status(WriteOperation::Create, STATUS_CREATED, response)
    }

    /// Rewrite record `record_id` to hold `value`
    pub async fn update(&self, record_id: &RecordId, value: &str, ttl: u32) -> Result<()> {
        info!(
            zone_id = %self.zone_id,
            %record_id,
            name = %self.name,
            record_type = %self.record_type,
            "updating record"
        );
        let response = self
            .provider
            .update_record(&self.zone_id, record_id, self.name.as_str(), value, ttl)
            .await?;
        expect_status(WriteOperation::Update, STATUS_UPDATED, response)
    }

    /// Delete record `record_id`
    pub async fn delete(&self, record_id: &RecordId) -> Result<()> {
        info!(zone_id = %self.zone_id, %record_id, "deleting record");
        let response = self.provider.delete_record(&self.zone_id, record_id).await?;
        expect_empty(WriteOperation::Delete, STATUS_DELETED, response)
    }
}

fn expect_status(operation: WriteOperation, expected: u16, response: WriteResponse) -> Result<()> {
    if response.status == expected {
        return Ok(());
    }
    write_failed(operation, response)
}

/// Like [`expect_status`], for operations whose success has no body
fn expect_empty(operation: WriteOperation, expected: u16, response: WriteResponse) -> Result<()> {
    if response.status == expected && response.body.trim().is_empty() {
        return Ok(());
    }
    write_failed(operation, response)
}

fn write_failed(operation: WriteOperation, response: WriteResponse) -> Result<()> {
    error!(
        %operation,
        status_code = response.status,
        response = %response.body,
        "failed to {} record",
        operation
    );
    Err(Error::write_failed(operation, response.status, response.body))
}
