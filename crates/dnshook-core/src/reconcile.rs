//! Record reconciliation
//!
//! Converges the provider's records for one name/type onto a desired value.
//!
//! ## Converge
//!
//! 1. List existing records.
//! 2. If there is more than one, delete all but the first. Failures here
//!    are logged and skipped: the first record is still the one evaluated.
//! 3. First record already holds the value verbatim → no write.
//! 4. Otherwise update the first record, or create one if none exist.
//!
//! ## Replace
//!
//! Delete every existing record (failures are fatal), then create the new
//! one. There is no "already correct" short-circuit.
//!
//! ## Clear
//!
//! Delete every existing record (failures are fatal).

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{ExistingRecord, ReconcileOutcome, RecordType};
use crate::record::RecordClient;

/// Applies the reconciliation policies through a [`RecordClient`]
pub struct Reconciler {
    client: RecordClient,
    ttl: u32,
}

impl Reconciler {
    pub fn new(client: RecordClient, ttl: u32) -> Self {
        Self { client, ttl }
    }

    pub fn record_type(&self) -> RecordType {
        self.client.record_type()
    }

    /// Read-only listing
    pub async fn find(&self) -> Result<Vec<ExistingRecord>> {
        self.client.list().await
    }

    /// Converge to exactly one record holding `desired`
    pub async fn converge(&self, desired: &str) -> Result<ReconcileOutcome> {
        let existing = self.client.list().await?;

        if existing.len() > 1 {
            warn!(
                name = %self.client.name(),
                record_type = %self.client.record_type(),
                count = existing.len(),
                "found duplicate records, removing all but the first"
            );
            for surplus in &existing[1..] {
                info!(record_id = %surplus.id, "deleting duplicate record");
                if let Err(e) = self.client.delete(&surplus.id).await {
                    warn!(record_id = %surplus.id, error = %e, "failed to delete duplicate record, continuing");
                }
            }
        }

        match existing.into_iter().next() {
            Some(primary) if primary.content == desired => {
                debug!(
                    name = %self.client.name(),
                    record_type = %self.client.record_type(),
                    "record already has desired content"
                );
                Ok(ReconcileOutcome::Unchanged)
            }
            Some(primary) => {
                self.client.update(&primary.id, desired, self.ttl).await?;
                Ok(ReconcileOutcome::Updated {
                    previous: primary.content,
                })
            }
            None => {
                self.client.create(desired, self.ttl).await?;
                Ok(ReconcileOutcome::Created)
            }
        }
    }

    /// Delete everything for the name/type, then create `value`
    pub async fn replace(&self, value: &str) -> Result<ReconcileOutcome> {
        let deleted = self.delete_all().await?;
        self.client.create(value, self.ttl).await?;
        Ok(ReconcileOutcome::Replaced { deleted })
    }

    /// Delete everything for the name/type
    pub async fn clear(&self) -> Result<ReconcileOutcome> {
        let deleted = self.delete_all().await?;
        Ok(ReconcileOutcome::Cleared { deleted })
    }

    async fn delete_all(&self) -> Result<usize> {
        let existing = self.client.list().await?;
        for record in &existing {
            self.client.delete(&record.id).await?;
        }
        Ok(existing.len())
    }
}
