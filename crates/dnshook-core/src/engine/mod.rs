//! dnshook engine
//!
//! The HookEngine is the entry point the HTTP boundary calls into. It is
//! responsible for:
//! - Looking up or building a hostname's processor via the cache
//! - Running zone discovery only on a cache miss
//! - Dispatching to the reconciliation policy the caller asked for
//!
//! ## Architecture
//!
//! ```text
//!   boundary ──▶ HookEngine ──▶ ProcessorCache ──(miss)──▶ ZoneResolver ──▶ SoaResolver
//!                    │                 │                    ZoneDirectoryClient ──┐
//!                    │                 ▼                                          │
//!                    └──────────▶ Processor ──▶ Reconciler ──▶ RecordClient ──▶ DnsProvider
//! ```
//!
//! ## Concurrency
//!
//! The engine is shared across request tasks. The processor cache is the
//! only shared mutable state; zone discovery and provider calls run without
//! any lock held.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::ProcessorCache;
use crate::config::HookConfig;
use crate::error::{Error, Result};
use crate::model::{DesiredRecord, ExistingRecord, Hostname, ReconcileOutcome, RecordType};
use crate::processor::Processor;
use crate::traits::{DnsProvider, SoaResolver};
use crate::zone::{ZoneDirectoryClient, ZoneResolver};

/// Core dnshook engine
pub struct HookEngine {
    /// DNS provider shared by every processor
    provider: Arc<dyn DnsProvider>,

    /// Hostname → zone apex
    zone_resolver: ZoneResolver,

    /// Zone apex → provider zone id
    directory: ZoneDirectoryClient,

    /// Processors by hostname
    cache: ProcessorCache<Processor>,

    /// TTL for written records
    ttl: u32,
}

impl HookEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `resolver`: SOA query implementation
    /// - `config`: dnshook configuration (validated here)
    pub fn new(
        provider: Arc<dyn DnsProvider>,
        resolver: Arc<dyn SoaResolver>,
        config: &HookConfig,
    ) -> Result<Self> {
        config.validate()?;

        info!(
            provider = provider.provider_name(),
            cache_capacity = config.cache.capacity,
            ttl = config.records.ttl,
            "engine initialized"
        );

        Ok(Self {
            zone_resolver: ZoneResolver::new(resolver, &config.resolver),
            directory: ZoneDirectoryClient::new(Arc::clone(&provider)),
            cache: ProcessorCache::new(config.cache.capacity),
            ttl: config.records.ttl,
            provider,
        })
    }

    /// Cached processor for `hostname`, building one on a miss
    pub async fn processor(&self, hostname: &Hostname) -> Result<Arc<Processor>> {
        self.cache
            .get_or_create(hostname, || {
                Processor::build(
                    hostname.clone(),
                    &self.zone_resolver,
                    &self.directory,
                    Arc::clone(&self.provider),
                    self.ttl,
                )
            })
            .await
    }

    /// Converge each desired record type onto its value
    ///
    /// At most one value per record type. Outcomes are returned in the
    /// order the records were given; the first failure aborts the rest.
    pub async fn reconcile_converge(
        &self,
        hostname: &Hostname,
        desired: &[DesiredRecord],
    ) -> Result<Vec<ReconcileOutcome>> {
        let mut seen = HashSet::new();
        for record in desired {
            if !seen.insert(record.record_type) {
                return Err(Error::invalid_input(format!(
                    "more than one {} value for {}",
                    record.record_type, hostname
                )));
            }
        }

        let processor = self.processor(hostname).await?;
        let mut outcomes = Vec::with_capacity(desired.len());
        for record in desired {
            let outcome = processor
                .reconciler(record.record_type)
                .converge(&record.value)
                .await?;
            debug!(%hostname, record_type = %record.record_type, ?outcome, "converged");
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Delete all records of `record_type` and create one holding `value`
    pub async fn reconcile_replace(
        &self,
        hostname: &Hostname,
        record_type: RecordType,
        value: &str,
    ) -> Result<ReconcileOutcome> {
        let processor = self.processor(hostname).await?;
        let outcome = processor.reconciler(record_type).replace(value).await?;
        debug!(%hostname, %record_type, ?outcome, "replaced");
        Ok(outcome)
    }

    /// Current records of `record_type` for `hostname`
    pub async fn list_for(
        &self,
        hostname: &Hostname,
        record_type: RecordType,
    ) -> Result<Vec<ExistingRecord>> {
        let processor = self.processor(hostname).await?;
        processor.reconciler(record_type).find().await
    }

    /// Delete all records of `record_type` for `hostname`
    pub async fn clear(
        &self,
        hostname: &Hostname,
        record_type: RecordType,
    ) -> Result<ReconcileOutcome> {
        let processor = self.processor(hostname).await?;
        let outcome = processor.reconciler(record_type).clear().await?;
        debug!(%hostname, %record_type, ?outcome, "cleared");
        Ok(outcome)
    }

    /// Hostnames with a cached processor, most recently used first
    pub fn cached_processors(&self) -> Vec<Hostname> {
        self.cache.hostnames()
    }

    /// Get the provider name (for logging/debugging)
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }
}
