//! Per-hostname provider session
//!
//! A [`Processor`] binds a hostname to its resolved zone, the zone's provider
//! id and the record name relative to that zone. Building one costs a zone
//! walk plus a zone listing, which is why the engine caches them.

use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::model::{Hostname, RecordName, RecordType, Zone};
use crate::reconcile::Reconciler;
use crate::record::RecordClient;
use crate::traits::DnsProvider;
use crate::zone::{ZoneDirectoryClient, ZoneResolver};

/// Fully initialized (hostname, zone, zone id, provider) binding
pub struct Processor {
    hostname: Hostname,
    zone: Zone,
    record_name: RecordName,
    provider: Arc<dyn DnsProvider>,
    ttl: u32,
}

impl Processor {
    /// Resolve the zone for `hostname` and look up its provider id
    ///
    /// Nothing is returned unless both steps succeed.
    pub async fn build(
        hostname: Hostname,
        zone_resolver: &ZoneResolver,
        directory: &ZoneDirectoryClient,
        provider: Arc<dyn DnsProvider>,
        ttl: u32,
    ) -> Result<Self> {
        let zone_name = zone_resolver.resolve_zone(&hostname).await?;
        let zone_id = directory.find_zone_id(&zone_name).await?;
        let zone = Zone {
            name: zone_name,
            id: zone_id,
        };
        Self::with_zone(hostname, zone, provider, ttl)
    }

    /// Bind `hostname` to an already known zone
    pub fn with_zone(
        hostname: Hostname,
        zone: Zone,
        provider: Arc<dyn DnsProvider>,
        ttl: u32,
    ) -> Result<Self> {
        let record_name = RecordName::relative_to(&hostname, &zone.name)?;
        info!(
            %hostname,
            zone = %zone.name,
            zone_id = %zone.id,
            record_name = %record_name,
            provider = provider.provider_name(),
            "processor ready"
        );
        Ok(Self {
            hostname,
            zone,
            record_name,
            provider,
            ttl,
        })
    }

    pub fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn record_name(&self) -> &RecordName {
        &self.record_name
    }

    /// Reconciler for one record type of this hostname
    pub fn reconciler(&self, record_type: RecordType) -> Reconciler {
        let client = RecordClient::new(
            Arc::clone(&self.provider),
            self.zone.id.clone(),
            self.record_name.clone(),
            record_type,
        );
        Reconciler::new(client, self.ttl)
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("hostname", &self.hostname)
            .field("zone", &self.zone)
            .field("record_name", &self.record_name)
            .field("provider", &self.provider.provider_name())
            .field("ttl", &self.ttl)
            .finish()
    }
}
