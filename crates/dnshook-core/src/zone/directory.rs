//! Zone name → provider zone id

use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::ZoneId;
use crate::traits::DnsProvider;

/// Zones requested per listing page
pub const ZONE_PAGE_SIZE: u32 = 100;

/// Looks zones up in the provider's paginated zone listing
pub struct ZoneDirectoryClient {
    provider: Arc<dyn DnsProvider>,
    page_size: u32,
}

impl ZoneDirectoryClient {
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            provider,
            page_size: ZONE_PAGE_SIZE,
        }
    }

    /// Find the provider's id for `zone_name`
    ///
    /// Pages are walked in order until the zone shows up or the provider's
    /// last page has been read. Names are compared exactly.
    pub async fn find_zone_id(&self, zone_name: &str) -> Result<ZoneId> {
        let mut page = 1;
        loop {
            let listing = self.provider.list_zones(page, self.page_size).await?;

            if let Some(zone) = listing.zones.into_iter().find(|z| z.name == zone_name) {
                debug!(zone = zone_name, zone_id = %zone.id, page, "found zone id");
                return Ok(zone.id);
            }

            if listing.total_pages > page {
                page += 1;
            } else {
                break;
            }
        }

        Err(Error::ZoneNotRegistered {
            zone: zone_name.to_string(),
        })
    }
}
