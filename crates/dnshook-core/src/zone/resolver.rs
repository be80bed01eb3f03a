//! Zone apex discovery by SOA walk
//!
//! Starting from the full hostname, each candidate name is asked for its
//! SOA record. Two independent counters bound the walk:
//!
//! - **remaining labels**: a definitive negative answer strips the leftmost
//!   label and asks the parent. The walk never goes above a two-label name.
//! - **remaining time**: a timed-out query is asked again on the *same*
//!   candidate after a fixed backoff, spending wall-clock budget but no
//!   labels.
//!
//! ```text
//!   a.b.example.com ──NXDOMAIN──▶ b.example.com ──NoAnswer──▶ example.com ──SOA──▶ Found
//!          │                            │
//!          └─timeout─▶ (same, after backoff)
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::model::Hostname;
use crate::traits::{SoaOutcome, SoaResolver};

/// Lowest candidate the walk will ask about (`example.com`)
const LABEL_FLOOR: usize = 2;

/// What the walk does after one SOA outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The candidate is a zone apex
    Found(String),
    /// Ask the parent of the candidate next
    Descend,
    /// Ask the same candidate again after the backoff
    Retry,
    /// The two-label floor answered negatively: no zone
    Exhausted,
}

/// Label-descent half of the zone walk
///
/// Pure state: it knows which candidate is current and how many labels are
/// left, and turns SOA outcomes into [`Transition`]s. The time budget is
/// enforced by [`ZoneResolver`].
#[derive(Debug, Clone)]
pub struct ZoneWalk {
    hostname: String,
    /// Byte offset of the current candidate within `hostname`
    start: usize,
    remaining_labels: usize,
}

impl ZoneWalk {
    pub fn new(hostname: &Hostname) -> Self {
        Self {
            hostname: hostname.as_str().to_string(),
            start: 0,
            remaining_labels: hostname.label_count(),
        }
    }

    /// Name to query next
    pub fn candidate(&self) -> &str {
        &self.hostname[self.start..]
    }

    /// Labels in the current candidate
    pub fn remaining_labels(&self) -> usize {
        self.remaining_labels
    }

    /// Apply one SOA outcome for the current candidate
    pub fn advance(&mut self, outcome: SoaOutcome) -> Transition {
        match outcome {
            SoaOutcome::Answer => Transition::Found(self.candidate().to_string()),
            outcome if outcome.is_negative() => self.descend(),
            _ => Transition::Retry,
        }
    }

    /// Move to the parent of the current candidate, unless at the floor
    fn descend(&mut self) -> Transition {
        if self.remaining_labels <= LABEL_FLOOR {
            return Transition::Exhausted;
        }
        match self.candidate().find('.') {
            Some(dot) => {
                self.start += dot + 1;
                self.remaining_labels -= 1;
                Transition::Descend
            }
            None => Transition::Exhausted,
        }
    }
}

/// Finds the zone apex enclosing a hostname
pub struct ZoneResolver {
    resolver: Arc<dyn SoaResolver>,
    budget: Duration,
    query_timeout: Duration,
    backoff: Duration,
}

impl ZoneResolver {
    pub fn new(resolver: Arc<dyn SoaResolver>, config: &ResolverConfig) -> Self {
        Self {
            resolver,
            budget: config.zone_lookup_timeout(),
            query_timeout: config.soa_query_timeout(),
            backoff: config.retry_backoff(),
        }
    }

    /// Resolve the zone apex name (no trailing dot) for `hostname`
    ///
    /// # Errors
    ///
    /// - [`Error::ZoneLookupTimeout`] when the wall-clock budget runs out
    /// - [`Error::ZoneNotFound`] when the two-label floor answers negatively
    pub async fn resolve_zone(&self, hostname: &Hostname) -> Result<String> {
        let started = Instant::now();
        let mut walk = ZoneWalk::new(hostname);

        loop {
            let elapsed = started.elapsed();
            if elapsed >= self.budget {
                warn!(%hostname, ?elapsed, "timeout looking up soa");
                return Err(Error::ZoneLookupTimeout {
                    hostname: hostname.to_string(),
                    elapsed,
                });
            }

            let candidate = walk.candidate().to_string();
            let outcome = match tokio::time::timeout(
                self.query_timeout,
                self.resolver.query_soa(&candidate, self.query_timeout),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => SoaOutcome::TransientTimeout,
            };
            debug!(%candidate, ?outcome, "soa query");

            match walk.advance(outcome) {
                Transition::Found(zone) => {
                    debug!(%hostname, %zone, "found zone apex");
                    return Ok(zone);
                }
                Transition::Descend => continue,
                Transition::Retry => {
                    info!(%candidate, "timeout attempting to lookup soa record, retrying");
                    tokio::time::sleep(self.backoff).await;
                }
                Transition::Exhausted => {
                    warn!(%hostname, "no zone apex answered soa");
                    return Err(Error::ZoneNotFound {
                        hostname: hostname.to_string(),
                    });
                }
            }
        }
    }
}
