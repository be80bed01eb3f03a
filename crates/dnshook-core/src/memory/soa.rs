//! SOA resolver answering from a fixed table
//!
//! Pairs with [`super::MemoryProvider`]: the zones the provider hosts are
//! the names that answer SOA. Everything else is NXDOMAIN.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::traits::{SoaOutcome, SoaResolver};

#[derive(Debug, Clone, Default)]
pub struct StaticSoaResolver {
    outcomes: HashMap<String, SoaOutcome>,
}

impl StaticSoaResolver {
    /// Answer SOA for each of `zones`
    pub fn new<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let outcomes = zones
            .into_iter()
            .map(|zone| (zone.into(), SoaOutcome::Answer))
            .collect();
        Self { outcomes }
    }

    /// Answer `name` with a specific outcome
    pub fn with_outcome(mut self, name: impl Into<String>, outcome: SoaOutcome) -> Self {
        self.outcomes.insert(name.into(), outcome);
        self
    }
}

#[async_trait]
impl SoaResolver for StaticSoaResolver {
    async fn query_soa(&self, name: &str, _timeout: Duration) -> SoaOutcome {
        let name = name.strip_suffix('.').unwrap_or(name);
        self.outcomes
            .get(name)
            .copied()
            .unwrap_or(SoaOutcome::NoSuchName)
    }
}
