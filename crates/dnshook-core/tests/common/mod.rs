//! Test doubles and common utilities for contract tests
//!
//! The in-memory provider does the bookkeeping; the doubles here add the
//! failure modes and timing control the contracts need.

#![allow(dead_code)]

use dnshook_core::config::{HookConfig, ProviderConfig};
use dnshook_core::error::Result;
use dnshook_core::model::{RecordId, RecordType, ZoneId};
use dnshook_core::traits::{
    DnsProvider, RecordPage, SoaOutcome, SoaResolver, WriteResponse, ZonePage,
};
use dnshook_core::{HookEngine, MemoryProvider};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

/// An SOA resolver that answers from per-name scripts and logs every query
///
/// Each name has a queue of outcomes; the last one repeats once the queue
/// is down to it. Names without a script are NXDOMAIN.
#[derive(Clone, Default)]
pub struct ScriptedSoaResolver {
    scripts: Arc<Mutex<HashMap<String, VecDeque<SoaOutcome>>>>,
    queried: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSoaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer SOA for `zone` every time
    pub fn with_zone(self, zone: &str) -> Self {
        self.script(zone, [SoaOutcome::Answer])
    }

    /// Answer `name` with `outcomes` in order
    pub fn script(self, name: &str, outcomes: impl IntoIterator<Item = SoaOutcome>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(name.to_string(), outcomes.into_iter().collect());
        self
    }

    /// Names queried so far, in order
    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queried.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl SoaResolver for ScriptedSoaResolver {
    async fn query_soa(&self, name: &str, _timeout: Duration) -> SoaOutcome {
        self.queried.lock().unwrap().push(name.to_string());

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(name) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().copied().unwrap_or(SoaOutcome::NoSuchName),
            None => SoaOutcome::NoSuchName,
        }
    }
}

/// An SOA resolver whose queries never complete
#[derive(Clone, Default)]
pub struct HangingSoaResolver {
    query_count: Arc<AtomicUsize>,
}

impl HangingSoaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SoaResolver for HangingSoaResolver {
    async fn query_soa(&self, _name: &str, _timeout: Duration) -> SoaOutcome {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<SoaOutcome>().await
    }
}

/// An SOA resolver that holds queries for one name at a barrier
///
/// Lets two concurrent zone walks overlap deterministically.
pub struct GatedSoaResolver {
    inner: ScriptedSoaResolver,
    gate: String,
    barrier: Arc<Barrier>,
}

impl GatedSoaResolver {
    pub fn new(inner: ScriptedSoaResolver, gate: &str, parties: usize) -> Self {
        Self {
            inner,
            gate: gate.to_string(),
            barrier: Arc::new(Barrier::new(parties)),
        }
    }
}

#[async_trait::async_trait]
impl SoaResolver for GatedSoaResolver {
    async fn query_soa(&self, name: &str, timeout: Duration) -> SoaOutcome {
        if name == self.gate {
            self.barrier.wait().await;
        }
        self.inner.query_soa(name, timeout).await
    }
}

/// A provider that forwards to a [`MemoryProvider`] with injected faults
#[derive(Clone)]
pub struct FaultyProvider {
    inner: MemoryProvider,
    delete_status: Option<u16>,
    create_status: Option<u16>,
    update_status: Option<u16>,
    record_pages: u32,
    zone_listings: Arc<AtomicUsize>,
}

impl FaultyProvider {
    pub fn new(inner: MemoryProvider) -> Self {
        Self {
            inner,
            delete_status: None,
            create_status: None,
            update_status: None,
            record_pages: 1,
            zone_listings: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer every delete with `status` without deleting anything
    pub fn failing_deletes(mut self, status: u16) -> Self {
        self.delete_status = Some(status);
        self
    }

    /// Answer every create with `status` without creating anything
    pub fn failing_creates(mut self, status: u16) -> Self {
        self.create_status = Some(status);
        self
    }

    /// Answer every update with `status` without changing anything
    pub fn failing_updates(mut self, status: u16) -> Self {
        self.update_status = Some(status);
        self
    }

    /// Report this many pages for every record listing
    pub fn with_record_pages(mut self, pages: u32) -> Self {
        self.record_pages = pages;
        self
    }

    /// Number of list_zones calls made
    pub fn zone_listings(&self) -> usize {
        self.zone_listings.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DnsProvider for FaultyProvider {
    async fn list_zones(&self, page: u32, page_size: u32) -> Result<ZonePage> {
        self.zone_listings.fetch_add(1, Ordering::SeqCst);
        self.inner.list_zones(page, page_size).await
    }

    async fn list_records(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
    ) -> Result<RecordPage> {
        let mut page = self.inner.list_records(zone_id, name, record_type).await?;
        page.total_pages = self.record_pages;
        Ok(page)
    }

    async fn create_record(
        &self,
        zone_id: &ZoneId,
        name: &str,
        record_type: RecordType,
        content: &str,
        ttl: u32,
    ) -> Result<WriteResponse> {
        if let Some(status) = self.create_status {
            return Ok(WriteResponse::new(status, "{\"message\":\"create rejected\"}"));
        }
        self.inner
            .create_record(zone_id, name, record_type, content, ttl)
            .await
    }

    async fn update_record(
        &self,
        zone_id: &ZoneId,
        record_id: &RecordId,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<WriteResponse> {
        if let Some(status) = self.update_status {
            return Ok(WriteResponse::new(status, "{\"message\":\"update rejected\"}"));
        }
        self.inner
            .update_record(zone_id, record_id, name, content, ttl)
            .await
    }

    async fn delete_record(&self, zone_id: &ZoneId, record_id: &RecordId) -> Result<WriteResponse> {
        if let Some(status) = self.delete_status {
            return Ok(WriteResponse::new(status, "{\"message\":\"delete rejected\"}"));
        }
        self.inner.delete_record(zone_id, record_id).await
    }

    fn provider_name(&self) -> &'static str {
        "faulty"
    }
}

/// Configuration with default timings for a memory provider hosting `zones`
pub fn memory_config(zones: &[&str]) -> HookConfig {
    HookConfig::new(ProviderConfig::Memory {
        zones: zones.iter().map(|z| z.to_string()).collect(),
    })
}

/// Engine over a provider and resolver, with default settings
pub fn engine<P, R>(provider: P, resolver: R) -> HookEngine
where
    P: DnsProvider + 'static,
    R: SoaResolver + 'static,
{
    engine_with_config(provider, resolver, &memory_config(&["example.com"]))
}

pub fn engine_with_config<P, R>(provider: P, resolver: R, config: &HookConfig) -> HookEngine
where
    P: DnsProvider + 'static,
    R: SoaResolver + 'static,
{
    HookEngine::new(Arc::new(provider), Arc::new(resolver), config)
        .expect("engine construction succeeds")
}

pub fn host(name: &str) -> dnshook_core::Hostname {
    dnshook_core::Hostname::parse(name).expect("valid hostname")
}
