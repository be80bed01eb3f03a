// # dnshook-core
//
// Core library for the dnshook DNS record webhook.
//
// ## Architecture Overview
//
// A caller names a hostname and the value it wants published. The core:
// - **ZoneResolver**: walks SOA queries up the hostname to find its zone apex
// - **ZoneDirectoryClient**: maps the apex to the provider's zone id
// - **ProcessorCache**: keeps the resulting per-hostname binding (LRU)
// - **Reconciler**: converges, replaces or clears the provider's records
// - **HookEngine**: the facade the HTTP boundary calls
//
// Provider and DNS access sit behind the `DnsProvider` and `SoaResolver`
// traits. Real implementations live in their own crates; in-memory ones
// live in `memory`.
//
// ## Design Principles
//
// 1. **Library-First**: the daemon is a thin HTTP layer over `HookEngine`
// 2. **Idempotency**: converging to a value already published writes nothing
// 3. **Bounded discovery**: the zone walk is limited by labels and by time
// 4. **No background work**: everything happens inside a caller's request

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod model;
pub mod processor;
pub mod reconcile;
pub mod record;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use cache::ProcessorCache;
pub use config::{HookConfig, ProviderConfig, ResolverConfig};
pub use engine::HookEngine;
pub use error::{Error, Result, WriteOperation};
pub use memory::{MemoryProvider, StaticSoaResolver};
pub use model::{
    DesiredRecord, ExistingRecord, Hostname, ReconcileOutcome, RecordId, RecordName, RecordType,
    Zone, ZoneId,
};
pub use processor::Processor;
pub use traits::{DnsProvider, SoaOutcome, SoaResolver};
