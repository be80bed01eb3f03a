// # In-Memory Implementations
//
// Provider and SOA resolver that need no network, for local runs and tests.

pub mod provider;
pub mod soa;

pub use provider::{MemoryProvider, ProviderCall};
pub use soa::StaticSoaResolver;
