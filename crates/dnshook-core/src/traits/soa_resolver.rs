// # SOA Resolver Trait
//
// Defines the DNS query capability used by the zone resolver: a single SOA
// query for a name, classified into the outcomes the zone walk acts on.
//
// ## Implementations
//
// - hickory-resolver: `dnshook-resolver-hickory` crate
// - Fixed table: `dnshook_core::memory::StaticSoaResolver`

use async_trait::async_trait;
use std::time::Duration;

/// Classified result of one SOA query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoaOutcome {
    /// An SOA record came back: the name is a zone apex
    Answer,
    /// The name exists but has no SOA record
    NoAnswer,
    /// NXDOMAIN
    NoSuchName,
    /// No server could give an authoritative answer
    ServerFailure,
    /// The query timed out; asking again may succeed
    TransientTimeout,
}

impl SoaOutcome {
    /// Definitive "this name is not an apex" answers
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            SoaOutcome::NoAnswer | SoaOutcome::NoSuchName | SoaOutcome::ServerFailure
        )
    }
}

/// Trait for SOA query implementations
///
/// Implementations must never block longer than `timeout` and must not
/// retry internally; a slow query is reported as
/// [`SoaOutcome::TransientTimeout`] and the zone resolver decides what to
/// do with it.
#[async_trait]
pub trait SoaResolver: Send + Sync {
    /// Query the SOA record for `name` (no trailing dot)
    async fn query_soa(&self, name: &str, timeout: Duration) -> SoaOutcome;
}
