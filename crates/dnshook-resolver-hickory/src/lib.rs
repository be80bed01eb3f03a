// # hickory SOA Resolver
//
// This crate provides the `SoaResolver` the daemon uses in production,
// backed by `hickory-resolver`.
//
// ## Behavior
//
// - One SOA lookup per call, one attempt, no resolver-side cache
// - The caller's timeout bounds the lookup
// - Errors are classified into `SoaOutcome`s; this resolver never retries
//
// ## Classification
//
// | hickory result                         | outcome            |
// |----------------------------------------|--------------------|
// | SOA answer                             | `Answer`           |
// | no records, NOERROR                    | `NoAnswer`         |
// | no records, NXDOMAIN                   | `NoSuchName`       |
// | no records, SERVFAIL / REFUSED / other | `ServerFailure`    |
// | timeout                                | `TransientTimeout` |
// | no reachable nameserver, I/O, other    | `ServerFailure`    |

use async_trait::async_trait;
use dnshook_core::traits::{SoaOutcome, SoaResolver};
use dnshook_core::{Error, Result};
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::error::ProtoErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use std::time::Duration;

/// SOA resolver over hickory's tokio resolver
pub struct HickorySoaResolver {
    resolver: TokioAsyncResolver,
}

impl std::fmt::Debug for HickorySoaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickorySoaResolver").finish_non_exhaustive()
    }
}

impl HickorySoaResolver {
    /// Resolver using the host's nameservers (`/etc/resolv.conf`)
    pub fn from_system_conf(query_timeout: Duration) -> Result<Self> {
        let (config, opts) = hickory_resolver::system_conf::read_system_conf().map_err(|e| {
            Error::config(format!("failed to read system resolver configuration: {}", e))
        })?;
        Ok(Self::with_opts(config, opts, query_timeout))
    }

    /// Resolver using explicit nameservers
    pub fn new(config: ResolverConfig, query_timeout: Duration) -> Self {
        Self::with_opts(config, ResolverOpts::default(), query_timeout)
    }

    fn with_opts(config: ResolverConfig, mut opts: ResolverOpts, query_timeout: Duration) -> Self {
        opts.timeout = query_timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.use_hosts_file = false;

        tracing::debug!(?query_timeout, "building hickory soa resolver");
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

/// Fully-qualified form of `name`, so no search domain is appended
fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Outcome for a negative answer carrying `code`
fn classify_response_code(code: ResponseCode) -> SoaOutcome {
    match code {
        ResponseCode::NoError => SoaOutcome::NoAnswer,
        ResponseCode::NXDomain => SoaOutcome::NoSuchName,
        _ => SoaOutcome::ServerFailure,
    }
}

/// Outcome for a failed lookup
fn classify(err: &ResolveError) -> SoaOutcome {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            classify_response_code(*response_code)
        }
        ResolveErrorKind::Timeout => SoaOutcome::TransientTimeout,
        ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
            SoaOutcome::TransientTimeout
        }
        _ => SoaOutcome::ServerFailure,
    }
}

#[async_trait]
impl SoaResolver for HickorySoaResolver {
    async fn query_soa(&self, name: &str, timeout: Duration) -> SoaOutcome {
        let lookup = self.resolver.soa_lookup(fqdn(name));

        match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(answer)) => {
                if answer.iter().next().is_some() {
                    SoaOutcome::Answer
                } else {
                    SoaOutcome::NoAnswer
                }
            }
            Ok(Err(err)) => {
                let outcome = classify(&err);
                tracing::debug!(name, error = %err, ?outcome, "soa lookup failed");
                outcome
            }
            Err(_) => SoaOutcome::TransientTimeout,
        }
    }
}
