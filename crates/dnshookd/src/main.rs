// # dnshookd - DNS record webhook daemon
//
// This daemon is a THIN integration layer: all zone discovery and record
// reconciliation lives in dnshook-core. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the provider, the SOA resolver and the engine
// 4. Serving the HTTP boundary until SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### HTTP
// - `DNSHOOK_LISTEN_ADDR`: Bind address (default 127.0.0.1:8080)
// - `DNSHOOK_AUTHENTICATION`: JSON object of hostname → token (required)
//
// ### DNS Provider
// - `DNSHOOK_PROVIDER_TYPE`: Provider type (dnsimple, memory)
// - `DNSHOOK_PROVIDER_ACCOUNT_ID`: DNSimple account id
// - `DNSHOOK_PROVIDER_API_TOKEN`: DNSimple API token
// - `DNSHOOK_PROVIDER_API_BASE`: DNSimple API base URL (optional)
// - `DNSHOOK_MEMORY_ZONES`: Comma-separated zones (for memory)
//
// ### Engine
// - `DNSHOOK_RECORD_TTL`: TTL of written records in seconds
// - `DNSHOOK_CACHE_CAPACITY`: Number of hostnames kept in the processor cache
// - `DNSHOOK_ZONE_LOOKUP_TIMEOUT_SECS`: Budget for one zone discovery
// - `DNSHOOK_SOA_QUERY_TIMEOUT_MS`: Timeout of a single SOA query
// - `DNSHOOK_SOA_RETRY_BACKOFF_MS`: Pause after a timed-out SOA query
//
// ## Example
//
// ```bash
// export DNSHOOK_PROVIDER_ACCOUNT_ID=1010
// export DNSHOOK_PROVIDER_API_TOKEN=your_token
// export DNSHOOK_AUTHENTICATION='{"_acme-challenge.www.example.com": "s3cret"}'
//
// dnshookd
// ```

mod app;
mod app_state;
mod auth;
mod http_error;
mod routes;
mod trace;

use anyhow::{Context, Result};
use dnshook_core::config::{HookConfig, ProviderConfig};
use dnshook_core::{DnsProvider, HookEngine, MemoryProvider, SoaResolver, StaticSoaResolver};
use std::collections::HashMap;
use std::env;
use std::future::IntoFuture;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::app::create_app;
use crate::app_state::AppState;
use crate::auth::Authenticator;

/// Time in-flight requests get to finish after a shutdown signal
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DnshookExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DnshookExitCode> for ExitCode {
    fn from(code: DnshookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    hook: HookConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider_type =
            lookup("DNSHOOK_PROVIDER_TYPE").unwrap_or_else(|| "dnsimple".to_string());

        let provider = match provider_type.as_str() {
            "dnsimple" => {
                let account_id = lookup("DNSHOOK_PROVIDER_ACCOUNT_ID").context(
                    "DNSHOOK_PROVIDER_ACCOUNT_ID is required when DNSHOOK_PROVIDER_TYPE=dnsimple",
                )?;
                let api_token = lookup("DNSHOOK_PROVIDER_API_TOKEN").context(
                    "DNSHOOK_PROVIDER_API_TOKEN is required when DNSHOOK_PROVIDER_TYPE=dnsimple. \
                    Set it via: export DNSHOOK_PROVIDER_API_TOKEN=your_token",
                )?;
                let mut provider = ProviderConfig::dnsimple(account_id, api_token);
                if let (Some(base), ProviderConfig::Dnsimple { api_base, .. }) =
                    (lookup("DNSHOOK_PROVIDER_API_BASE"), &mut provider)
                {
                    *api_base = base.trim_end_matches('/').to_string();
                }
                provider
            }
            "memory" => ProviderConfig::Memory {
                zones: lookup("DNSHOOK_MEMORY_ZONES")
                    .unwrap_or_default()
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            other => anyhow::bail!(
                "DNSHOOK_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: dnsimple, memory",
                other
            ),
        };

        let mut hook = HookConfig::new(provider);

        if let Some(addr) = lookup("DNSHOOK_LISTEN_ADDR") {
            hook.server.listen_addr = addr;
        }

        let authentication = lookup("DNSHOOK_AUTHENTICATION").context(
            "DNSHOOK_AUTHENTICATION is required. \
            Set it to a JSON object mapping hostnames to tokens",
        )?;
        hook.authentication = serde_json::from_str::<HashMap<String, String>>(&authentication)
            .context("DNSHOOK_AUTHENTICATION must be a JSON object of hostname → token")?;

        hook.records.ttl = parse_var(&lookup, "DNSHOOK_RECORD_TTL", hook.records.ttl)?;
        hook.cache.capacity = parse_var(&lookup, "DNSHOOK_CACHE_CAPACITY", hook.cache.capacity)?;
        hook.resolver.zone_lookup_timeout_secs = parse_var(
            &lookup,
            "DNSHOOK_ZONE_LOOKUP_TIMEOUT_SECS",
            hook.resolver.zone_lookup_timeout_secs,
        )?;
        hook.resolver.soa_query_timeout_ms = parse_var(
            &lookup,
            "DNSHOOK_SOA_QUERY_TIMEOUT_MS",
            hook.resolver.soa_query_timeout_ms,
        )?;
        hook.resolver.retry_backoff_ms = parse_var(
            &lookup,
            "DNSHOOK_SOA_RETRY_BACKOFF_MS",
            hook.resolver.retry_backoff_ms,
        )?;

        Ok(Self {
            hook,
            log_level: lookup("DNSHOOK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.hook.authentication.is_empty() {
            anyhow::bail!("DNSHOOK_AUTHENTICATION must contain at least one hostname");
        }

        if let ProviderConfig::Memory { zones } = &self.hook.provider
            && zones.is_empty()
        {
            anyhow::bail!(
                "DNSHOOK_MEMORY_ZONES must list at least one zone when DNSHOOK_PROVIDER_TYPE=memory"
            );
        }

        if let ProviderConfig::Dnsimple { api_base, .. } = &self.hook.provider
            && api_base.starts_with("http://")
        {
            eprintln!(
                "WARNING: DNSHOOK_PROVIDER_API_BASE uses HTTP (not HTTPS). \
                The API token will be sent in clear text."
            );
        }

        self.hook.validate()?;

        self.level()?;
        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DNSHOOK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

/// Parse `key` when set, otherwise keep `default`
fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number. Got: {}", key, raw)),
        None => Ok(default),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DnshookExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DnshookExitCode::ConfigError.into();
    }

    let log_level = config.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnshookExitCode::ConfigError.into();
    }

    info!("Starting dnshookd daemon");
    info!(
        "Configuration loaded: provider {}, {} authorized hostname(s)",
        config.hook.provider.type_name(),
        config.hook.authentication.len()
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnshookExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let state = match build_state(&config.hook) {
            Ok(state) => state,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DnshookExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(state, &config.hook.server.listen_addr).await {
            error!("Daemon error: {:#}", e);
            DnshookExitCode::RuntimeError
        } else {
            DnshookExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the provider, the SOA resolver, the engine and the authenticator
fn build_state(config: &HookConfig) -> Result<AppState> {
    let (provider, resolver): (Arc<dyn DnsProvider>, Arc<dyn SoaResolver>) = match &config.provider
    {
        #[cfg(feature = "dnsimple")]
        ProviderConfig::Dnsimple { .. } => {
            info!("Using DNSimple provider with system resolvers");
            (
                Arc::new(dnshook_provider_dnsimple::DnsimpleProvider::from_config(
                    &config.provider,
                )?),
                Arc::new(
                    dnshook_resolver_hickory::HickorySoaResolver::from_system_conf(
                        config.resolver.soa_query_timeout(),
                    )?,
                ),
            )
        }
        #[cfg(not(feature = "dnsimple"))]
        ProviderConfig::Dnsimple { .. } => {
            anyhow::bail!("dnshookd was built without the dnsimple feature")
        }
        ProviderConfig::Memory { zones } => {
            warn!("Using in-memory provider: records are lost on exit");
            (
                Arc::new(MemoryProvider::new(zones.iter().cloned())),
                Arc::new(StaticSoaResolver::new(zones.iter().cloned())),
            )
        }
    };

    let engine = HookEngine::new(provider, resolver, config)?;
    let auth = Authenticator::new(config.authentication.clone());
    Ok(AppState::new(engine, auth))
}

/// Serve the HTTP boundary until a shutdown signal, then drain
async fn run_daemon(state: AppState, listen_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    let (signal_tx, mut signal_rx) = oneshot::channel();
    let shutdown = async move {
        match wait_for_shutdown_signal().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown error: {}", e),
        }
        let _ = signal_tx.send(());
    };

    let server = axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => return result.context("HTTP server failed"),
        Ok(()) = &mut signal_rx => {}
    }

    info!("Shutting down daemon, draining in-flight requests");
    match tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, server).await {
        Ok(result) => result.context("HTTP server failed"),
        Err(_) => Err(anyhow::anyhow!(
            "Shutdown timeout after {:?}",
            SHUTDOWN_DRAIN_TIMEOUT
        )),
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
