// # dydnsd - Dynamic DNS Daemon
//
// This is a thin integration layer only. Reconciliation and scheduling
// live in dydns-core; this binary:
// 1. Reads configuration from environment variables
// 2. Builds the address resolver, NameSilo provider and scheduler
// 3. Starts the tokio runtime
// 4. Runs the scheduler until SIGINT/SIGTERM
//
// ## Configuration
//
// ### Target
// - `NAMESILO_API_KEY`: API key (required)
// - `NAMESILO_DOMAIN`: Domain the record lives in (required)
// - `NAMESILO_HOST`: Bare record name, e.g. `home` (required)
// - `DYDNS_RECORD_TTL`: TTL written on update (default 7207)
//
// ### Endpoints
// - `DYDNS_IP_SOURCE_URL`: Address-echo URL (default https://ifconfig.me/ip)
// - `DYDNS_PROVIDER_ENDPOINT`: NameSilo API base (default https://www.namesilo.com/api)
//
// ### Scheduler
// - `DYDNS_INTERVAL_SECS`: Seconds between passes (default 300)
// - `DYDNS_ATTEMPT_TIMEOUT_SECS`: Ceiling for one pass (default 30)
//
// ### Runtime
// - `DYDNS_MODE`: `live` or `dry-run` (default live)
// - `DYDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export NAMESILO_API_KEY=your_key
// export NAMESILO_DOMAIN=example.com
// export NAMESILO_HOST=home
// export DYDNS_MODE=dry-run
//
// dydnsd
// ```

use anyhow::{Context, Result};
use dydns_core::config::{
    DEFAULT_ATTEMPT_TIMEOUT_SECS, DEFAULT_INTERVAL_SECS, DEFAULT_PROVIDER_ENDPOINT,
    DEFAULT_RECORD_TTL, DEFAULT_RESOLVER_URL,
};
use dydns_core::{
    DnsProvider, DydnsConfig, ProviderConfig, ReconciliationTarget, Reconciler, ResolverConfig,
    Scheduler, SchedulerConfig, SchedulerEvent,
};
use dydns_ip_http::HttpAddressResolver;
use dydns_provider_namesilo::NameSiloProvider;
use std::env;
use std::future::Future;
use std::process::ExitCode;
use std::str::FromStr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, debug, error, info, info_span, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DydnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DydnsExitCode> for ExitCode {
    fn from(code: DydnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Whether updates are sent or only logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Live,
    DryRun,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(Mode::DryRun),
            other => anyhow::bail!(
                "DYDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        }
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    dydns: DydnsConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, "NAMESILO_API_KEY")?;
        let domain = required(&lookup, "NAMESILO_DOMAIN")?;
        let host = required(&lookup, "NAMESILO_HOST")?;

        let ttl = parse_or(&lookup, "DYDNS_RECORD_TTL", DEFAULT_RECORD_TTL)?;
        let interval_secs = parse_or(&lookup, "DYDNS_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        let attempt_timeout_secs = parse_or(
            &lookup,
            "DYDNS_ATTEMPT_TIMEOUT_SECS",
            DEFAULT_ATTEMPT_TIMEOUT_SECS,
        )?;
        let mode = parse_or(&lookup, "DYDNS_MODE", Mode::Live)?;

        let endpoint = lookup("DYDNS_PROVIDER_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_PROVIDER_ENDPOINT.to_string());
        let resolver_url =
            lookup("DYDNS_IP_SOURCE_URL").unwrap_or_else(|| DEFAULT_RESOLVER_URL.to_string());

        let log_level = parse_log_level(
            &lookup("DYDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        )?;

        let mut dydns = DydnsConfig::new(
            ReconciliationTarget::new(domain.trim(), host.trim()).with_ttl(ttl),
            ProviderConfig::new(api_key.trim())
                .with_endpoint(endpoint)
                .with_dry_run(mode == Mode::DryRun),
        );
        dydns.resolver = ResolverConfig { url: resolver_url };
        dydns.scheduler = SchedulerConfig {
            interval_secs,
            attempt_timeout_secs,
            ..SchedulerConfig::default()
        };

        Ok(Self { dydns, log_level })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.dydns.validate()?;

        if self.dydns.resolver.url.starts_with("http://") {
            eprintln!(
                "WARNING: DYDNS_IP_SOURCE_URL uses HTTP (not HTTPS). \
                 The reported address could be tampered with in transit."
            );
        }

        Ok(())
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("{} is required. Set it via: export {}=...", key, key),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e)),
    }
}

fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DYDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DydnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DydnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DydnsExitCode::ConfigError.into();
    }

    let target = &config.dydns.target;
    info!(
        host = %target.host,
        domain = %target.domain,
        dry_run = config.dydns.provider.dry_run,
        "Starting dydnsd for {}.{}",
        target.host,
        target.domain
    );

    let (scheduler, events) = match build_scheduler(&config.dydns) {
        Ok(parts) => parts,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DydnsExitCode::ConfigError.into();
        }
    };

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DydnsExitCode::RuntimeError.into();
        }
    };

    let dry_run = config.dydns.provider.dry_run;
    let result = rt.block_on(async {
        if let Err(e) = run_daemon(scheduler, events, dry_run).await {
            error!("Daemon error: {:#}", e);
            DydnsExitCode::RuntimeError
        } else {
            DydnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire the resolver and provider into a scheduler
fn build_scheduler(config: &DydnsConfig) -> Result<(Scheduler, mpsc::Receiver<SchedulerEvent>)> {
    let resolver =
        HttpAddressResolver::new(&config.resolver).context("failed to create address resolver")?;
    let provider =
        NameSiloProvider::new(&config.provider).context("failed to create NameSilo provider")?;

    info!(
        resolver = resolver.url(),
        endpoint = %config.provider.endpoint,
        provider = provider.provider_name(),
        dry_run = provider.is_dry_run(),
        "Components created"
    );

    let reconciler = Reconciler::new(Box::new(resolver), Box::new(provider));
    let parts = Scheduler::new(reconciler, config.target.clone(), config.scheduler.clone())
        .context("failed to create scheduler")?;

    Ok(parts)
}

/// Run the scheduler until a shutdown signal arrives
async fn run_daemon(
    scheduler: Scheduler,
    mut events: mpsc::Receiver<SchedulerEvent>,
    dry_run: bool,
) -> Result<()> {
    // Handlers are installed before the first pass so a failure here is fatal
    let shutdown_signal = shutdown_signal()?;
    let shutdown = CancellationToken::new();

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let signal = shutdown_signal.await;
            info!("Received shutdown signal: {}", signal);
            shutdown.cancel();
        }
    });

    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "Scheduler event");
        }
    });

    // Tags every pass log with the mode
    scheduler
        .run(shutdown)
        .instrument(info_span!("scheduler", dry_run))
        .await;

    // The sender lives in the scheduler; dropping it ends the logger
    drop(scheduler);
    if let Err(e) = event_logger.await {
        warn!("Event logger task failed: {}", e);
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Install handlers for SIGTERM and SIGINT
///
/// The returned future resolves with the name of the first signal received.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Install a CTRL-C handler
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "CTRL-C",
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                "CTRL-C handler failure"
            }
        }
    })
}
