//! Configuration types for the dydns system
//!
//! This module defines all configuration structures used throughout the crate.
//! Values are built once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record type managed by dydns. Only IPv4 is supported.
pub const RECORD_TYPE_A: &str = "A";

/// TTL applied to the record on every update
pub const DEFAULT_RECORD_TTL: u32 = 7207;

/// Default polling interval (5 minutes)
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Default per-attempt ceiling for one reconciliation pass
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 30;

/// Bounds accepted for the polling interval
pub const MIN_INTERVAL_SECS: u64 = 10;
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Default NameSilo API base
pub const DEFAULT_PROVIDER_ENDPOINT: &str = "https://www.namesilo.com/api";

/// Default address-echo service
pub const DEFAULT_RESOLVER_URL: &str = "https://ifconfig.me/ip";

/// Main dydns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DydnsConfig {
    /// Record to keep current
    pub target: ReconciliationTarget,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public address resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Loop timing
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl DydnsConfig {
    /// Create a configuration with default resolver and scheduler settings
    pub fn new(target: ReconciliationTarget, provider: ProviderConfig) -> Self {
        Self {
            target,
            provider,
            resolver: ResolverConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.target.validate()?;
        self.provider.validate()?;
        self.resolver.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}

/// The record a running process keeps current
///
/// `host` is the bare record name as the provider reports it (`"www"`,
/// not `"www.example.com"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationTarget {
    /// Domain the record lives in (e.g., "example.com")
    pub domain: String,

    /// Record name without the domain suffix (e.g., "home")
    pub host: String,

    /// TTL written on update
    #[serde(default = "default_record_ttl")]
    pub ttl: u32,
}

impl ReconciliationTarget {
    /// Create a new target with the default TTL
    pub fn new(domain: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            host: host.into(),
            ttl: DEFAULT_RECORD_TTL,
        }
    }

    /// Set the TTL written on update
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// The record type this target manages
    pub fn record_type(&self) -> &'static str {
        RECORD_TYPE_A
    }

    /// Validate domain, host and TTL
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_dns_name("domain", &self.domain)?;
        validate_dns_name("host", &self.host)?;

        if !self.domain.contains('.') {
            return Err(crate::Error::config(format!(
                "domain '{}' must contain at least one dot",
                self.domain
            )));
        }

        if self.ttl == 0 {
            return Err(crate::Error::config("record TTL must be > 0"));
        }

        Ok(())
    }
}

fn default_record_ttl() -> u32 {
    DEFAULT_RECORD_TTL
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API credential (never logged)
    pub api_key: String,

    /// API base URL, without the operation path
    #[serde(default = "default_provider_endpoint")]
    pub endpoint: String,

    /// Perform reads but skip writes
    #[serde(default)]
    pub dry_run: bool,
}

impl ProviderConfig {
    /// Create a live provider configuration against the default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: default_provider_endpoint(),
            dry_run: false,
        }
    }

    /// Override the API base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("provider API key cannot be empty"));
        }
        validate_http_url("provider endpoint", &self.endpoint)
    }
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn default_provider_endpoint() -> String {
    DEFAULT_PROVIDER_ENDPOINT.to_string()
}

/// Public address resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Address-echo URL; the response body must be the bare address
    pub url: String,
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_http_url("resolver URL", &self.url)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RESOLVER_URL.to_string(),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Idle time between the end of one pass and the start of the next
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Ceiling for a single pass, independent of the interval
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Capacity of the event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl SchedulerConfig {
    /// Polling interval as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Per-attempt ceiling as a `Duration`
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Validate the scheduler configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&self.interval_secs) {
            return Err(crate::Error::config(format!(
                "interval must be between {} and {} seconds, got {}",
                MIN_INTERVAL_SECS, MAX_INTERVAL_SECS, self.interval_secs
            )));
        }

        if self.attempt_timeout_secs == 0 {
            return Err(crate::Error::config("attempt timeout must be > 0"));
        }

        if self.attempt_timeout_secs > self.interval_secs {
            return Err(crate::Error::config(format!(
                "attempt timeout ({}s) cannot exceed the interval ({}s)",
                self.attempt_timeout_secs, self.interval_secs
            )));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event channel capacity must be > 0"));
        }

        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_attempt_timeout_secs() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT_SECS
}

fn default_event_channel_capacity() -> usize {
    100
}

/// Basic RFC 1035 label validation for domains and hosts
fn validate_dns_name(field: &str, name: &str) -> Result<(), crate::Error> {
    if name.is_empty() {
        return Err(crate::Error::config(format!("{field} cannot be empty")));
    }

    if name.len() > 253 {
        return Err(crate::Error::config(format!(
            "{field} too long: {} chars (max 253)",
            name.len()
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "{field} '{name}' has an empty label"
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "{field} label too long: {} chars (max 63). Label: '{label}'",
                label.len()
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(crate::Error::config(format!(
                "{field} label contains invalid characters: '{label}'"
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "{field} label cannot start or end with hyphen: '{label}'"
            )));
        }
    }

    Ok(())
}

fn validate_http_url(field: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{field} cannot be empty")));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{field} must use HTTP or HTTPS scheme. Got: {url}"
        )));
    }
    Ok(())
}
