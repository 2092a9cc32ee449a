// # NameSilo DNS Provider
//
// This crate provides the NameSilo DNS provider implementation for dydns.
//
// ## Behavior
//
// - ✅ One HTTP GET per trait call
// - ✅ Decodes the uniform `{request, reply}` envelope
// - ✅ Returns the reply code untouched (the reconciler checks it)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (owned by the scheduler's fixed interval)
// - ❌ NO caching (every pass re-reads the record list)
//
// ## Security Requirements
//
// - API key NEVER appears in logs, `Debug` output or error messages
// - Provider MUST fail fast if the key is empty
//
// ## API Reference
//
// Every operation is a GET on `<endpoint>/<operation>` with the query
// parameters `version=1`, `type=json`, `key=<api key>` plus
// operation-specific ones:
//
// - List records: `dnsListRecords?domain=...`
// - Update record: `dnsUpdateRecord?domain=...&rrid=...&rrhost=...&rrvalue=...&rrttl=...`
//
// Responses look like:
//
// ```json
// {
//   "request": { "operation": "dnsListRecords", "ip": "203.0.113.7" },
//   "reply": {
//     "code": 300,
//     "detail": "success",
//     "resource_record": [
//       { "record_id": "1a2b", "type": "A", "host": "home", "value": "203.0.113.7", "ttl": "7207", "distance": 0 }
//     ]
//   }
// }
// ```

use async_trait::async_trait;
use dydns_core::config::ProviderConfig;
use dydns_core::traits::{DnsProvider, DnsRecord, RecordUpdate, ReplyEnvelope, SUCCESS_CODE};
use dydns_core::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// API version query parameter
const API_VERSION: &str = "1";

/// Response format query parameter
const RESPONSE_TYPE: &str = "json";

const LIST_OPERATION: &str = "dnsListRecords";
const UPDATE_OPERATION: &str = "dnsUpdateRecord";

/// NameSilo DNS provider
///
/// Stateless apart from its credential. Each trait call issues exactly one
/// request and decodes the reply envelope.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform list requests
/// - Log the intended update parameters (without the key)
/// - **NOT** send update requests, answering with a synthetic success reply
pub struct NameSiloProvider {
    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// API base URL, without trailing slash
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, list but never update
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for NameSiloProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameSiloProvider")
            .field("api_key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl NameSiloProvider {
    /// Create a new NameSilo provider
    ///
    /// # Errors
    ///
    /// `Error::Config` if the key is empty, the endpoint is not an HTTP(S)
    /// URL, or the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        if config.dry_run {
            tracing::warn!("NameSilo provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
            dry_run: config.dry_run,
        })
    }

    /// Whether updates are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Issue one API call and decode its envelope
    ///
    /// Transport failures, non-2xx statuses and undecodable bodies all
    /// become `Error::Transport`. The reply code is not inspected.
    async fn call(&self, operation: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.endpoint, operation);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("version", API_VERSION),
                ("type", RESPONSE_TYPE),
                ("key", self.api_key.as_str()),
            ])
            .query(params)
            .send()
            .await
            // The request URL carries the key, so strip it from the error
            .map_err(|e| {
                Error::transport(format!("{} request failed: {}", operation, e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(format!(
                "{}: unexpected HTTP status {}",
                operation, status
            )));
        }

        let body = response.text().await.map_err(|e| {
            Error::transport(format!(
                "{}: failed to read response: {}",
                operation,
                e.without_url()
            ))
        })?;

        let decoded: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            Error::transport(format!("{}: malformed JSON response: {}", operation, e))
        })?;

        tracing::debug!(
            operation,
            code = decoded.reply.code,
            detail = %decoded.reply.detail,
            "NameSilo reply"
        );

        Ok(decoded)
    }
}

#[async_trait]
impl DnsProvider for NameSiloProvider {
    async fn list_records(&self, domain: &str) -> Result<ReplyEnvelope> {
        let response = self.call(LIST_OPERATION, &[("domain", domain)]).await?;
        Ok(response.reply.into_envelope())
    }

    async fn update_record(&self, update: &RecordUpdate) -> Result<ReplyEnvelope> {
        let ttl = update.ttl.to_string();

        if self.dry_run {
            tracing::info!(
                domain = %update.domain,
                rrid = %update.record_id,
                rrhost = %update.host,
                rrvalue = %update.value,
                rrttl = %ttl,
                "[DRY-RUN] Would send {}",
                UPDATE_OPERATION
            );
            return Ok(ReplyEnvelope::new(SUCCESS_CODE, "dry-run: update skipped"));
        }

        let response = self
            .call(
                UPDATE_OPERATION,
                &[
                    ("domain", update.domain.as_str()),
                    ("rrid", update.record_id.as_str()),
                    ("rrhost", update.host.as_str()),
                    ("rrvalue", update.value.as_str()),
                    ("rrttl", ttl.as_str()),
                ],
            )
            .await?;

        Ok(response.reply.into_envelope())
    }

    fn provider_name(&self) -> &'static str {
        "namesilo"
    }
}

/// Top-level response shape shared by every operation
#[derive(Debug, Deserialize)]
struct ApiResponse {
    /// Echo of the request; only useful for debugging
    #[serde(default)]
    #[allow(dead_code)]
    request: Option<RequestEcho>,
    reply: Reply,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RequestEcho {
    #[serde(default)]
    operation: String,
    #[serde(default)]
    ip: String,
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(deserialize_with = "u32_from_number_or_string")]
    code: u32,
    #[serde(default)]
    detail: String,
    #[serde(default, deserialize_with = "one_or_many")]
    resource_record: Vec<WireRecord>,
}

impl Reply {
    fn into_envelope(self) -> ReplyEnvelope {
        let records = self
            .resource_record
            .into_iter()
            .map(WireRecord::into_record)
            .collect();
        ReplyEnvelope::new(self.code, self.detail).with_records(records)
    }
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    record_id: String,
    #[serde(rename = "type")]
    record_type: String,
    host: String,
    value: String,
    #[serde(default)]
    ttl: Option<NumberOrString>,
    // Observed as both string and integer; never interpreted
    #[serde(default)]
    #[allow(dead_code)]
    distance: Option<serde_json::Value>,
}

impl WireRecord {
    fn into_record(self) -> DnsRecord {
        DnsRecord {
            record_id: self.record_id,
            record_type: self.record_type,
            host: self.host,
            value: self.value,
            ttl: self.ttl.and_then(NumberOrString::as_u32),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    fn as_u32(self) -> Option<u32> {
        match self {
            Self::Number(n) => u32::try_from(n).ok(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn u32_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?
        .as_u32()
        .ok_or_else(|| serde::de::Error::custom("reply code is not an unsigned integer"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// A single record is sometimes sent as an object instead of an array
fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}
