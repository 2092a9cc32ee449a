// # DNS Provider Trait
//
// Defines the interface for reading and replacing DNS records via the
// provider's HTTP API.
//
// ## Implementations
//
// - NameSilo: `dydns-provider-namesilo` crate
//
// ## Reply Envelope
//
// The provider does not use HTTP status codes to signal logical outcome.
// Every reply carries a `code`; only `SUCCESS_CODE` (300) means the
// operation happened. Implementations return the decoded envelope as-is
// and leave the code check to the caller.

use async_trait::async_trait;

/// Reply code the provider uses for success on every operation
pub const SUCCESS_CODE: u32 = 300;

/// A DNS record as reported by the provider
///
/// Transient: fetched fresh every pass, compared, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-assigned identifier
    pub record_id: String,
    /// Record type ("A", "AAAA", "CNAME", ...)
    pub record_type: String,
    /// Record name as the provider reports it
    pub host: String,
    /// Record value (an IP literal for A records)
    pub value: String,
    /// Time-to-live, if the provider reported one
    pub ttl: Option<u32>,
}

/// Decoded reply of a provider operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyEnvelope {
    /// Provider reply code
    pub code: u32,
    /// Human-readable explanation of `code`
    pub detail: String,
    /// Records, for list operations; empty otherwise
    pub records: Vec<DnsRecord>,
}

impl ReplyEnvelope {
    /// Create an envelope without records
    pub fn new(code: u32, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            records: Vec::new(),
        }
    }

    /// Attach a record list
    pub fn with_records(mut self, records: Vec<DnsRecord>) -> Self {
        self.records = records;
        self
    }

    /// Whether the provider reported success
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Turn a non-success reply into `Error::ProviderLogical`
    ///
    /// # Parameters
    ///
    /// - `operation`: Operation name, carried into the error for diagnosis
    pub fn ensure_success(self, operation: &str) -> Result<Self, crate::Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(crate::Error::provider_logical(operation, self.code, self.detail))
        }
    }
}

/// Parameters of a record replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    /// Domain the record lives in
    pub domain: String,
    /// Identifier of the record being replaced
    pub record_id: String,
    /// Bare record name
    pub host: String,
    /// New record value
    pub value: String,
    /// TTL to write
    pub ttl: u32,
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoint only
/// - ✅ Decode provider-specific responses into [`ReplyEnvelope`]
///
/// ## Forbidden Capabilities
/// - ❌ Interpret the reply code (owned by `Reconciler`)
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
/// - ❌ Implement retry logic or backoff (owned by `Scheduler`)
/// - ❌ Cache records beyond a single request
/// - ❌ Spawn tasks or threads
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List all records of a domain
    ///
    /// # Returns
    ///
    /// - `Ok(ReplyEnvelope)`: The decoded reply, whatever its code
    /// - `Err(Error::Transport)`: Connection failure, non-2xx status, or
    ///   an undecodable body
    async fn list_records(&self, domain: &str) -> Result<ReplyEnvelope, crate::Error>;

    /// Replace an existing record
    ///
    /// Not idempotent at the HTTP layer: every call counts against the
    /// provider's own rate and audit policy.
    ///
    /// # Returns
    ///
    /// Same contract as [`list_records`](Self::list_records); `records`
    /// is empty.
    async fn update_record(&self, update: &RecordUpdate) -> Result<ReplyEnvelope, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
