//! One reconciliation pass
//!
//! The Reconciler is responsible for:
//! - Resolving the current public address via AddressResolver
//! - Listing the domain's records via DnsProvider
//! - Selecting the record for the configured host
//! - Replacing the record only when its value differs
//!
//! ## Pass Flow
//!
//! ```text
//! resolve ──► list ──► match ──► compare ──► update (conditional)
//!    │          │         │          │              │
//!    ▼          ▼         ▼          ▼              ▼
//!  Failed    Failed   NoMatching  AlreadyCurrent  Updated / Failed
//! ```
//!
//! Nothing is retried here. The caller bounds the whole pass with its own
//! timeout, and dropping the future cancels whichever call is in flight.

use crate::config::ReconciliationTarget;
use crate::error::{Error, Result};
use crate::traits::{AddressResolver, DnsProvider, DnsRecord, RecordUpdate};
use std::net::Ipv4Addr;
use tracing::{debug, info};

const LIST_OPERATION: &str = "list_records";
const UPDATE_OPERATION: &str = "update_record";

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// The provider has no A record for the configured host
    NoMatchingRecord {
        host: String,
        domain: String,
    },

    /// The record already holds the public address; nothing was written
    AlreadyCurrent {
        address: Ipv4Addr,
    },

    /// The record was replaced
    Updated {
        /// Value the record held before the update
        previous: String,
        current: Ipv4Addr,
        /// Provider's explanation of the accepted update
        detail: String,
    },

    /// The pass could not complete
    Failed(Error),
}

impl ReconciliationOutcome {
    /// Whether the pass left the record in an unknown or wrong state
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::NoMatchingRecord { .. } | Self::Failed(_))
    }

    /// The error behind a failed outcome
    ///
    /// `NoMatchingRecord` maps to [`Error::RecordNotFound`].
    pub fn error(&self) -> Option<Error> {
        match self {
            Self::NoMatchingRecord { host, domain } => {
                Some(Error::record_not_found(host.clone(), domain.clone()))
            }
            Self::Failed(err) => Some(err.clone()),
            Self::AlreadyCurrent { .. } | Self::Updated { .. } => None,
        }
    }

    /// Short label for structured logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoMatchingRecord { .. } => "no_matching_record",
            Self::AlreadyCurrent { .. } => "already_current",
            Self::Updated { .. } => "updated",
            Self::Failed(_) => "failed",
        }
    }
}

/// Find the authoritative record for a target
///
/// Matching is exact and case-sensitive on the bare host name the
/// provider reports, restricted to A records. The first match in provider
/// order wins.
pub fn find_target_record<'a>(
    records: &'a [DnsRecord],
    target: &ReconciliationTarget,
) -> Option<&'a DnsRecord> {
    records
        .iter()
        .find(|record| record.record_type == target.record_type() && record.host == target.host)
}

/// Performs single reconciliation passes against one provider
///
/// Holds no state between passes beyond its two collaborators.
pub struct Reconciler {
    /// Public address source
    resolver: Box<dyn AddressResolver>,

    /// DNS provider for reading and replacing records
    provider: Box<dyn DnsProvider>,
}

impl Reconciler {
    /// Create a new reconciler
    pub fn new(resolver: Box<dyn AddressResolver>, provider: Box<dyn DnsProvider>) -> Self {
        Self { resolver, provider }
    }

    /// Run one reconciliation pass
    ///
    /// Never returns an error: every failure is folded into
    /// [`ReconciliationOutcome::Failed`].
    #[tracing::instrument(
        name = "reconcile",
        skip_all,
        fields(host = %target.host, domain = %target.domain)
    )]
    pub async fn reconcile(&self, target: &ReconciliationTarget) -> ReconciliationOutcome {
        match self.try_reconcile(target).await {
            Ok(outcome) => outcome,
            Err(err) => ReconciliationOutcome::Failed(err),
        }
    }

    async fn try_reconcile(&self, target: &ReconciliationTarget) -> Result<ReconciliationOutcome> {
        let address = self.resolver.resolve().await?;
        debug!(%address, resolver = self.resolver.resolver_name(), "Resolved public address");

        let listing = self
            .provider
            .list_records(&target.domain)
            .await?
            .ensure_success(LIST_OPERATION)?;
        debug!(records = listing.records.len(), "Listed provider records");

        let Some(record) = find_target_record(&listing.records, target) else {
            return Ok(ReconciliationOutcome::NoMatchingRecord {
                host: target.host.clone(),
                domain: target.domain.clone(),
            });
        };

        let desired = address.to_string();
        if record.value == desired {
            debug!(%address, record_id = %record.record_id, "Record already current");
            return Ok(ReconciliationOutcome::AlreadyCurrent { address });
        }

        info!(
            record_id = %record.record_id,
            previous = %record.value,
            current = %address,
            "Updating {} record via {}",
            target.record_type(),
            self.provider.provider_name()
        );

        let update = RecordUpdate {
            domain: target.domain.clone(),
            record_id: record.record_id.clone(),
            host: target.host.clone(),
            value: desired,
            ttl: target.ttl,
        };

        let reply = self
            .provider
            .update_record(&update)
            .await?
            .ensure_success(UPDATE_OPERATION)?;

        Ok(ReconciliationOutcome::Updated {
            previous: record.value.clone(),
            current: address,
            detail: reply.detail,
        })
    }
}
