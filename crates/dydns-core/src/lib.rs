// # dydns-core
//
// Core library for the dydns dynamic DNS updater.
//
// ## Architecture Overview
//
// This library owns the only part of the system with decision logic:
// - **AddressResolver**: Trait for discovering the current public IPv4 address
// - **DnsProvider**: Trait for listing and updating records via the provider API
// - **Reconciler**: One pass of resolve → list → match → compare → update
// - **Scheduler**: Drives reconciliation passes on a fixed interval until cancelled
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decisions live here, wire formats live in leaf crates
// 2. **Stateless Passes**: Every pass re-derives truth from the provider's record list
// 3. **At Most One Write**: A pass updates the provider only when a real change is detected
// 4. **Non-Fatal Failures**: A failing pass is reported and retried on the next tick
// 5. **Library-First**: The daemon is a thin wiring layer over this crate

pub mod config;
pub mod error;
pub mod reconciler;
pub mod scheduler;
pub mod traits;

// Re-export core types for convenience
pub use config::{
    DydnsConfig, ProviderConfig, ReconciliationTarget, ResolverConfig, SchedulerConfig,
};
pub use error::{Error, Result};
pub use reconciler::{ReconciliationOutcome, Reconciler};
pub use scheduler::{Scheduler, SchedulerEvent};
pub use traits::{AddressResolver, DnsProvider, DnsRecord, RecordUpdate, ReplyEnvelope};
