//! Core traits for the dydns system
//!
//! This module defines the abstract interfaces the reconciler depends on.
//!
//! - [`AddressResolver`]: Discover the current public IPv4 address
//! - [`DnsProvider`]: List and update records via the provider API

pub mod address_resolver;
pub mod dns_provider;

pub use address_resolver::{AddressResolver, parse_public_address};
pub use dns_provider::{DnsProvider, DnsRecord, RecordUpdate, ReplyEnvelope, SUCCESS_CODE};
