//! Test doubles and common utilities for reconciliation contract tests
//!
//! These doubles record every call so tests can assert on how many
//! provider writes a pass performed.

#![allow(dead_code)]

use dydns_core::config::{ReconciliationTarget, SchedulerConfig};
use dydns_core::error::{Error, Result};
use dydns_core::traits::{
    AddressResolver, DnsProvider, DnsRecord, RecordUpdate, ReplyEnvelope, SUCCESS_CODE,
};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

pub const DOMAIN: &str = "example.com";
pub const HOST: &str = "home";

/// Resolver that replays a script of answers, repeating the last one
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<Result<Ipv4Addr>>>>,
    last: Arc<Mutex<Option<Result<Ipv4Addr>>>>,
    call_count: Arc<AtomicUsize>,
    call_times: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedResolver {
    pub fn new(script: Vec<Result<Ipv4Addr>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
            call_times: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Resolver that always answers with `address`
    pub fn fixed(address: Ipv4Addr) -> Self {
        Self::new(vec![Ok(address)])
    }

    /// Get the number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Instants at which resolve() was called
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    /// Create a new ScriptedResolver that shares state with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            call_count: Arc::clone(&other.call_count),
            call_times: Arc::clone(&other.call_times),
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(Instant::now());

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = Some(next);
        }
        (*last)
            .clone()
            .unwrap_or_else(|| Err(Error::resolution("script is empty")))
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// Resolver that never answers
pub struct HangingResolver {
    call_count: Arc<AtomicUsize>,
}

impl HangingResolver {
    pub fn new() -> Self {
        Self {
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for HangingResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    fn resolver_name(&self) -> &'static str {
        "hanging"
    }
}

/// An in-memory DnsProvider that tracks calls
///
/// Successful updates are applied to the stored record list, so a second
/// pass sees the new value the way the real provider would report it.
pub struct MockDnsProvider {
    records: Arc<Mutex<Vec<DnsRecord>>>,
    list_reply: Arc<Mutex<(u32, String)>>,
    update_reply: Arc<Mutex<(u32, String)>>,
    list_transport_error: Arc<Mutex<Option<Error>>>,
    update_transport_error: Arc<Mutex<Option<Error>>>,
    list_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<RecordUpdate>>>,
}

impl MockDnsProvider {
    pub fn new(records: Vec<DnsRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            list_reply: Arc::new(Mutex::new((SUCCESS_CODE, "success".to_string()))),
            update_reply: Arc::new(Mutex::new((SUCCESS_CODE, "success".to_string()))),
            list_transport_error: Arc::new(Mutex::new(None)),
            update_transport_error: Arc::new(Mutex::new(None)),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer list calls with `code` and `detail`
    pub fn with_list_reply(self, code: u32, detail: &str) -> Self {
        *self.list_reply.lock().unwrap() = (code, detail.to_string());
        self
    }

    /// Answer update calls with `code` and `detail`
    pub fn with_update_reply(self, code: u32, detail: &str) -> Self {
        *self.update_reply.lock().unwrap() = (code, detail.to_string());
        self
    }

    /// Fail list calls at the transport layer
    pub fn with_list_transport_error(self, err: Error) -> Self {
        *self.list_transport_error.lock().unwrap() = Some(err);
        self
    }

    /// Fail update calls at the transport layer
    pub fn with_update_transport_error(self, err: Error) -> Self {
        *self.update_transport_error.lock().unwrap() = Some(err);
        self
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Get every update request received
    pub fn updates(&self) -> Vec<RecordUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Current stored records
    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Create a new MockDnsProvider that shares state with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            list_reply: Arc::clone(&other.list_reply),
            update_reply: Arc::clone(&other.update_reply),
            list_transport_error: Arc::clone(&other.list_transport_error),
            update_transport_error: Arc::clone(&other.update_transport_error),
            list_call_count: Arc::clone(&other.list_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            updates: Arc::clone(&other.updates),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, _domain: &str) -> Result<ReplyEnvelope> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.list_transport_error.lock().unwrap().clone() {
            return Err(err);
        }

        let (code, detail) = self.list_reply.lock().unwrap().clone();
        let records = if code == SUCCESS_CODE {
            self.records.lock().unwrap().clone()
        } else {
            Vec::new()
        };

        Ok(ReplyEnvelope::new(code, detail).with_records(records))
    }

    async fn update_record(&self, update: &RecordUpdate) -> Result<ReplyEnvelope> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(update.clone());

        if let Some(err) = self.update_transport_error.lock().unwrap().clone() {
            return Err(err);
        }

        let (code, detail) = self.update_reply.lock().unwrap().clone();
        if code == SUCCESS_CODE {
            let mut records = self.records.lock().unwrap();
            if let Some(record) = records.iter_mut().find(|r| r.record_id == update.record_id) {
                record.value = update.value.clone();
                record.ttl = Some(update.ttl);
            }
        }

        Ok(ReplyEnvelope::new(code, detail))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build an A record
pub fn a_record(record_id: &str, host: &str, value: &str) -> DnsRecord {
    DnsRecord {
        record_id: record_id.to_string(),
        record_type: "A".to_string(),
        host: host.to_string(),
        value: value.to_string(),
        ttl: Some(3603),
    }
}

/// The target used across the contract tests
pub fn target() -> ReconciliationTarget {
    ReconciliationTarget::new(DOMAIN, HOST)
}

/// Scheduler config with the production defaults (tests run on a paused clock)
pub fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig::default()
}
