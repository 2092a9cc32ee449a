//! Contract Test: Failure Surfacing
//!
//! Constraints verified:
//! - A non-300 reply code is a failure even when the transport succeeded
//! - The provider's detail string survives into the outcome
//! - A pass stops at the first failing step; later calls are not made
//! - Resolution, transport and logical failures stay distinguishable

mod common;

use common::*;
use dydns_core::{Error, ReconciliationOutcome, Reconciler};
use std::net::Ipv4Addr;

#[tokio::test]
async fn update_rejection_is_failed_with_detail() {
    let provider = MockDnsProvider::new(vec![a_record("rr1", HOST, "203.0.113.10")])
        .with_update_reply(280, "Invalid value for rrvalue");
    let reconciler = Reconciler::new(
        Box::new(ScriptedResolver::fixed(Ipv4Addr::new(198, 51, 100, 20))),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
    );

    let outcome = reconciler.reconcile(&target()).await;

    match outcome {
        ReconciliationOutcome::Failed(Error::ProviderLogical { code, detail, .. }) => {
            assert_eq!(code, 280);
            assert_eq!(detail, "Invalid value for rrvalue");
        }
        other => panic!("expected a logical failure, got {:?}", other),
    }
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(
        provider.records()[0].value,
        "203.0.113.10",
        "a rejected update leaves the record alone"
    );
}

#[tokio::test]
async fn list_rejection_skips_update() {
    let provider = MockDnsProvider::new(vec![a_record("rr1", HOST, "203.0.113.10")])
        .with_list_reply(110, "Invalid API Key");
    let reconciler = Reconciler::new(
        Box::new(ScriptedResolver::fixed(Ipv4Addr::new(198, 51, 100, 20))),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
    );

    let outcome = reconciler.reconcile(&target()).await;

    assert_eq!(
        outcome,
        ReconciliationOutcome::Failed(Error::provider_logical(
            "list_records",
            110,
            "Invalid API Key"
        ))
    );
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn resolution_failure_stops_before_provider() {
    let provider = MockDnsProvider::new(vec![a_record("rr1", HOST, "203.0.113.10")]);
    let reconciler = Reconciler::new(
        Box::new(ScriptedResolver::new(vec![Err(Error::resolution(
            "connection refused",
        ))])),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
    );

    let outcome = reconciler.reconcile(&target()).await;

    assert!(matches!(
        outcome,
        ReconciliationOutcome::Failed(Error::Resolution(_))
    ));
    assert_eq!(provider.list_call_count(), 0);
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn transport_failure_is_distinct_from_logical_failure() {
    let provider = MockDnsProvider::new(vec![a_record("rr1", HOST, "203.0.113.10")])
        .with_list_transport_error(Error::transport("unexpected HTTP status 502"));
    let reconciler = Reconciler::new(
        Box::new(ScriptedResolver::fixed(Ipv4Addr::new(198, 51, 100, 20))),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
    );

    let outcome = reconciler.reconcile(&target()).await;

    assert_eq!(
        outcome,
        ReconciliationOutcome::Failed(Error::transport("unexpected HTTP status 502"))
    );
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn update_transport_failure_leaves_record_alone() {
    let provider = MockDnsProvider::new(vec![a_record("rr1", HOST, "203.0.113.10")])
        .with_update_transport_error(Error::transport("connection reset"));
    let reconciler = Reconciler::new(
        Box::new(ScriptedResolver::fixed(Ipv4Addr::new(198, 51, 100, 20))),
        Box::new(MockDnsProvider::sharing_counters_with(&provider)),
    );

    let outcome = reconciler.reconcile(&target()).await;

    assert!(
        matches!(outcome, ReconciliationOutcome::Failed(Error::Transport(_))),
        "got {:?}",
        outcome
    );
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(provider.records()[0].value, "203.0.113.10");
}
