//! Contract Test: Record Reconciliation
//!
//! Constraints verified:
//! - Converging to the published value makes no provider write
//! - Duplicates are reduced to one record; failed cleanup is not fatal
//! - Replace always deletes then creates, with no short-circuit
//! - A write is successful only on the exact status for its operation

mod common;

use common::*;
use dnshook_core::error::{Error, WriteOperation};
use dnshook_core::memory::ProviderCall;
use dnshook_core::{DesiredRecord, MemoryProvider, ReconcileOutcome, RecordType};
use tokio_test::{assert_err, assert_ok};

fn example_zone() -> (MemoryProvider, ScriptedSoaResolver) {
    (
        MemoryProvider::new(["example.com"]),
        ScriptedSoaResolver::new().with_zone("example.com"),
    )
}

#[tokio::test]
async fn converge_is_idempotent() {
    let (provider, resolver) = example_zone();
    let engine = engine(provider.clone(), resolver);
    let hostname = host("home.example.com");
    let desired = [DesiredRecord::for_ip("192.0.2.10".parse().unwrap())];

    let first = assert_ok!(engine.reconcile_converge(&hostname, &desired).await);
    let second = assert_ok!(engine.reconcile_converge(&hostname, &desired).await);

    assert_eq!(first, vec![ReconcileOutcome::Created]);
    assert_eq!(second, vec![ReconcileOutcome::Unchanged]);
    assert_eq!(provider.write_count(), 1, "expected one write for two identical converges");
}

#[tokio::test]
async fn converge_updates_the_existing_record() {
    let (provider, resolver) = example_zone();
    let zone = provider.zone_id("example.com").unwrap();
    let id = provider.insert_record(&zone, "home", RecordType::A, "192.0.2.1");
    let engine = engine(provider.clone(), resolver);

    let outcomes = assert_ok!(
        engine
            .reconcile_converge(
                &host("home.example.com"),
                &[DesiredRecord::new(RecordType::A, "192.0.2.2")],
            )
            .await
    );

    assert_eq!(
        outcomes,
        vec![ReconcileOutcome::Updated {
            previous: "192.0.2.1".to_string()
        }]
    );
    let records = provider.records(&zone, "home", RecordType::A);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].content, "192.0.2.2");
    assert_eq!(records[0].ttl, 60);
}

#[tokio::test]
async fn converge_removes_duplicates() {
    let (provider, resolver) = example_zone();
    let zone = provider.zone_id("example.com").unwrap();
    let keep = provider.insert_record(&zone, "home", RecordType::A, "192.0.2.1");
    provider.insert_record(&zone, "home", RecordType::A, "192.0.2.2");
    provider.insert_record(&zone, "home", RecordType::A, "192.0.2.3");
    let engine = engine(provider.clone(), resolver);

    let outcomes = assert_ok!(
        engine
            .reconcile_converge(
                &host("home.example.com"),
                &[DesiredRecord::new(RecordType::A, "192.0.2.1")],
            )
            .await
    );

    // The first record already matched: only the two duplicates were written
    assert_eq!(outcomes, vec![ReconcileOutcome::Unchanged]);
    assert_eq!(provider.write_count(), 2);
    let records = provider.records(&zone, "home", RecordType::A);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, keep);
}

#[tokio::test]
async fn failed_duplicate_cleanup_does_not_abort_converge() {
    let (memory, resolver) = example_zone();
    let zone = memory.zone_id("example.com").unwrap();
    let primary = memory.insert_record(&zone, "home", RecordType::A, "192.0.2.1");
    memory.insert_record(&zone, "home", RecordType::A, "192.0.2.2");
    let provider = FaultyProvider::new(memory.clone()).failing_deletes(500);
    let engine = engine(provider, resolver);

    let outcomes = assert_ok!(
        engine
            .reconcile_converge(
                &host("home.example.com"),
                &[DesiredRecord::new(RecordType::A, "192.0.2.9")],
            )
            .await
    );

    assert_eq!(
        outcomes,
        vec![ReconcileOutcome::Updated {
            previous: "192.0.2.1".to_string()
        }]
    );
    let records = memory.records(&zone, "home", RecordType::A);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, primary);
    assert_eq!(records[0].content, "192.0.2.9");
}

#[tokio::test]
async fn converge_handles_both_address_families() {
    let (provider, resolver) = example_zone();
    let engine = engine(provider.clone(), resolver);
    let desired = [
        DesiredRecord::for_ip("192.0.2.10".parse().unwrap()),
        DesiredRecord::for_ip("2001:db8::10".parse().unwrap()),
    ];

    let outcomes = assert_ok!(
        engine
            .reconcile_converge(&host("home.example.com"), &desired)
            .await
    );

    assert_eq!(outcomes, vec![ReconcileOutcome::Created, ReconcileOutcome::Created]);
    let zone = provider.zone_id("example.com").unwrap();
    assert_eq!(provider.records(&zone, "home", RecordType::A).len(), 1);
    assert_eq!(provider.records(&zone, "home", RecordType::Aaaa).len(), 1);
}

#[tokio::test]
async fn converge_rejects_two_values_of_one_type() {
    let (provider, resolver) = example_zone();
    let engine = engine(provider.clone(), resolver.clone());
    let desired = [
        DesiredRecord::new(RecordType::A, "192.0.2.1"),
        DesiredRecord::new(RecordType::A, "192.0.2.2"),
    ];

    let err = assert_err!(
        engine
            .reconcile_converge(&host("home.example.com"), &desired)
            .await
    );

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(resolver.query_count(), 0);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn txt_replace_end_to_end() {
    let (provider, resolver) = example_zone();
    let engine = engine(provider.clone(), resolver);
    let hostname = host("test.example.com");
    let zone = provider.zone_id("example.com").unwrap();

    let first = assert_ok!(
        engine
            .reconcile_replace(&hostname, RecordType::Txt, "abc123")
            .await
    );
    assert_eq!(first, ReconcileOutcome::Replaced { deleted: 0 });
    assert_eq!(
        provider.calls().last(),
        Some(&ProviderCall::Create {
            zone_id: zone.clone(),
            name: "test".to_string(),
            record_type: RecordType::Txt,
            content: "abc123".to_string(),
            ttl: 60,
        })
    );

    provider.clear_calls();
    let second = assert_ok!(
        engine
            .reconcile_replace(&hostname, RecordType::Txt, "def456")
            .await
    );
    assert_eq!(second, ReconcileOutcome::Replaced { deleted: 1 });

    let writes: Vec<ProviderCall> = provider.calls().into_iter().filter(|c| c.is_write()).collect();
    assert_eq!(writes.len(), 2);
    assert!(matches!(writes[0], ProviderCall::Delete { .. }));
    assert!(matches!(writes[1], ProviderCall::Create { ref content, .. } if content == "def456"));

    let records = assert_ok!(engine.list_for(&hostname, RecordType::Txt).await);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "def456");
}

#[tokio::test]
async fn replace_with_the_same_value_still_writes() {
    let (provider, resolver) = example_zone();
    let engine = engine(provider.clone(), resolver);
    let hostname = host("test.example.com");

    assert_ok!(engine.reconcile_replace(&hostname, RecordType::Txt, "same").await);
    assert_ok!(engine.reconcile_replace(&hostname, RecordType::Txt, "same").await);

    // create, then delete + create
    assert_eq!(provider.write_count(), 3);
}

#[tokio::test]
async fn replace_aborts_when_a_delete_fails() {
    let (memory, resolver) = example_zone();
    let zone = memory.zone_id("example.com").unwrap();
    memory.insert_record(&zone, "test", RecordType::Txt, "old");
    let provider = FaultyProvider::new(memory.clone()).failing_deletes(404);
    let engine = engine(provider, resolver);

    let err = assert_err!(
        engine
            .reconcile_replace(&host("test.example.com"), RecordType::Txt, "new")
            .await
    );

    match err {
        Error::ProviderWriteFailed {
            operation, status, ..
        } => {
            assert_eq!(operation, WriteOperation::Delete);
            assert_eq!(status, 404);
        }
        other => panic!("expected ProviderWriteFailed, got {:?}", other),
    }
    // No create was attempted
    assert!(!memory
        .calls()
        .iter()
        .any(|c| matches!(c, ProviderCall::Create { .. })));
}

#[tokio::test]
async fn create_failure_surfaces_status_and_body() {
    let (memory, resolver) = example_zone();
    let provider = FaultyProvider::new(memory).failing_creates(400);
    let engine = engine(provider, resolver);

    let err = assert_err!(
        engine
            .reconcile_converge(
                &host("home.example.com"),
                &[DesiredRecord::new(RecordType::A, "192.0.2.1")],
            )
            .await
    );

    let message = err.to_string();
    assert!(message.contains("400"), "{}", message);
    assert!(message.contains("create rejected"), "{}", message);
}

#[tokio::test]
async fn update_failure_is_fatal_and_leaves_the_record() {
    let (memory, resolver) = example_zone();
    let zone = memory.zone_id("example.com").unwrap();
    let id = memory.insert_record(&zone, "home", RecordType::A, "192.0.2.1");
    let provider = FaultyProvider::new(memory.clone()).failing_updates(422);
    let engine = engine(provider, resolver);

    let err = assert_err!(
        engine
            .reconcile_converge(
                &host("home.example.com"),
                &[DesiredRecord::new(RecordType::A, "192.0.2.2")],
            )
            .await
    );

    match err {
        Error::ProviderWriteFailed {
            operation,
            status,
            body,
        } => {
            assert_eq!(operation, WriteOperation::Update);
            assert_eq!(status, 422);
            assert!(body.contains("update rejected"), "{}", body);
        }
        other => panic!("expected ProviderWriteFailed, got {:?}", other),
    }

    let records = memory.records(&zone, "home", RecordType::A);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].content, "192.0.2.1");
}

#[tokio::test]
async fn clear_deletes_every_record() {
    let (provider, resolver) = example_zone();
    let zone = provider.zone_id("example.com").unwrap();
    provider.insert_record(&zone, "test", RecordType::Txt, "one");
    provider.insert_record(&zone, "test", RecordType::Txt, "two");
    provider.insert_record(&zone, "other", RecordType::Txt, "untouched");
    let engine = engine(provider.clone(), resolver);
    let hostname = host("test.example.com");

    let outcome = assert_ok!(engine.clear(&hostname, RecordType::Txt).await);
    assert_eq!(outcome, ReconcileOutcome::Cleared { deleted: 2 });
    assert!(provider.records(&zone, "test", RecordType::Txt).is_empty());
    assert_eq!(provider.records(&zone, "other", RecordType::Txt).len(), 1);

    let again = assert_ok!(engine.clear(&hostname, RecordType::Txt).await);
    assert!(!again.applied());
}

#[tokio::test]
async fn apex_records_use_the_apex_name() {
    let (provider, resolver) = example_zone();
    let engine = engine(provider.clone(), resolver);

    assert_ok!(
        engine
            .reconcile_converge(
                &host("example.com"),
                &[DesiredRecord::new(RecordType::A, "192.0.2.1")],
            )
            .await
    );

    let zone = provider.zone_id("example.com").unwrap();
    assert_eq!(provider.records(&zone, "@", RecordType::A).len(), 1);
}

#[tokio::test]
async fn multi_page_listing_continues_with_the_first_page() {
    let (memory, resolver) = example_zone();
    let zone = memory.zone_id("example.com").unwrap();
    memory.insert_record(&zone, "test", RecordType::Txt, "abc");
    let provider = FaultyProvider::new(memory).with_record_pages(3);
    let engine = engine(provider, resolver);

    let records = assert_ok!(
        engine
            .list_for(&host("test.example.com"), RecordType::Txt)
            .await
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "abc");
}
