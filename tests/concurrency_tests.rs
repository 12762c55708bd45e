mod common;

use std::sync::Arc;

use common::{date, seeded_backend, RacingStore};
use intern_letters_server::certificate::coordinator::{IssuanceCoordinator, Supersession};
use intern_letters_server::certificate::positions::PositionTable;
use intern_letters_server::certificate::unlock::FixedClock;
use intern_letters_server::certificate::IssuanceError;

#[tokio::test]
async fn test_racing_issuances_converge_on_one_record() {
    let backend = seeded_backend();
    let coordinator = IssuanceCoordinator::new(
        Arc::new(RacingStore::new(backend.clone())),
        backend.clone(),
        backend.clone(),
        Arc::new(PositionTable::default()),
        Arc::new(FixedClock(date(2024, 5, 1))),
    );

    let (first, second) = futures::join!(
        coordinator.get_or_create("RS001"),
        coordinator.get_or_create("RS001")
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(first.certification_id, second.certification_id);
    assert_eq!(backend.certificate_count(), 1);
    // Both requests reached the allocator; the loser's identifier is discarded.
    assert_eq!(backend.allocations(), 2);
}

#[tokio::test]
async fn test_superseded_request_is_cancelled() {
    let backend = seeded_backend();
    let coordinator = IssuanceCoordinator::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        Arc::new(PositionTable::default()),
        Arc::new(FixedClock(date(2024, 5, 1))),
    );
    let supersession = Supersession::new();

    let stale = supersession.begin("RS001");
    let fresh = supersession.begin("RS001");
    assert!(stale.token().is_cancelled());

    let result = coordinator
        .get_or_create_cancellable("RS001", stale.token())
        .await;
    assert!(matches!(result, Err(IssuanceError::Cancelled)));
    drop(stale);
    assert_eq!(supersession.inflight(), 1);

    let record = coordinator
        .get_or_create_cancellable("RS001", fresh.token())
        .await
        .unwrap();
    assert_eq!(record.certification_id, "DS05001");
    drop(fresh);
    assert_eq!(supersession.inflight(), 0);
}

#[tokio::test]
async fn test_issuances_for_different_interns_get_distinct_ids() {
    let backend = seeded_backend();
    let coordinator = IssuanceCoordinator::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        Arc::new(PositionTable::default()),
        Arc::new(FixedClock(date(2024, 7, 1))),
    );

    let (ravi, anitha) = futures::join!(
        coordinator.get_or_create("RS001"),
        coordinator.get_or_create("RS002")
    );
    let ravi = ravi.unwrap();
    let anitha = anitha.unwrap();

    assert_ne!(ravi.certification_id, anitha.certification_id);
    assert_eq!(ravi.certification_id, "DS07001");
    assert_eq!(anitha.certification_id, "JFS07001");
    assert_eq!(backend.certificate_count(), 2);
}
