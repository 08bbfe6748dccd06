use hrdesk_core::db::{open_db, open_db_in_memory};
use hrdesk_core::model::lifecycle::{Candidate, CandidatePatch, PreboardingStage};
use hrdesk_core::model::payroll::{PayrollSettings, SalaryComponent};
use hrdesk_core::repo::slot_repo::{SlotRepository, SlotWrite, SqliteSlotRepository};
use hrdesk_core::store::SLOT_SCHEMA_VERSION;
use hrdesk_core::{Record, RecordId, RecordStore, StoreError, StoreEvent, ValidationError};
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

const NAMESPACE: &str = "preboarding";

fn candidate(name: &str) -> Candidate {
    Candidate::new(name, "", "Engineer", "Platform")
}

fn fail_writes(conn: &Connection, namespace: &str) {
    conn.execute_batch(&format!(
        "CREATE TEMP TRIGGER fail_insert_{namespace} BEFORE INSERT ON store_slots
         WHEN NEW.namespace = '{namespace}'
         BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;
         CREATE TEMP TRIGGER fail_update_{namespace} BEFORE UPDATE ON store_slots
         WHEN NEW.namespace = '{namespace}'
         BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;"
    ))
    .unwrap();
}

fn heal_writes(conn: &Connection, namespace: &str) {
    conn.execute_batch(&format!(
        "DROP TRIGGER temp.fail_insert_{namespace};
         DROP TRIGGER temp.fail_update_{namespace};"
    ))
    .unwrap();
}

#[test]
fn add_then_get_returns_record_with_generated_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();

    let id = store.add(candidate("Asha")).unwrap();

    let loaded = store.get(&id).unwrap();
    assert!(id.is_assigned());
    assert_eq!(loaded.name, "Asha");
    assert_eq!(loaded.status, PreboardingStage::OfferPending);
    assert!(loaded.created_at_ms() > 0);
    assert_eq!(loaded.meta.updated_at_ms, loaded.meta.created_at_ms);
    assert_eq!(store.revision(), 1);
}

#[test]
fn rapid_adds_get_distinct_ids_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();

    let ids = (0..5)
        .map(|index| store.add(candidate(&format!("Candidate {index}"))).unwrap())
        .collect::<Vec<_>>();

    let stored = store
        .records()
        .iter()
        .map(|record| record.id().clone())
        .collect::<Vec<_>>();
    assert_eq!(stored, ids);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 5);
}

#[test]
fn add_rejects_duplicates_and_invalid_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();

    let mut first = candidate("Asha");
    first.meta.id = RecordId::new("cand-1");
    store.add(first.clone()).unwrap();

    assert!(matches!(
        store.add(first),
        Err(StoreError::DuplicateId(id)) if id.as_str() == "cand-1"
    ));
    assert!(matches!(
        store.add(candidate("   ")),
        Err(StoreError::Validation(ValidationError::MissingField("name")))
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn unknown_ids_leave_collection_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    store.add(candidate("Asha")).unwrap();
    let before = store.records().to_vec();
    let missing = RecordId::new("missing");

    let patch = CandidatePatch {
        name: Some("Renamed".to_string()),
        ..CandidatePatch::default()
    };
    assert!(matches!(
        store.update(&missing, patch),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.transition(&missing, PreboardingStage::OfferAccepted),
        Err(StoreError::NotFound(_))
    ));
    assert!(store.remove(&missing).unwrap().is_none());
    assert_eq!(store.records(), before.as_slice());
    assert_eq!(store.revision(), 1);
}

#[test]
fn remove_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    let id = store.add(candidate("Asha")).unwrap();

    let removed = store.remove(&id).unwrap().unwrap();
    assert_eq!(removed.name, "Asha");
    assert!(store.remove(&id).unwrap().is_none());
    assert!(store.is_empty());
}

#[test]
fn update_merges_patch_and_rejects_invalid_merge() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    let id = store.add(candidate("Asha")).unwrap();

    store
        .update(
            &id,
            CandidatePatch {
                role: Some("Staff Engineer".to_string()),
                notes: Some(Some("relocating".to_string())),
                ..CandidatePatch::default()
            },
        )
        .unwrap();
    let updated = store.get(&id).unwrap();
    assert_eq!(updated.role, "Staff Engineer");
    assert_eq!(updated.name, "Asha");
    assert_eq!(updated.notes.as_deref(), Some("relocating"));

    let err = store
        .update(
            &id,
            CandidatePatch {
                email: Some("not-an-email".to_string()),
                ..CandidatePatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidEmail("email"))
    ));
    assert_eq!(store.get(&id).unwrap().email, "");
}

#[test]
fn illegal_transitions_are_rejected_and_leave_record_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    let id = store.add(candidate("Asha")).unwrap();

    let err = store
        .transition(&id, PreboardingStage::ReadyToJoin)
        .unwrap_err();
    match err {
        StoreError::IllegalTransition { from, to, .. } => {
            assert_eq!(from, "Offer Pending");
            assert_eq!(to, "Ready to Join");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.get(&id).unwrap().status, PreboardingStage::OfferPending);

    let previous = store
        .transition(&id, PreboardingStage::OfferAccepted)
        .unwrap();
    assert_eq!(previous, PreboardingStage::OfferPending);
}

#[test]
fn transition_named_accepts_labels_and_storage_names() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    let id = store.add(candidate("Asha")).unwrap();

    store.transition_named(&id, "Offer Accepted").unwrap();
    store.transition_named(&id, "bgv_in_progress").unwrap();
    assert_eq!(store.get(&id).unwrap().status, PreboardingStage::BgvInProgress);
    assert!(matches!(
        store.transition_named(&id, "Hired"),
        Err(StoreError::UnknownStatus(name)) if name == "Hired"
    ));
}

#[test]
fn state_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hrdesk.db");

    let id = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteSlotRepository::new(&conn);
        let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
        let id = store.add(candidate("Asha")).unwrap();
        store.transition(&id, PreboardingStage::OfferAccepted).unwrap();
        id
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&id).unwrap().status, PreboardingStage::OfferAccepted);
    assert_eq!(store.revision(), 2);
}

#[test]
fn persisted_payload_is_a_versioned_envelope() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    store.add(candidate("Asha")).unwrap();

    let slot = repo.read_slot(NAMESPACE).unwrap().unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&slot.payload).unwrap();
    assert_eq!(envelope["schema_version"], SLOT_SCHEMA_VERSION);
    assert_eq!(envelope["records"][0]["status"], "offer_pending");
    assert_eq!(envelope["records"][0]["name"], "Asha");
}

#[test]
fn second_handle_rehydrates_after_sync() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut writer = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    let mut reader = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    reader.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    assert!(!reader.sync().unwrap());
    let id = writer.add(candidate("Asha")).unwrap();

    assert!(reader.sync().unwrap());
    assert!(reader.contains(&id));
    assert_eq!(reader.revision(), writer.revision());
    assert!(!reader.sync().unwrap());
    assert_eq!(
        events.borrow().as_slice(),
        &[StoreEvent::Rehydrated { revision: 1 }]
    );
}

#[test]
fn deleted_slot_empties_stale_handle_on_sync() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    store.add(candidate("Asha")).unwrap();

    assert!(repo.delete_slot(NAMESPACE).unwrap());
    assert!(!repo.delete_slot(NAMESPACE).unwrap());
    assert_eq!(repo.slot_revision(NAMESPACE).unwrap(), None);

    assert!(store.sync().unwrap());
    assert!(store.is_empty());
    assert_eq!(store.revision(), 0);

    let reopened = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    assert!(reopened.is_empty());
}

#[test]
fn rewritten_slot_after_delete_does_not_reuse_revisions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut stale = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    stale.add(candidate("Asha")).unwrap();
    assert_eq!(stale.revision(), 1);

    repo.delete_slot(NAMESPACE).unwrap();
    let mut fresh = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    assert!(fresh.is_empty());
    fresh.add(candidate("Ravi")).unwrap();
    assert_eq!(fresh.revision(), 2);

    assert!(stale.sync().unwrap());
    let names: Vec<&str> = stale.records().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Ravi"]);
    assert_eq!(stale.revision(), fresh.revision());
}

#[test]
fn corrupt_slot_fails_open_and_open_or_reset_recovers() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    repo.write_slots(&[SlotWrite {
        namespace: NAMESPACE,
        payload: "{\"records\": [".to_string(),
        schema_version: SLOT_SCHEMA_VERSION,
    }])
    .unwrap();

    assert!(matches!(
        RecordStore::<Candidate, _>::open(NAMESPACE, &repo),
        Err(StoreError::CorruptSlot { namespace, .. }) if namespace == NAMESPACE
    ));

    let mut store = RecordStore::<Candidate, _>::open_or_reset(NAMESPACE, &repo).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.revision(), 1);

    store.add(candidate("Asha")).unwrap();
    assert_eq!(store.revision(), 2);
    let reopened = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    assert_eq!(reopened.len(), 1);
}

#[test]
fn newer_schema_and_duplicate_ids_are_corrupt() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    repo.write_slots(&[SlotWrite {
        namespace: "future",
        payload: "{\"schema_version\": 2, \"records\": []}".to_string(),
        schema_version: SLOT_SCHEMA_VERSION + 1,
    }])
    .unwrap();
    assert!(matches!(
        RecordStore::<Candidate, _>::open("future", &repo),
        Err(StoreError::CorruptSlot { .. })
    ));

    let mut record = candidate("Asha");
    record.meta.id = RecordId::new("dup");
    let records = serde_json::to_string(&vec![record.clone(), record]).unwrap();
    repo.write_slots(&[SlotWrite {
        namespace: "dupes",
        payload: format!("{{\"schema_version\": 1, \"records\": {records}}}"),
        schema_version: SLOT_SCHEMA_VERSION,
    }])
    .unwrap();
    assert!(matches!(
        RecordStore::<Candidate, _>::open("dupes", &repo),
        Err(StoreError::CorruptSlot { message, .. }) if message.contains("duplicate")
    ));
}

#[test]
fn invalid_namespaces_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    assert!(matches!(
        RecordStore::<Candidate, _>::open("Pre Boarding", &repo),
        Err(StoreError::InvalidNamespace(_))
    ));
}

#[test]
fn subscribers_see_each_committed_mutation_once() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let subscription = store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let id = store.add(candidate("Asha")).unwrap();
    store.transition(&id, PreboardingStage::OfferAccepted).unwrap();
    let _ = store.transition(&id, PreboardingStage::ReadyToJoin);
    store.remove(&id).unwrap();
    store.remove(&id).unwrap();

    assert_eq!(
        events.borrow().as_slice(),
        &[
            StoreEvent::Added { id: id.clone() },
            StoreEvent::Transitioned {
                id: id.clone(),
                from: "Offer Pending",
                to: "Offer Accepted",
            },
            StoreEvent::Removed { id: id.clone() },
        ]
    );

    assert!(store.unsubscribe(subscription));
    store.add(candidate("Ravi")).unwrap();
    assert_eq!(events.borrow().len(), 3);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn failed_persistence_rolls_back_memory() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    let id = store.add(candidate("Asha")).unwrap();

    let events = Rc::new(RefCell::new(0_usize));
    let sink = Rc::clone(&events);
    store.subscribe(move |_| *sink.borrow_mut() += 1);

    fail_writes(&conn, NAMESPACE);
    assert!(matches!(
        store.add(candidate("Ravi")),
        Err(StoreError::Repo(_))
    ));
    assert!(matches!(
        store.transition(&id, PreboardingStage::OfferAccepted),
        Err(StoreError::Repo(_))
    ));
    assert!(matches!(store.remove(&id), Err(StoreError::Repo(_))));
    assert!(matches!(store.clear(), Err(StoreError::Repo(_))));

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&id).unwrap().status, PreboardingStage::OfferPending);
    assert_eq!(store.revision(), 1);
    assert_eq!(*events.borrow(), 0);

    heal_writes(&conn, NAMESPACE);
    store.transition(&id, PreboardingStage::OfferAccepted).unwrap();
    assert_eq!(*events.borrow(), 1);
}

#[test]
fn replace_all_and_clear_persist_whole_collection() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    store.add(candidate("Asha")).unwrap();

    let mut duplicate = candidate("Ravi");
    duplicate.meta.id = RecordId::new("same");
    let rejected = store.replace_all(vec![duplicate.clone(), duplicate]);
    assert!(matches!(rejected, Err(StoreError::DuplicateId(_))));
    assert_eq!(store.len(), 1);

    let count = store
        .replace_all(vec![candidate("Ravi"), candidate("Meera")])
        .unwrap();
    assert_eq!(count, 2);
    assert!(store.records().iter().all(|record| record.id().is_assigned()));

    assert_eq!(store.clear().unwrap(), 2);
    assert_eq!(store.clear().unwrap(), 0);
    let reopened = RecordStore::<Candidate, _>::open(NAMESPACE, &repo).unwrap();
    assert!(reopened.is_empty());
}

#[test]
fn settings_persist_with_records_and_are_validated() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    let mut store =
        RecordStore::<SalaryComponent, _, PayrollSettings>::open("payroll", &repo).unwrap();

    store.update_settings(|settings| settings.pay_day = 25).unwrap();
    let err = store
        .update_settings(|settings| settings.pay_day = 40)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidValue { field: "pay_day", .. })
    ));
    assert_eq!(store.settings().pay_day, 25);

    let reopened =
        RecordStore::<SalaryComponent, _, PayrollSettings>::open("payroll", &repo).unwrap();
    assert_eq!(reopened.settings().pay_day, 25);
}
