//! Generic in-memory record store persisted to one namespace slot.
//!
//! # Responsibility
//! - Own the authoritative collection of one record kind.
//! - Provide the only mutation surface: add, update, transition, remove.
//! - Persist the full slot after each mutation, then notify subscribers.
//!
//! # Invariants
//! - Record ids are assigned and unique within the collection.
//! - Every stored record passed `Record::validate()`.
//! - Status changes follow the status enum's `allowed_next` table.
//! - In-memory state never diverges from the last committed slot: a failed
//!   write rolls the collection back before the error is returned.

use super::error::{StoreError, StoreResult};
use super::event::{StoreEvent, SubscriptionId, Subscribers};
use super::{now_epoch_ms, StoreSettings};
use crate::model::record::{Record, RecordId};
use crate::model::status::Status;
use crate::repo::slot_repo::{SlotRepository, SlotWrite, StoredSlot};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Envelope schema written by this build.
pub const SLOT_SCHEMA_VERSION: u32 = 1;

const MAX_NAMESPACE_LEN: usize = 64;

#[derive(Serialize)]
struct SlotEnvelopeRef<'a, R, A> {
    schema_version: u32,
    records: &'a [R],
    settings: &'a A,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "R: DeserializeOwned, A: DeserializeOwned + Default"))]
struct SlotEnvelope<R, A> {
    schema_version: u32,
    records: Vec<R>,
    #[serde(default)]
    settings: A,
}

/// Record collection for one namespace.
///
/// `A` is an auxiliary settings value persisted in the same slot (for
/// example payroll cycle configuration); stores without settings use `()`.
pub struct RecordStore<'s, R, S, A = ()>
where
    R: Record,
    S: SlotRepository + ?Sized,
    A: StoreSettings,
{
    pub(super) namespace: String,
    pub(super) repo: &'s S,
    pub(super) records: Vec<R>,
    pub(super) settings: A,
    pub(super) revision: i64,
    subscribers: Subscribers,
}

impl<'s, R, S, A> RecordStore<'s, R, S, A>
where
    R: Record,
    S: SlotRepository + ?Sized,
    A: StoreSettings,
{
    /// Opens the store and hydrates it from its slot.
    ///
    /// # Errors
    /// - `InvalidNamespace` for blank or non `[a-z0-9_.-]` namespaces.
    /// - `CorruptSlot` when the persisted payload cannot be decoded or holds
    ///   invalid records.
    pub fn open(namespace: &str, repo: &'s S) -> StoreResult<Self> {
        let mut store = Self::empty(validate_namespace(namespace)?, repo);
        if let Some(slot) = repo.read_slot(&store.namespace)? {
            let (records, settings) = decode_slot::<R, A>(&slot)?;
            store.records = records;
            store.settings = settings;
            store.revision = slot.revision;
        }

        info!(
            "event=store_open module=store status=ok namespace={} kind={} records={} revision={}",
            store.namespace,
            R::KIND,
            store.records.len(),
            store.revision
        );
        Ok(store)
    }

    /// Like [`RecordStore::open`], but starts empty when the slot is corrupt.
    ///
    /// The corrupt slot stays on disk until the next successful write
    /// replaces it.
    pub fn open_or_reset(namespace: &str, repo: &'s S) -> StoreResult<Self> {
        match Self::open(namespace, repo) {
            Err(StoreError::CorruptSlot { namespace, .. }) => {
                warn!(
                    "event=store_open module=store status=error namespace={namespace} kind={} error_code=corrupt_slot action=reset",
                    R::KIND
                );
                let mut store = Self::empty(namespace, repo);
                store.revision = repo.slot_revision(&store.namespace)?.unwrap_or(0);
                Ok(store)
            }
            other => other,
        }
    }

    fn empty(namespace: String, repo: &'s S) -> Self {
        Self {
            namespace,
            repo,
            records: Vec::new(),
            settings: A::default(),
            revision: 0,
            subscribers: Subscribers::default(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Slot revision this store last wrote or loaded; `0` if never persisted.
    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Records in display (insertion) order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn find(&self, predicate: impl Fn(&R) -> bool) -> Option<&R> {
        self.records.iter().find(|record| predicate(record))
    }

    pub fn with_status(&self, status: R::Status) -> Vec<&R> {
        self.records
            .iter()
            .filter(|record| record.status() == status)
            .collect()
    }

    pub fn settings(&self) -> &A {
        &self.settings
    }

    /// Registers a listener called after every committed mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Appends a record, generating an id when unassigned.
    ///
    /// # Errors
    /// - `DuplicateId` when the supplied id is already present.
    /// - `Validation` when required fields are missing.
    pub fn add(&mut self, mut record: R) -> StoreResult<RecordId> {
        self.prepare_insert(&mut record, now_epoch_ms())?;
        let id = record.id().clone();

        self.records.push(record);
        self.persist_or_rollback("add", |store| {
            store.records.pop();
        })?;

        info!(
            "event=store_add module=store status=ok namespace={} kind={} id={id} revision={}",
            self.namespace,
            R::KIND,
            self.revision
        );
        self.emit(StoreEvent::Added { id: id.clone() });
        Ok(id)
    }

    /// Merges `patch` into the record with `id`.
    ///
    /// # Errors
    /// - `NotFound` for unknown ids; the collection is unchanged.
    /// - `Validation` when the merged record is invalid; the record is
    ///   unchanged.
    pub fn update(&mut self, id: &RecordId, patch: R::Patch) -> StoreResult<()> {
        let index = self.require_position(id)?;
        let mut updated = self.records[index].clone();
        updated.apply_patch(patch);
        updated.validate()?;
        touch(&mut updated, now_epoch_ms());

        let previous = std::mem::replace(&mut self.records[index], updated);
        self.persist_or_rollback("update", move |store| {
            store.records[index] = previous;
        })?;

        info!(
            "event=store_update module=store status=ok namespace={} kind={} id={id} revision={}",
            self.namespace,
            R::KIND,
            self.revision
        );
        self.emit(StoreEvent::Updated { id: id.clone() });
        Ok(())
    }

    /// Moves the record to `target`; returns the previous status.
    ///
    /// # Errors
    /// - `NotFound` for unknown ids.
    /// - `IllegalTransition` when `target` is not an allowed successor of
    ///   the current status.
    pub fn transition(&mut self, id: &RecordId, target: R::Status) -> StoreResult<R::Status> {
        self.apply_transition(id, target, None)
    }

    /// Resolves `name` (storage string or label) and transitions to it.
    pub fn transition_named(&mut self, id: &RecordId, name: &str) -> StoreResult<R::Status> {
        let target = <R::Status as Status>::parse(name)
            .ok_or_else(|| StoreError::UnknownStatus(name.trim().to_string()))?;
        self.apply_transition(id, target, None)
    }

    /// Applies `patch` and the status change as one committed mutation.
    pub fn transition_with_patch(
        &mut self,
        id: &RecordId,
        target: R::Status,
        patch: R::Patch,
    ) -> StoreResult<R::Status> {
        self.apply_transition(id, target, Some(patch))
    }

    fn apply_transition(
        &mut self,
        id: &RecordId,
        target: R::Status,
        patch: Option<R::Patch>,
    ) -> StoreResult<R::Status> {
        let index = self.require_position(id)?;
        let from = self.records[index].status();
        if !from.can_transition_to(target) {
            warn!(
                "event=store_transition module=store status=error namespace={} kind={} id={id} from={} to={} error_code=illegal_transition",
                self.namespace,
                R::KIND,
                from.as_str(),
                target.as_str()
            );
            return Err(StoreError::IllegalTransition {
                id: id.clone(),
                from: from.label(),
                to: target.label(),
            });
        }

        let now = now_epoch_ms();
        let mut updated = self.records[index].clone();
        if let Some(patch) = patch {
            updated.apply_patch(patch);
        }
        updated.set_status(target);
        updated.on_transition(from, target, now);
        updated.validate()?;
        touch(&mut updated, now);

        let previous = std::mem::replace(&mut self.records[index], updated);
        self.persist_or_rollback("transition", move |store| {
            store.records[index] = previous;
        })?;

        info!(
            "event=store_transition module=store status=ok namespace={} kind={} id={id} from={} to={} revision={}",
            self.namespace,
            R::KIND,
            from.as_str(),
            target.as_str(),
            self.revision
        );
        self.emit(StoreEvent::Transitioned {
            id: id.clone(),
            from: from.label(),
            to: target.label(),
        });
        Ok(from)
    }

    /// Hard-deletes the record; `Ok(None)` when it was not present.
    pub fn remove(&mut self, id: &RecordId) -> StoreResult<Option<R>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let removed = self.records.remove(index);
        let restore = removed.clone();
        self.persist_or_rollback("remove", move |store| {
            store.records.insert(index, restore);
        })?;

        info!(
            "event=store_remove module=store status=ok namespace={} kind={} id={id} revision={}",
            self.namespace,
            R::KIND,
            self.revision
        );
        self.emit(StoreEvent::Removed { id: id.clone() });
        Ok(Some(removed))
    }

    /// Removes every record; returns how many were removed.
    pub fn clear(&mut self) -> StoreResult<usize> {
        if self.records.is_empty() {
            return Ok(0);
        }

        let previous = std::mem::take(&mut self.records);
        let count = previous.len();
        self.persist_or_rollback("clear", move |store| store.records = previous)?;

        info!(
            "event=store_clear module=store status=ok namespace={} kind={} removed={count}",
            self.namespace,
            R::KIND
        );
        self.emit(StoreEvent::Cleared);
        Ok(count)
    }

    /// Replaces the whole collection with already-fetched records.
    ///
    /// Unassigned ids are generated; the batch is rejected as a whole on the
    /// first duplicate or invalid record.
    pub fn replace_all(&mut self, records: Vec<R>) -> StoreResult<usize> {
        let now = now_epoch_ms();
        let mut seen = HashSet::with_capacity(records.len());
        let mut prepared = Vec::with_capacity(records.len());

        for mut record in records {
            if !record.id().is_assigned() {
                record.meta_mut().id = RecordId::generate();
            }
            if !seen.insert(record.id().clone()) {
                return Err(StoreError::DuplicateId(record.id().clone()));
            }
            record.validate()?;
            stamp_created(&mut record, now);
            prepared.push(record);
        }

        let count = prepared.len();
        let previous = std::mem::replace(&mut self.records, prepared);
        self.persist_or_rollback("replace", move |store| store.records = previous)?;

        info!(
            "event=store_replace module=store status=ok namespace={} kind={} records={count}",
            self.namespace,
            R::KIND
        );
        self.emit(StoreEvent::Replaced { count });
        Ok(count)
    }

    /// Mutates the auxiliary settings through a validated copy.
    pub fn update_settings(&mut self, change: impl FnOnce(&mut A)) -> StoreResult<()> {
        let mut next = self.settings.clone();
        change(&mut next);
        next.validate()?;

        let previous = std::mem::replace(&mut self.settings, next);
        self.persist_or_rollback("settings", move |store| store.settings = previous)?;

        info!(
            "event=store_settings module=store status=ok namespace={} revision={}",
            self.namespace, self.revision
        );
        self.emit(StoreEvent::SettingsChanged);
        Ok(())
    }

    /// Reloads from the slot when another handle wrote since this store's
    /// last read or write. Local state is overwritten.
    ///
    /// Returns whether a rehydrate happened.
    pub fn sync(&mut self) -> StoreResult<bool> {
        let stored_revision = self.repo.slot_revision(&self.namespace)?.unwrap_or(0);
        if stored_revision == self.revision {
            return Ok(false);
        }

        let (records, settings, revision) = match self.repo.read_slot(&self.namespace)? {
            Some(slot) => {
                let (records, settings) = decode_slot::<R, A>(&slot)?;
                (records, settings, slot.revision)
            }
            None => (Vec::new(), A::default(), 0),
        };
        self.records = records;
        self.settings = settings;
        self.revision = revision;

        info!(
            "event=store_sync module=store status=ok namespace={} kind={} records={} revision={revision}",
            self.namespace,
            R::KIND,
            self.records.len()
        );
        self.emit(StoreEvent::Rehydrated { revision });
        Ok(true)
    }

    pub(super) fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    fn require_position(&self, id: &RecordId) -> StoreResult<usize> {
        self.position(id).ok_or_else(|| {
            warn!(
                "event=store_lookup module=store status=error namespace={} kind={} id={id} error_code=not_found",
                self.namespace,
                R::KIND
            );
            StoreError::NotFound(id.clone())
        })
    }

    /// Assigns or checks the id, validates, and stamps timestamps.
    pub(super) fn prepare_insert(&self, record: &mut R, now_ms: i64) -> StoreResult<()> {
        if !record.id().is_assigned() {
            record.meta_mut().id = self.allocate_id();
        } else if self.contains(record.id()) {
            return Err(StoreError::DuplicateId(record.id().clone()));
        }
        record.validate()?;
        stamp_created(record, now_ms);
        Ok(())
    }

    fn allocate_id(&self) -> RecordId {
        loop {
            let id = RecordId::generate();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    pub(super) fn encode_payload(&self) -> StoreResult<String> {
        let envelope = SlotEnvelopeRef {
            schema_version: SLOT_SCHEMA_VERSION,
            records: &self.records,
            settings: &self.settings,
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    pub(super) fn slot_write(&self) -> StoreResult<SlotWrite<'_>> {
        Ok(SlotWrite {
            namespace: &self.namespace,
            payload: self.encode_payload()?,
            schema_version: SLOT_SCHEMA_VERSION,
        })
    }

    fn persist(&mut self) -> StoreResult<()> {
        let revisions = {
            let write = self.slot_write()?;
            self.repo.write_slots(std::slice::from_ref(&write))?
        };
        if let Some(revision) = revisions.first() {
            self.revision = *revision;
        }
        Ok(())
    }

    fn persist_or_rollback(
        &mut self,
        action: &'static str,
        rollback: impl FnOnce(&mut Self),
    ) -> StoreResult<()> {
        if let Err(err) = self.persist() {
            rollback(self);
            error!(
                "event=store_{action} module=store status=error namespace={} kind={} error_code=persist_failed error={err}",
                self.namespace,
                R::KIND
            );
            return Err(err);
        }
        Ok(())
    }

    pub(super) fn emit(&mut self, event: StoreEvent) {
        self.subscribers.notify(&self.namespace, &event);
    }
}

/// Checks a namespace and returns its trimmed form.
pub fn validate_namespace(namespace: &str) -> StoreResult<String> {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidNamespace(
            "namespace must not be blank".to_string(),
        ));
    }
    if trimmed.len() > MAX_NAMESPACE_LEN {
        return Err(StoreError::InvalidNamespace(format!(
            "namespace longer than {MAX_NAMESPACE_LEN} characters"
        )));
    }
    if !trimmed
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-' | '.'))
    {
        return Err(StoreError::InvalidNamespace(format!(
            "`{trimmed}` must contain only a-z, 0-9, `_`, `-` and `.`"
        )));
    }
    Ok(trimmed.to_string())
}

fn decode_slot<R, A>(slot: &StoredSlot) -> StoreResult<(Vec<R>, A)>
where
    R: Record,
    A: StoreSettings,
{
    let corrupt = |message: String| StoreError::CorruptSlot {
        namespace: slot.namespace.clone(),
        message,
    };

    if slot.schema_version > SLOT_SCHEMA_VERSION {
        return Err(corrupt(format!(
            "schema version {} is newer than supported {SLOT_SCHEMA_VERSION}",
            slot.schema_version
        )));
    }

    let envelope: SlotEnvelope<R, A> =
        serde_json::from_str(&slot.payload).map_err(|err| corrupt(err.to_string()))?;
    if envelope.schema_version != slot.schema_version {
        return Err(corrupt(format!(
            "payload schema version {} does not match slot version {}",
            envelope.schema_version, slot.schema_version
        )));
    }

    {
        let mut seen = HashSet::with_capacity(envelope.records.len());
        for record in &envelope.records {
            if !record.id().is_assigned() {
                return Err(corrupt("record without id".to_string()));
            }
            if !seen.insert(record.id()) {
                return Err(corrupt(format!("duplicate record id {}", record.id())));
            }
            record
                .validate()
                .map_err(|err| corrupt(format!("record {}: {err}", record.id())))?;
        }
    }
    envelope
        .settings
        .validate()
        .map_err(|err| corrupt(format!("settings: {err}")))?;

    Ok((envelope.records, envelope.settings))
}

fn stamp_created<R: Record>(record: &mut R, now_ms: i64) {
    let meta = record.meta_mut();
    if meta.created_at_ms <= 0 {
        meta.created_at_ms = now_ms;
    }
    if meta.updated_at_ms < meta.created_at_ms {
        meta.updated_at_ms = meta.created_at_ms;
    }
}

fn touch<R: Record>(record: &mut R, now_ms: i64) {
    let meta = record.meta_mut();
    meta.updated_at_ms = now_ms.max(meta.created_at_ms);
}

#[cfg(test)]
mod tests {
    use super::validate_namespace;
    use crate::store::StoreError;

    #[test]
    fn namespaces_are_trimmed_and_restricted() {
        assert_eq!(validate_namespace(" payroll ").unwrap(), "payroll");
        assert_eq!(validate_namespace("team.v2").unwrap(), "team.v2");
        assert!(matches!(
            validate_namespace(""),
            Err(StoreError::InvalidNamespace(_))
        ));
        assert!(matches!(
            validate_namespace("Payroll"),
            Err(StoreError::InvalidNamespace(_))
        ));
        assert!(matches!(
            validate_namespace(&"x".repeat(65)),
            Err(StoreError::InvalidNamespace(_))
        ));
    }
}
