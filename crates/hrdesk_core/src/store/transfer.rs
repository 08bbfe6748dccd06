//! Atomic record moves between two stores.

use super::error::{StoreError, StoreResult};
use super::event::StoreEvent;
use super::record_store::RecordStore;
use super::{now_epoch_ms, StoreSettings};
use crate::model::record::{Record, RecordId};
use crate::repo::slot_repo::{RepoError, SlotRepository};
use log::{error, info};

/// Removes `id` from `source` and appends `convert(record)` to `destination`.
///
/// Both slots are written in one repository transaction. On any failure
/// both collections are restored and neither store emits an event.
///
/// # Errors
/// - `StorageMismatch` when the stores do not share one repository.
/// - `InvalidNamespace` when both stores use the same namespace.
/// - `NotFound` for unknown ids; `DuplicateId`/`Validation` for the
///   converted record.
pub fn transfer<R, D, S, A, B>(
    source: &mut RecordStore<'_, R, S, A>,
    destination: &mut RecordStore<'_, D, S, B>,
    id: &RecordId,
    convert: impl FnOnce(&R) -> D,
) -> StoreResult<RecordId>
where
    R: Record,
    D: Record,
    S: SlotRepository + ?Sized,
    A: StoreSettings,
    B: StoreSettings,
{
    if !std::ptr::eq(source.repo, destination.repo) {
        return Err(StoreError::StorageMismatch);
    }
    if source.namespace == destination.namespace {
        return Err(StoreError::InvalidNamespace(format!(
            "transfer source and destination share `{}`",
            source.namespace
        )));
    }

    let index = source
        .position(id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))?;
    let mut moved = convert(&source.records[index]);
    destination.prepare_insert(&mut moved, now_epoch_ms())?;
    let moved_id = moved.id().clone();

    let removed = source.records.remove(index);
    destination.records.push(moved);

    match write_both(source, destination) {
        Ok((source_revision, destination_revision)) => {
            source.revision = source_revision;
            destination.revision = destination_revision;
        }
        Err(err) => {
            destination.records.pop();
            source.records.insert(index, removed);
            error!(
                "event=store_transfer module=store status=error from={} to={} id={id} error_code=persist_failed error={err}",
                source.namespace, destination.namespace
            );
            return Err(err);
        }
    }

    info!(
        "event=store_transfer module=store status=ok from={} to={} id={id} new_id={moved_id}",
        source.namespace, destination.namespace
    );
    source.emit(StoreEvent::Removed { id: id.clone() });
    destination.emit(StoreEvent::Added {
        id: moved_id.clone(),
    });
    Ok(moved_id)
}

fn write_both<R, D, S, A, B>(
    source: &RecordStore<'_, R, S, A>,
    destination: &RecordStore<'_, D, S, B>,
) -> StoreResult<(i64, i64)>
where
    R: Record,
    D: Record,
    S: SlotRepository + ?Sized,
    A: StoreSettings,
    B: StoreSettings,
{
    let writes = [source.slot_write()?, destination.slot_write()?];
    let revisions = source.repo.write_slots(&writes)?;
    match revisions.as_slice() {
        [source_revision, destination_revision] => Ok((*source_revision, *destination_revision)),
        other => Err(StoreError::Repo(RepoError::InvalidData(format!(
            "expected 2 revisions from batch write, got {}",
            other.len()
        )))),
    }
}
