//! In-memory record stores backed by namespace slots.
//!
//! # Responsibility
//! - Provide one generic store instantiated per domain namespace.
//! - Move records between stores atomically.
//!
//! # Invariants
//! - Each store is the single writer of its namespace within a handle.
//! - Stores are single-threaded; listeners run synchronously on mutation.

mod error;
mod event;
mod record_store;
mod transfer;

use crate::model::record::ValidationError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

pub use error::{StoreError, StoreResult};
pub use event::{StoreEvent, SubscriptionId};
pub use record_store::{validate_namespace, RecordStore, SLOT_SCHEMA_VERSION};
pub use transfer::transfer;

/// Auxiliary value persisted next to a store's records.
pub trait StoreSettings: Clone + Debug + Default + Serialize + DeserializeOwned {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl StoreSettings for () {}

pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
