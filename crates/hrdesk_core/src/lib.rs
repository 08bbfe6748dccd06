//! Core domain logic for HRDesk.
//! This crate is the single source of truth for record lifecycles and
//! dashboard metrics.

pub mod config;
pub mod db;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult, SlotOp};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::record::{Record, RecordId, RecordMeta, ValidationError};
pub use model::status::Status;
pub use repo::slot_repo::{
    RepoError, RepoResult, SlotRepository, SlotSummary, SqliteSlotRepository, StoredSlot,
};
pub use service::{
    hire_service::HireService, invoice_service::InvoiceService,
    lifecycle_service::LifecycleService, organisation_service::OrganisationService,
    payroll_service::PayrollService, ServiceError, ServiceResult,
};
pub use store::{transfer, RecordStore, StoreError, StoreEvent, StoreResult, SubscriptionId};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
