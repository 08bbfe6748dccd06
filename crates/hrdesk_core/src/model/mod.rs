//! Domain model for the HR/CRM record stores.
//!
//! # Responsibility
//! - Define the shared `Record`/`Status` contracts every store is generic
//!   over.
//! - Define one record type per domain namespace.
//!
//! # Invariants
//! - Every record carries a `RecordMeta` and exactly one status value.
//! - Status changes are only legal along each enum's `allowed_next` table.

pub mod employee;
pub mod invoice;
pub mod lifecycle;
pub mod money;
pub mod offer;
pub mod payroll;
pub mod record;
pub mod status;
