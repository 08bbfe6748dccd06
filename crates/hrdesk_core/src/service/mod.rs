//! Domain use-case services over namespaced record stores.
//!
//! # Responsibility
//! - Name the advance operations of each lifecycle.
//! - Enforce domain preconditions the transition tables cannot express.
//! - Expose each domain's dashboard metrics.
//!
//! # Invariants
//! - Services never mutate records except through their stores.
//! - All services of one process share one slot repository, so
//!   cross-collection moves stay atomic.

pub mod error;
pub mod hire_service;
pub mod invoice_service;
pub mod lifecycle_service;
pub mod organisation_service;
pub mod payroll_service;

pub use error::{ServiceError, ServiceResult};

pub const PREBOARDING_NAMESPACE: &str = "preboarding";
pub const ONBOARDING_NAMESPACE: &str = "onboarding";
pub const OFFERS_NAMESPACE: &str = "offers";
pub const ORGANISATION_NAMESPACE: &str = "organisation";
pub const PAYROLL_NAMESPACE: &str = "payroll";
pub const INVOICES_NAMESPACE: &str = "invoices";

/// Every namespace owned by a service, in dashboard order.
pub const ALL_NAMESPACES: &[&str] = &[
    PREBOARDING_NAMESPACE,
    ONBOARDING_NAMESPACE,
    OFFERS_NAMESPACE,
    ORGANISATION_NAMESPACE,
    PAYROLL_NAMESPACE,
    INVOICES_NAMESPACE,
];
