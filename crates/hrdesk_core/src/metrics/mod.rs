//! Derived, read-only dashboard metrics.
//!
//! # Responsibility
//! - Turn record slices into counts, percentages, deltas and totals.
//!
//! # Invariants
//! - Every function is pure: no caching, no hidden state.
//! - Empty inputs yield zeros, never NaN.

mod distribution;
mod invoice;
mod payroll;
mod period;
mod pipeline;
mod workforce;

pub use distribution::{
    category_breakdown, percentage, percentage_of_amount, round_to, status_counts,
    status_distribution, CategoryShare, StatusBucket, StatusDistribution,
    DEFAULT_PERCENT_PRECISION,
};
pub use invoice::{invoice_metrics, invoice_totals, item_totals, InvoiceMetrics, InvoiceTotals};
pub use payroll::{
    salary_structure, SalaryStructure, StructureLine, EMPLOYEE_STATE_INSURANCE_CODE,
    PROFESSIONAL_TAX_CODE, PROVIDENT_FUND_CODE,
};
pub use period::{created_between, month_window_ms, monthly_delta, MonthlyDelta};
pub use pipeline::{
    offer_metrics, onboarding_metrics, preboarding_metrics, OfferMetrics, OnboardingMetrics,
    PreboardingMetrics,
};
pub use workforce::{department_breakdown, workforce_metrics, WorkforceMetrics};
