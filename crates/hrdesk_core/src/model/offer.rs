//! Offer letters and their approval workflow.

use super::money::{check_amount, round_money, sum_money};
use super::record::{
    check_optional_email, merge, require_text, Record, RecordMeta, ValidationError,
};
use super::status::Status;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Offer approval workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    Sent,
    Accepted,
    Declined,
}

impl Status for OfferStatus {
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::PendingApproval,
        Self::Approved,
        Self::Rejected,
        Self::Sent,
        Self::Accepted,
        Self::Declined,
    ];

    fn initial() -> Self {
        Self::Draft
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingApproval => "Pending Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Sent => "Sent",
            Self::Accepted => "Accepted",
            Self::Declined => "Declined",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::PendingApproval],
            Self::PendingApproval => &[Self::Approved, Self::Rejected],
            Self::Rejected => &[Self::Draft],
            Self::Approved => &[Self::Sent],
            Self::Sent => &[Self::Accepted, Self::Declined],
            Self::Accepted | Self::Declined => &[],
        }
    }
}

/// One named amount of an offer's salary breakdown (annual).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryLine {
    pub component: String,
    pub amount: Decimal,
}

impl SalaryLine {
    pub fn new(component: impl Into<String>, amount: Decimal) -> Self {
        Self {
            component: component.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub candidate_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    pub annual_ctc: Decimal,
    /// Ordered for display; amounts are annual.
    #[serde(default)]
    pub salary_breakdown: Vec<SalaryLine>,
    #[serde(default)]
    pub approver_note: Option<String>,
    pub status: OfferStatus,
}

impl Offer {
    pub fn new(
        candidate_name: impl Into<String>,
        role: impl Into<String>,
        annual_ctc: Decimal,
    ) -> Self {
        Self {
            meta: RecordMeta::default(),
            candidate_name: candidate_name.into(),
            email: String::new(),
            role: role.into(),
            department: String::new(),
            annual_ctc,
            salary_breakdown: Vec::new(),
            approver_note: None,
            status: OfferStatus::initial(),
        }
    }

    /// Sum of breakdown amounts, rounded to cents.
    pub fn breakdown_total(&self) -> Decimal {
        round_money(sum_money(self.salary_breakdown.iter().map(|line| line.amount)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferPatch {
    pub candidate_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub annual_ctc: Option<Decimal>,
    pub salary_breakdown: Option<Vec<SalaryLine>>,
    pub approver_note: Option<Option<String>>,
}

impl OfferPatch {
    pub fn note(note: impl Into<String>) -> Self {
        Self {
            approver_note: Some(Some(note.into())),
            ..Self::default()
        }
    }
}

impl Record for Offer {
    type Status = OfferStatus;
    type Patch = OfferPatch;

    const KIND: &'static str = "offer";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn status(&self) -> OfferStatus {
        self.status
    }

    fn set_status(&mut self, status: OfferStatus) {
        self.status = status;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("candidate_name", &self.candidate_name)?;
        check_optional_email("email", &self.email)?;
        check_amount("annual_ctc", self.annual_ctc)?;
        for line in &self.salary_breakdown {
            require_text("salary_breakdown.component", &line.component)?;
            check_amount("salary_breakdown.amount", line.amount)?;
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: OfferPatch) {
        merge(&mut self.candidate_name, patch.candidate_name);
        merge(&mut self.email, patch.email);
        merge(&mut self.role, patch.role);
        merge(&mut self.department, patch.department);
        merge(&mut self.annual_ctc, patch.annual_ctc);
        merge(&mut self.salary_breakdown, patch.salary_breakdown);
        merge(&mut self.approver_note, patch.approver_note);
    }
}
