//! Pre-boarding candidates and onboarding records.
//!
//! # Responsibility
//! - Model the hire pipeline from offer to joining day.
//! - Define the checklist seeded when a candidate moves to onboarding.
//!
//! # Invariants
//! - A candidate reaches `ReadyToJoin` only through every BGV checkpoint.
//! - `OnboardingRecord::from_candidate` always starts at the initial
//!   onboarding status with an unassigned id.

use super::record::{
    check_optional_email, merge, require_text, Record, RecordId, RecordMeta, ValidationError,
};
use super::status::Status;
use serde::{Deserialize, Serialize};

/// Tasks every new joiner's onboarding starts with.
pub const DEFAULT_ONBOARDING_CHECKLIST: &[&str] = &[
    "Collect signed offer letter",
    "Verify identity documents",
    "Provision laptop and accounts",
    "Assign onboarding buddy",
    "Complete orientation session",
];

/// Pre-boarding pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreboardingStage {
    OfferPending,
    OfferAccepted,
    BgvInProgress,
    BgvVerified,
    ReadyToJoin,
    Withdrawn,
}

impl Status for PreboardingStage {
    const ALL: &'static [Self] = &[
        Self::OfferPending,
        Self::OfferAccepted,
        Self::BgvInProgress,
        Self::BgvVerified,
        Self::ReadyToJoin,
        Self::Withdrawn,
    ];

    fn initial() -> Self {
        Self::OfferPending
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::OfferPending => "offer_pending",
            Self::OfferAccepted => "offer_accepted",
            Self::BgvInProgress => "bgv_in_progress",
            Self::BgvVerified => "bgv_verified",
            Self::ReadyToJoin => "ready_to_join",
            Self::Withdrawn => "withdrawn",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::OfferPending => "Offer Pending",
            Self::OfferAccepted => "Offer Accepted",
            Self::BgvInProgress => "BGV In-Progress",
            Self::BgvVerified => "BGV Verified",
            Self::ReadyToJoin => "Ready to Join",
            Self::Withdrawn => "Withdrawn",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::OfferPending => &[Self::OfferAccepted, Self::Withdrawn],
            Self::OfferAccepted => &[Self::BgvInProgress, Self::Withdrawn],
            Self::BgvInProgress => &[Self::BgvVerified, Self::Withdrawn],
            Self::BgvVerified => &[Self::ReadyToJoin, Self::Withdrawn],
            Self::ReadyToJoin => &[Self::Withdrawn],
            Self::Withdrawn => &[],
        }
    }
}

/// Candidate tracked between offer and joining day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    /// Expected first day, epoch milliseconds.
    #[serde(default)]
    pub joining_date_ms: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: PreboardingStage,
}

impl Candidate {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            meta: RecordMeta::default(),
            name: name.into(),
            email: email.into(),
            role: role.into(),
            department: department.into(),
            joining_date_ms: None,
            notes: None,
            status: PreboardingStage::initial(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub joining_date_ms: Option<Option<i64>>,
    pub notes: Option<Option<String>>,
}

impl Record for Candidate {
    type Status = PreboardingStage;
    type Patch = CandidatePatch;

    const KIND: &'static str = "candidate";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn status(&self) -> PreboardingStage {
        self.status
    }

    fn set_status(&mut self, status: PreboardingStage) {
        self.status = status;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        check_optional_email("email", &self.email)
    }

    fn apply_patch(&mut self, patch: CandidatePatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.email, patch.email);
        merge(&mut self.role, patch.role);
        merge(&mut self.department, patch.department);
        merge(&mut self.joining_date_ms, patch.joining_date_ms);
        merge(&mut self.notes, patch.notes);
    }
}

/// Onboarding progress of a joiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    NotStarted,
    InProgress,
    Completed,
    Dropped,
}

impl Status for OnboardingStatus {
    const ALL: &'static [Self] = &[
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::Dropped,
    ];

    fn initial() -> Self {
        Self::NotStarted
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Dropped => "Dropped",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::NotStarted => &[Self::InProgress, Self::Dropped],
            Self::InProgress => &[Self::Completed, Self::Dropped],
            Self::Completed | Self::Dropped => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub task: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn pending(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            done: false,
        }
    }
}

/// Joiner record in the onboarding collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// Pre-boarding candidate this record was created from.
    #[serde(default)]
    pub source_candidate_id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub joining_date_ms: Option<i64>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    pub status: OnboardingStatus,
}

impl OnboardingRecord {
    /// Builds the onboarding counterpart of a ready candidate.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            meta: RecordMeta::default(),
            source_candidate_id: Some(candidate.meta.id.clone()),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            role: candidate.role.clone(),
            department: candidate.department.clone(),
            joining_date_ms: candidate.joining_date_ms,
            checklist: DEFAULT_ONBOARDING_CHECKLIST
                .iter()
                .map(|task| ChecklistItem::pending(*task))
                .collect(),
            status: OnboardingStatus::initial(),
        }
    }

    /// Returns `(done, total)` checklist counts.
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|item| item.done).count();
        (done, self.checklist.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub joining_date_ms: Option<Option<i64>>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl Record for OnboardingRecord {
    type Status = OnboardingStatus;
    type Patch = OnboardingPatch;

    const KIND: &'static str = "onboarding_record";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn status(&self) -> OnboardingStatus {
        self.status
    }

    fn set_status(&mut self, status: OnboardingStatus) {
        self.status = status;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        check_optional_email("email", &self.email)?;
        for item in &self.checklist {
            require_text("checklist.task", &item.task)?;
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: OnboardingPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.email, patch.email);
        merge(&mut self.role, patch.role);
        merge(&mut self.department, patch.department);
        merge(&mut self.joining_date_ms, patch.joining_date_ms);
        merge(&mut self.checklist, patch.checklist);
    }
}

#[cfg(test)]
mod tests {
    use super::{Candidate, OnboardingRecord, OnboardingStatus, PreboardingStage};
    use crate::model::record::{Record, RecordId};
    use crate::model::status::tests::assert_table_is_well_formed;
    use crate::model::status::Status;

    #[test]
    fn status_tables_are_well_formed() {
        assert_table_is_well_formed::<PreboardingStage>();
        assert_table_is_well_formed::<OnboardingStatus>();
    }

    #[test]
    fn bgv_checkpoints_cannot_be_skipped() {
        assert!(!PreboardingStage::OfferPending.can_transition_to(PreboardingStage::ReadyToJoin));
        assert!(!PreboardingStage::OfferAccepted.can_transition_to(PreboardingStage::BgvVerified));
        assert!(PreboardingStage::BgvVerified.can_transition_to(PreboardingStage::ReadyToJoin));
        assert!(PreboardingStage::Withdrawn.is_terminal());
    }

    #[test]
    fn parse_accepts_dashboard_labels() {
        assert_eq!(
            PreboardingStage::parse("BGV In-Progress"),
            Some(PreboardingStage::BgvInProgress)
        );
        assert_eq!(
            PreboardingStage::parse("ready to join"),
            Some(PreboardingStage::ReadyToJoin)
        );
    }

    #[test]
    fn onboarding_record_copies_candidate_and_resets_status() {
        let mut candidate = Candidate::new("Asha Rao", "asha@example.com", "Engineer", "Platform");
        candidate.meta.id = RecordId::new("cand-1");
        candidate.status = PreboardingStage::ReadyToJoin;

        let record = OnboardingRecord::from_candidate(&candidate);
        assert!(!record.id().is_assigned());
        assert_eq!(record.source_candidate_id, Some(RecordId::new("cand-1")));
        assert_eq!(record.status, OnboardingStatus::NotStarted);
        assert_eq!(record.checklist_progress(), (0, 5));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn candidate_requires_name() {
        let candidate = Candidate::new(" ", "", "", "");
        assert!(candidate.validate().is_err());
    }
}
