//! Organisation employees.

use super::record::{
    check_optional_email, merge, require_text, Record, RecordMeta, ValidationError,
};
use super::status::Status;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Probation,
    Active,
    OnLeave,
    Exited,
}

impl Status for EmploymentStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::OnLeave, Self::Probation, Self::Exited];

    fn initial() -> Self {
        Self::Probation
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Probation => "probation",
            Self::Active => "active",
            Self::OnLeave => "on_leave",
            Self::Exited => "exited",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Probation => "Probation",
            Self::Active => "Active",
            Self::OnLeave => "On Leave",
            Self::Exited => "Exited",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Probation => &[Self::Active, Self::Exited],
            Self::Active => &[Self::OnLeave, Self::Exited],
            Self::OnLeave => &[Self::Active, Self::Exited],
            Self::Exited => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub joined_at_ms: Option<i64>,
    /// Stamped on the transition into `Exited`.
    #[serde(default)]
    pub exited_at_ms: Option<i64>,
    pub status: EmploymentStatus,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            meta: RecordMeta::default(),
            name: name.into(),
            email: String::new(),
            role: role.into(),
            department: department.into(),
            joined_at_ms: None,
            exited_at_ms: None,
            status: EmploymentStatus::initial(),
        }
    }

    pub fn with_status(mut self, status: EmploymentStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the employee counts toward current headcount.
    pub fn is_on_roll(&self) -> bool {
        self.status != EmploymentStatus::Exited
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub joined_at_ms: Option<Option<i64>>,
}

impl Record for Employee {
    type Status = EmploymentStatus;
    type Patch = EmployeePatch;

    const KIND: &'static str = "employee";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn status(&self) -> EmploymentStatus {
        self.status
    }

    fn set_status(&mut self, status: EmploymentStatus) {
        self.status = status;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        check_optional_email("email", &self.email)?;
        if let (Some(joined), Some(exited)) = (self.joined_at_ms, self.exited_at_ms) {
            if exited < joined {
                return Err(ValidationError::InvalidValue {
                    field: "exited_at_ms",
                    reason: "must not be earlier than joined_at_ms".to_string(),
                });
            }
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: EmployeePatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.email, patch.email);
        merge(&mut self.role, patch.role);
        merge(&mut self.department, patch.department);
        merge(&mut self.joined_at_ms, patch.joined_at_ms);
    }

    fn on_transition(&mut self, _from: EmploymentStatus, to: EmploymentStatus, at_ms: i64) {
        if to == EmploymentStatus::Exited && self.exited_at_ms.is_none() {
            self.exited_at_ms = Some(at_ms);
        }
    }
}
