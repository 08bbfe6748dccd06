//! Salary components and payroll settings.
//!
//! # Invariants
//! - Component codes are uppercase `A-Z0-9_` and unique per payroll store
//!   (uniqueness is enforced by `PayrollService`).
//! - The `BASIC` component is never computed as a percent of itself.

use super::money::{check_amount, is_percent};
use super::record::{merge, require_text, Record, RecordMeta, ValidationError};
use super::status::Status;
use crate::store::StoreSettings;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Component code other components may reference as "basic".
pub const BASIC_COMPONENT_CODE: &str = "BASIC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Active,
    Inactive,
}

impl Status for ComponentStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::Inactive];

    fn initial() -> Self {
        Self::Active
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Inactive],
            Self::Inactive => &[Self::Active],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Earning,
    Deduction,
}

/// How a component's monthly amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ComponentCalculation {
    /// Fixed monthly amount.
    Flat(Decimal),
    /// Percent of monthly CTC.
    PercentOfCtc(Decimal),
    /// Percent of the monthly `BASIC` amount.
    PercentOfBasic(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub code: String,
    pub name: String,
    pub kind: ComponentKind,
    pub calculation: ComponentCalculation,
    pub status: ComponentStatus,
}

impl SalaryComponent {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        kind: ComponentKind,
        calculation: ComponentCalculation,
    ) -> Self {
        Self {
            meta: RecordMeta::default(),
            code: normalize_component_code(&code.into()),
            name: name.into(),
            kind,
            calculation,
            status: ComponentStatus::initial(),
        }
    }

    pub fn is_basic(&self) -> bool {
        self.code == BASIC_COMPONENT_CODE
    }

    pub fn is_active(&self) -> bool {
        self.status == ComponentStatus::Active
    }
}

/// Uppercases and trims a component code.
pub fn normalize_component_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalaryComponentPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub kind: Option<ComponentKind>,
    pub calculation: Option<ComponentCalculation>,
}

impl Record for SalaryComponent {
    type Status = ComponentStatus;
    type Patch = SalaryComponentPatch;

    const KIND: &'static str = "salary_component";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn status(&self) -> ComponentStatus {
        self.status
    }

    fn set_status(&mut self, status: ComponentStatus) {
        self.status = status;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("code", &self.code)?;
        require_text("name", &self.name)?;
        if !self
            .code
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
        {
            return Err(ValidationError::InvalidValue {
                field: "code",
                reason: "must contain only A-Z, 0-9 and `_`".to_string(),
            });
        }
        match self.calculation {
            ComponentCalculation::Flat(amount) => check_amount("calculation", amount),
            ComponentCalculation::PercentOfCtc(percent)
            | ComponentCalculation::PercentOfBasic(percent)
                if !is_percent(percent) =>
            {
                Err(ValidationError::InvalidValue {
                    field: "calculation",
                    reason: "percent must be between 0 and 100".to_string(),
                })
            }
            ComponentCalculation::PercentOfBasic(_) if self.is_basic() => {
                Err(ValidationError::InvalidValue {
                    field: "calculation",
                    reason: "basic cannot be a percent of itself".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn apply_patch(&mut self, patch: SalaryComponentPatch) {
        merge(
            &mut self.code,
            patch.code.map(|code| normalize_component_code(&code)),
        );
        merge(&mut self.name, patch.name);
        merge(&mut self.kind, patch.kind);
        merge(&mut self.calculation, patch.calculation);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayCycle {
    #[default]
    Monthly,
    SemiMonthly,
    BiWeekly,
    Weekly,
}

impl PayCycle {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::SemiMonthly => 24,
            Self::BiWeekly => 26,
            Self::Weekly => 52,
        }
    }
}

/// Statutory deductions applied on top of configured components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatutorySettings {
    pub provident_fund_enabled: bool,
    /// Percent of monthly basic.
    pub provident_fund_rate_percent: Decimal,
    /// Flat monthly amount; zero disables it.
    pub professional_tax: Decimal,
    pub employee_state_insurance_enabled: bool,
    /// Percent of monthly gross.
    pub employee_state_insurance_rate_percent: Decimal,
}

impl Default for StatutorySettings {
    fn default() -> Self {
        Self {
            provident_fund_enabled: true,
            provident_fund_rate_percent: Decimal::from(12),
            professional_tax: Decimal::from(200),
            employee_state_insurance_enabled: false,
            employee_state_insurance_rate_percent: Decimal::new(75, 2),
        }
    }
}

/// Auxiliary settings persisted alongside the payroll components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollSettings {
    pub pay_cycle: PayCycle,
    /// Day of month salaries are released (1-31).
    pub pay_day: u8,
    pub statutory: StatutorySettings,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            pay_cycle: PayCycle::Monthly,
            pay_day: 1,
            statutory: StatutorySettings::default(),
        }
    }
}

impl StoreSettings for PayrollSettings {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=31).contains(&self.pay_day) {
            return Err(ValidationError::InvalidValue {
                field: "pay_day",
                reason: format!("must be between 1 and 31, got {}", self.pay_day),
            });
        }
        let statutory = &self.statutory;
        if !is_percent(statutory.provident_fund_rate_percent)
            || !is_percent(statutory.employee_state_insurance_rate_percent)
        {
            return Err(ValidationError::InvalidValue {
                field: "statutory",
                reason: "rates must be between 0 and 100".to_string(),
            });
        }
        check_amount("statutory.professional_tax", statutory.professional_tax)
    }
}
