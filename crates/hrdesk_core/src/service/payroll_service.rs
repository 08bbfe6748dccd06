//! Payroll configuration use-case service.
//!
//! # Invariants
//! - Component codes are unique (after normalization) within the store.
//! - Settings changes are validated before they are persisted.

use super::error::{ServiceError, ServiceResult};
use super::PAYROLL_NAMESPACE;
use crate::metrics::{salary_structure, SalaryStructure};
use crate::model::payroll::{
    normalize_component_code, ComponentCalculation, ComponentKind, ComponentStatus, PayCycle,
    PayrollSettings, SalaryComponent, SalaryComponentPatch, StatutorySettings,
};
use crate::model::record::{Record, RecordId};
use crate::repo::slot_repo::SlotRepository;
use crate::store::RecordStore;
use log::info;
use rust_decimal::Decimal;

pub struct PayrollService<'s, S: SlotRepository + ?Sized> {
    components: RecordStore<'s, SalaryComponent, S, PayrollSettings>,
}

impl<'s, S: SlotRepository + ?Sized> PayrollService<'s, S> {
    pub fn open(repo: &'s S) -> ServiceResult<Self> {
        Ok(Self {
            components: RecordStore::open(PAYROLL_NAMESPACE, repo)?,
        })
    }

    pub fn components(&self) -> &RecordStore<'s, SalaryComponent, S, PayrollSettings> {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut RecordStore<'s, SalaryComponent, S, PayrollSettings> {
        &mut self.components
    }

    pub fn settings(&self) -> &PayrollSettings {
        self.components.settings()
    }

    pub fn component_by_code(&self, code: &str) -> Option<&SalaryComponent> {
        let code = normalize_component_code(code);
        self.components.find(|component| component.code == code)
    }

    /// # Errors
    /// - `DuplicateComponentCode` when the code is taken.
    pub fn add_component(&mut self, component: SalaryComponent) -> ServiceResult<RecordId> {
        self.ensure_code_free(&component.code, None)?;
        Ok(self.components.add(component)?)
    }

    pub fn update_component(
        &mut self,
        id: &RecordId,
        patch: SalaryComponentPatch,
    ) -> ServiceResult<()> {
        if let Some(code) = patch.code.as_deref() {
            self.ensure_code_free(&normalize_component_code(code), Some(id))?;
        }
        Ok(self.components.update(id, patch)?)
    }

    pub fn remove_component(&mut self, id: &RecordId) -> ServiceResult<Option<SalaryComponent>> {
        Ok(self.components.remove(id)?)
    }

    pub fn activate(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.components.transition(id, ComponentStatus::Active)?;
        Ok(())
    }

    pub fn deactivate(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.components.transition(id, ComponentStatus::Inactive)?;
        Ok(())
    }

    pub fn set_pay_cycle(&mut self, pay_cycle: PayCycle) -> ServiceResult<()> {
        Ok(self
            .components
            .update_settings(|settings| settings.pay_cycle = pay_cycle)?)
    }

    pub fn set_pay_day(&mut self, pay_day: u8) -> ServiceResult<()> {
        Ok(self
            .components
            .update_settings(|settings| settings.pay_day = pay_day)?)
    }

    pub fn set_statutory(&mut self, statutory: StatutorySettings) -> ServiceResult<()> {
        Ok(self
            .components
            .update_settings(|settings| settings.statutory = statutory)?)
    }

    /// Resolves active components for `annual_ctc` under current settings.
    pub fn salary_structure(&self, annual_ctc: Decimal) -> SalaryStructure {
        salary_structure(
            self.components.records(),
            self.components.settings(),
            annual_ctc,
        )
    }

    /// Seeds basic, house rent and conveyance components into an empty
    /// store; returns how many were added.
    pub fn install_default_components(&mut self) -> ServiceResult<usize> {
        if !self.components.is_empty() {
            return Ok(0);
        }
        let count = self.components.replace_all(default_components())?;
        info!("event=payroll_defaults module=service status=ok components={count}");
        Ok(count)
    }

    pub fn sync(&mut self) -> ServiceResult<bool> {
        Ok(self.components.sync()?)
    }

    fn ensure_code_free(&self, code: &str, except: Option<&RecordId>) -> ServiceResult<()> {
        let taken = self
            .components
            .find(|component| component.code == code && Some(component.id()) != except)
            .is_some();
        if taken {
            return Err(ServiceError::DuplicateComponentCode(code.to_string()));
        }
        Ok(())
    }
}

fn default_components() -> Vec<SalaryComponent> {
    vec![
        SalaryComponent::new(
            "BASIC",
            "Basic",
            ComponentKind::Earning,
            ComponentCalculation::PercentOfCtc(Decimal::from(50)),
        ),
        SalaryComponent::new(
            "HRA",
            "House Rent Allowance",
            ComponentKind::Earning,
            ComponentCalculation::PercentOfBasic(Decimal::from(40)),
        ),
        SalaryComponent::new(
            "CONVEYANCE",
            "Conveyance Allowance",
            ComponentKind::Earning,
            ComponentCalculation::Flat(Decimal::from(1_600)),
        ),
    ]
}
