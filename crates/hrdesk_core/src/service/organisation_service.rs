//! Employee roster use-case service.

use super::error::ServiceResult;
use super::ORGANISATION_NAMESPACE;
use crate::config::CoreConfig;
use crate::metrics::{
    department_breakdown, monthly_delta, workforce_metrics, CategoryShare, MonthlyDelta,
    WorkforceMetrics, DEFAULT_PERCENT_PRECISION,
};
use crate::model::employee::{Employee, EmployeePatch, EmploymentStatus};
use crate::model::record::RecordId;
use crate::repo::slot_repo::SlotRepository;
use crate::store::{now_epoch_ms, RecordStore};
use chrono::{DateTime, Utc};

pub struct OrganisationService<'s, S: SlotRepository + ?Sized> {
    employees: RecordStore<'s, Employee, S>,
    precision: u32,
}

impl<'s, S: SlotRepository + ?Sized> OrganisationService<'s, S> {
    pub fn open(repo: &'s S) -> ServiceResult<Self> {
        Ok(Self {
            employees: RecordStore::open(ORGANISATION_NAMESPACE, repo)?,
            precision: DEFAULT_PERCENT_PRECISION,
        })
    }

    pub fn open_with_config(repo: &'s S, config: &CoreConfig) -> ServiceResult<Self> {
        Ok(Self::open(repo)?.with_precision(config.percent_precision))
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn employees(&self) -> &RecordStore<'s, Employee, S> {
        &self.employees
    }

    pub fn employees_mut(&mut self) -> &mut RecordStore<'s, Employee, S> {
        &mut self.employees
    }

    /// Adds an employee; an unset joining time defaults to now.
    pub fn hire(&mut self, mut employee: Employee) -> ServiceResult<RecordId> {
        if employee.joined_at_ms.is_none() {
            employee.joined_at_ms = Some(now_epoch_ms());
        }
        Ok(self.employees.add(employee)?)
    }

    pub fn update_employee(&mut self, id: &RecordId, patch: EmployeePatch) -> ServiceResult<()> {
        Ok(self.employees.update(id, patch)?)
    }

    pub fn remove_employee(&mut self, id: &RecordId) -> ServiceResult<Option<Employee>> {
        Ok(self.employees.remove(id)?)
    }

    /// Ends probation.
    pub fn confirm(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, EmploymentStatus::Active)
    }

    pub fn start_leave(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, EmploymentStatus::OnLeave)
    }

    pub fn end_leave(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, EmploymentStatus::Active)
    }

    /// Exits the employee and stamps `exited_at_ms`.
    pub fn offboard(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, EmploymentStatus::Exited)
    }

    fn move_to(&mut self, id: &RecordId, status: EmploymentStatus) -> ServiceResult<()> {
        self.employees.transition(id, status)?;
        Ok(())
    }

    pub fn workforce_metrics(&self) -> WorkforceMetrics {
        workforce_metrics(self.employees.records(), self.precision)
    }

    pub fn department_breakdown(&self) -> Vec<CategoryShare> {
        department_breakdown(self.employees.records(), self.precision)
    }

    /// Employee records added this month vs last month.
    pub fn headcount_growth(&self, now: DateTime<Utc>) -> MonthlyDelta {
        monthly_delta(self.employees.records(), now)
    }

    pub fn sync(&mut self) -> ServiceResult<bool> {
        Ok(self.employees.sync()?)
    }
}
