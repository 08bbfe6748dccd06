//! Organisation headcount dashboard.

use super::distribution::{
    category_breakdown, percentage, status_distribution, CategoryShare, StatusDistribution,
};
use crate::model::employee::{Employee, EmploymentStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkforceMetrics {
    /// Every employee record, exited included.
    pub total_records: usize,
    /// Employees not yet exited.
    pub headcount: usize,
    pub active: usize,
    pub on_leave: usize,
    pub probation: usize,
    pub exited: usize,
    /// Exited records over all records, in percent.
    pub attrition_rate: f64,
    pub distribution: StatusDistribution<EmploymentStatus>,
}

pub fn workforce_metrics(employees: &[Employee], precision: u32) -> WorkforceMetrics {
    let distribution = status_distribution(employees, precision);
    let exited = distribution.count(EmploymentStatus::Exited);
    let total_records = employees.len();

    WorkforceMetrics {
        total_records,
        headcount: total_records - exited,
        active: distribution.count(EmploymentStatus::Active),
        on_leave: distribution.count(EmploymentStatus::OnLeave),
        probation: distribution.count(EmploymentStatus::Probation),
        exited,
        attrition_rate: percentage(exited, total_records, precision),
        distribution,
    }
}

/// On-roll employees per department, largest first.
pub fn department_breakdown(employees: &[Employee], precision: u32) -> Vec<CategoryShare> {
    category_breakdown(
        employees.iter().filter(|employee| employee.is_on_roll()),
        |employee| employee.department.as_str(),
        "Unassigned",
        precision,
    )
}
