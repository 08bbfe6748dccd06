//! Salary structure resolution from configured components.

use super::distribution::percentage_of_amount;
use crate::model::money::{percent_of, round_money, sum_money};
use crate::model::offer::SalaryLine;
use crate::model::payroll::{
    ComponentCalculation, ComponentKind, PayrollSettings, SalaryComponent,
};
use rust_decimal::Decimal;

pub const PROVIDENT_FUND_CODE: &str = "PF";
pub const EMPLOYEE_STATE_INSURANCE_CODE: &str = "ESI";
pub const PROFESSIONAL_TAX_CODE: &str = "PT";

const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureLine {
    pub code: String,
    pub name: String,
    pub kind: ComponentKind,
    pub monthly: Decimal,
    pub annual: Decimal,
    /// Derived from `PayrollSettings::statutory` rather than a component.
    pub statutory: bool,
}

impl StructureLine {
    fn new(code: &str, name: &str, kind: ComponentKind, monthly: Decimal, statutory: bool) -> Self {
        let monthly = round_money(monthly);
        Self {
            code: code.to_string(),
            name: name.to_string(),
            kind,
            annual: monthly.saturating_mul(Decimal::from(MONTHS_PER_YEAR)),
            monthly,
            statutory,
        }
    }
}

/// Monthly pay resolved for one annual CTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryStructure {
    pub annual_ctc: Decimal,
    pub monthly_ctc: Decimal,
    pub basic: Decimal,
    pub earnings: Vec<StructureLine>,
    pub deductions: Vec<StructureLine>,
    pub gross_monthly: Decimal,
    pub total_deductions: Decimal,
    pub net_monthly: Decimal,
    /// Net pay for one period of the configured pay cycle.
    pub net_per_pay_period: Decimal,
    pub periods_per_year: u32,
}

impl SalaryStructure {
    /// Annual earning lines, ready to prefill an offer.
    pub fn to_offer_breakdown(&self) -> Vec<SalaryLine> {
        self.earnings
            .iter()
            .map(|line| SalaryLine::new(line.name.clone(), line.annual))
            .collect()
    }

    /// Each earning's share of monthly gross, in percent.
    pub fn earning_shares(&self, precision: u32) -> Vec<(String, f64)> {
        self.earnings
            .iter()
            .map(|line| {
                (
                    line.code.clone(),
                    percentage_of_amount(line.monthly, self.gross_monthly, precision),
                )
            })
            .collect()
    }
}

/// Resolves active components in their stored order, then appends
/// statutory deductions.
///
/// `PercentOfBasic` resolves against the active `BASIC` component; without
/// one, basic is zero. A `BASIC` component priced as a percent of basic
/// resolves to zero.
pub fn salary_structure(
    components: &[SalaryComponent],
    settings: &PayrollSettings,
    annual_ctc: Decimal,
) -> SalaryStructure {
    let monthly_ctc = round_money(annual_ctc / Decimal::from(MONTHS_PER_YEAR));
    let active = components
        .iter()
        .filter(|component| component.is_active())
        .collect::<Vec<_>>();

    let basic = active
        .iter()
        .find(|component| component.is_basic())
        .map_or(Decimal::ZERO, |component| {
            round_money(resolve(component.calculation, monthly_ctc, None))
        });

    let mut earnings = Vec::new();
    let mut deductions = Vec::new();
    for component in active {
        let monthly = resolve(component.calculation, monthly_ctc, Some(basic));
        let line = StructureLine::new(&component.code, &component.name, component.kind, monthly, false);
        match component.kind {
            ComponentKind::Earning => earnings.push(line),
            ComponentKind::Deduction => deductions.push(line),
        }
    }

    let gross_monthly = sum_money(earnings.iter().map(|line| line.monthly));
    let statutory = &settings.statutory;
    if statutory.provident_fund_enabled {
        deductions.push(StructureLine::new(
            PROVIDENT_FUND_CODE,
            "Provident Fund",
            ComponentKind::Deduction,
            percent_of(basic, statutory.provident_fund_rate_percent),
            true,
        ));
    }
    if statutory.employee_state_insurance_enabled {
        deductions.push(StructureLine::new(
            EMPLOYEE_STATE_INSURANCE_CODE,
            "Employee State Insurance",
            ComponentKind::Deduction,
            percent_of(gross_monthly, statutory.employee_state_insurance_rate_percent),
            true,
        ));
    }
    if statutory.professional_tax > Decimal::ZERO {
        deductions.push(StructureLine::new(
            PROFESSIONAL_TAX_CODE,
            "Professional Tax",
            ComponentKind::Deduction,
            statutory.professional_tax,
            true,
        ));
    }

    let total_deductions = sum_money(deductions.iter().map(|line| line.monthly));
    let net_monthly = gross_monthly.saturating_sub(total_deductions);
    let periods_per_year = settings.pay_cycle.periods_per_year();
    let net_per_pay_period = round_money(
        net_monthly.saturating_mul(Decimal::from(MONTHS_PER_YEAR)) / Decimal::from(periods_per_year),
    );

    SalaryStructure {
        annual_ctc,
        monthly_ctc,
        basic,
        earnings,
        deductions,
        gross_monthly,
        total_deductions,
        net_monthly,
        net_per_pay_period,
        periods_per_year,
    }
}

fn resolve(calculation: ComponentCalculation, monthly_ctc: Decimal, basic: Option<Decimal>) -> Decimal {
    match calculation {
        ComponentCalculation::Flat(amount) => amount,
        ComponentCalculation::PercentOfCtc(percent) => percent_of(monthly_ctc, percent),
        ComponentCalculation::PercentOfBasic(percent) => {
            basic.map_or(Decimal::ZERO, |basic| percent_of(basic, percent))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::salary_structure;
    use crate::model::payroll::{
        ComponentCalculation, ComponentKind, PayCycle, PayrollSettings, SalaryComponent,
        StatutorySettings,
    };
    use rust_decimal::Decimal;

    fn components() -> Vec<SalaryComponent> {
        vec![
            SalaryComponent::new(
                "basic",
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
                "SPECIAL",
                "Special Allowance",
                ComponentKind::Earning,
                ComponentCalculation::Flat(Decimal::from(10_000)),
            ),
        ]
    }

    #[test]
    fn resolves_components_and_statutory_deductions() {
        let settings = PayrollSettings::default();
        let structure = salary_structure(&components(), &settings, Decimal::from(1_200_000));

        assert_eq!(structure.monthly_ctc, Decimal::from(100_000));
        assert_eq!(structure.basic, Decimal::from(50_000));
        assert_eq!(structure.gross_monthly, Decimal::from(80_000));
        // PF 12% of basic + professional tax 200.
        assert_eq!(structure.total_deductions, Decimal::from(6_200));
        assert_eq!(structure.net_monthly, Decimal::from(73_800));
        assert_eq!(structure.net_per_pay_period, Decimal::from(73_800));
    }

    #[test]
    fn pay_cycle_scales_period_net_and_inactive_components_are_skipped() {
        let mut components = components();
        components[2].status = crate::model::payroll::ComponentStatus::Inactive;
        let settings = PayrollSettings {
            pay_cycle: PayCycle::SemiMonthly,
            statutory: StatutorySettings {
                provident_fund_enabled: false,
                professional_tax: Decimal::ZERO,
                ..StatutorySettings::default()
            },
            ..PayrollSettings::default()
        };

        let structure = salary_structure(&components, &settings, Decimal::from(1_200_000));
        assert_eq!(structure.earnings.len(), 2);
        assert!(structure.deductions.is_empty());
        assert_eq!(structure.net_monthly, Decimal::from(70_000));
        assert_eq!(structure.net_per_pay_period, Decimal::from(35_000));
        assert_eq!(structure.to_offer_breakdown()[0].amount, Decimal::from(600_000));
    }
}
