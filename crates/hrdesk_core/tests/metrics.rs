use chrono::{DateTime, TimeZone, Utc};
use hrdesk_core::metrics::{
    department_breakdown, invoice_metrics, invoice_totals, item_totals, monthly_delta,
    offer_metrics, percentage, status_counts, status_distribution, workforce_metrics,
};
use hrdesk_core::model::employee::{Employee, EmploymentStatus};
use hrdesk_core::model::invoice::{Invoice, InvoiceItem, InvoiceStatus};
use hrdesk_core::model::lifecycle::{Candidate, PreboardingStage};
use hrdesk_core::model::offer::Offer;
use hrdesk_core::{Record, ValidationError};
use rust_decimal::Decimal;

fn employee(department: &str, status: EmploymentStatus) -> Employee {
    Employee::new("Employee", "Engineer", department).with_status(status)
}

fn created_at(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .unwrap()
        .timestamp_millis()
}

#[test]
fn empty_collections_produce_zero_metrics() {
    let distribution = status_distribution::<Candidate>(&[], 1);
    assert_eq!(distribution.total, 0);
    assert_eq!(distribution.buckets.len(), 6);
    assert!(distribution
        .buckets
        .iter()
        .all(|bucket| bucket.count == 0 && bucket.percent == 0.0));

    let workforce = workforce_metrics(&[], 1);
    assert_eq!(workforce.headcount, 0);
    assert_eq!(workforce.attrition_rate, 0.0);
    assert!(!workforce.attrition_rate.is_nan());

    let invoices = invoice_metrics(&[], 1);
    assert_eq!(invoices.outstanding, Decimal::ZERO);
    assert_eq!(percentage(3, 0, 1), 0.0);
}

#[test]
fn four_employee_distribution_sums_to_hundred() {
    let employees = vec![
        employee("Platform", EmploymentStatus::Active),
        employee("Platform", EmploymentStatus::Active),
        employee("Finance", EmploymentStatus::OnLeave),
        employee("Finance", EmploymentStatus::Probation),
    ];

    let distribution = status_distribution(&employees, 1);
    assert_eq!(distribution.percent(EmploymentStatus::Active), 50.0);
    assert_eq!(distribution.percent(EmploymentStatus::OnLeave), 25.0);
    assert_eq!(distribution.percent(EmploymentStatus::Probation), 25.0);
    assert_eq!(distribution.percent(EmploymentStatus::Exited), 0.0);
    assert!((distribution.percent_sum() - 100.0).abs() < 0.5);

    let labels = distribution
        .buckets
        .iter()
        .map(|bucket| bucket.label)
        .collect::<Vec<_>>();
    assert_eq!(labels, ["Active", "On Leave", "Probation", "Exited"]);
}

#[test]
fn thirds_stay_within_rounding_tolerance() {
    let employees = vec![
        employee("A", EmploymentStatus::Active),
        employee("A", EmploymentStatus::OnLeave),
        employee("A", EmploymentStatus::Probation),
    ];
    let distribution = status_distribution(&employees, 1);
    assert_eq!(distribution.percent(EmploymentStatus::Active), 33.3);
    assert!((distribution.percent_sum() - 100.0).abs() < 0.5);
}

#[test]
fn status_counts_follow_declaration_order() {
    let mut ready = Candidate::new("Asha", "", "Engineer", "Platform");
    ready.status = PreboardingStage::ReadyToJoin;
    let pending = Candidate::new("Ravi", "", "Analyst", "Finance");

    let counts = status_counts(&[ready, pending]);
    assert_eq!(counts[0], (PreboardingStage::OfferPending, 1));
    assert_eq!(counts[4], (PreboardingStage::ReadyToJoin, 1));
    assert_eq!(counts.iter().map(|(_, count)| count).sum::<usize>(), 2);
}

#[test]
fn workforce_metrics_report_attrition_and_departments() {
    let employees = vec![
        employee("Platform", EmploymentStatus::Active),
        employee("Platform", EmploymentStatus::OnLeave),
        employee("Finance", EmploymentStatus::Active),
        employee("Finance", EmploymentStatus::Exited),
        employee(" ", EmploymentStatus::Probation),
        employee("Platform", EmploymentStatus::Exited),
    ];

    let metrics = workforce_metrics(&employees, 1);
    assert_eq!(metrics.total_records, 6);
    assert_eq!(metrics.headcount, 4);
    assert_eq!(metrics.active, 2);
    assert_eq!(metrics.on_leave, 1);
    assert_eq!(metrics.exited, 2);
    assert_eq!(metrics.attrition_rate, 33.3);

    let departments = department_breakdown(&employees, 1);
    let summary = departments
        .iter()
        .map(|share| (share.key.as_str(), share.count, share.percent))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        [
            ("Platform", 2, 50.0),
            ("Finance", 1, 25.0),
            ("Unassigned", 1, 25.0),
        ]
    );
}

#[test]
fn invoice_item_scenario_totals() {
    let item = InvoiceItem::new("Consulting", Decimal::from(100), 2)
        .with_discount(Decimal::from(10))
        .with_tax(Decimal::from(5));

    let totals = item_totals(&item);
    assert_eq!(totals.subtotal, Decimal::from(200));
    assert_eq!(totals.discount, Decimal::from(20));
    assert_eq!(totals.taxable, Decimal::from(180));
    assert_eq!(totals.tax, Decimal::from(9));
    assert_eq!(totals.total, Decimal::from(189));
}

#[test]
fn oversized_amounts_fail_validation_and_saturate_in_totals() {
    let huge_price = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
    let item = InvoiceItem::new("Bulk", huge_price, 4_000_000_000);

    let mut invoice = Invoice::new("INV-9", "Acme");
    invoice.items = vec![item.clone()];
    assert!(matches!(
        invoice.validate(),
        Err(ValidationError::InvalidValue { field: "items.unit_price", .. })
    ));
    invoice.items = vec![InvoiceItem::new("Bulk", Decimal::ONE, 4_000_000_000)];
    assert!(matches!(
        invoice.validate(),
        Err(ValidationError::InvalidValue { field: "items.quantity", .. })
    ));

    let totals = item_totals(&item);
    assert_eq!(totals.subtotal, Decimal::MAX);
    assert_eq!(totals.total, Decimal::MAX);

    let mut offer = Offer::new("Ravi", "Analyst", huge_price);
    assert!(matches!(
        offer.validate(),
        Err(ValidationError::InvalidValue { field: "annual_ctc", .. })
    ));
    offer.annual_ctc = Decimal::MAX;
    let metrics = offer_metrics(&[offer.clone(), offer], 1);
    assert_eq!(metrics.committed_ctc, Decimal::ZERO);
    assert_eq!(metrics.committed_share, 0.0);
}

#[test]
fn invoice_totals_sum_items_and_feed_receivables() {
    let mut sent = Invoice::new("INV-1", "Acme");
    sent.items = vec![
        InvoiceItem::new("Consulting", Decimal::from(100), 2)
            .with_discount(Decimal::from(10))
            .with_tax(Decimal::from(5)),
        InvoiceItem::new("Support", Decimal::new(4999, 2), 1),
    ];
    sent.status = InvoiceStatus::Sent;
    assert_eq!(invoice_totals(&sent).total, Decimal::new(23899, 2));

    let mut overdue = Invoice::new("INV-2", "Globex");
    overdue.items = vec![InvoiceItem::new("Audit", Decimal::from(500), 1)];
    overdue.status = InvoiceStatus::Overdue;

    let mut paid = Invoice::new("INV-3", "Initech");
    paid.items = vec![InvoiceItem::new("Training", Decimal::from(300), 1)];
    paid.status = InvoiceStatus::Paid;

    let metrics = invoice_metrics(&[sent, overdue, paid], 1);
    assert_eq!(metrics.outstanding, Decimal::new(73899, 2));
    assert_eq!(metrics.overdue, Decimal::from(500));
    assert_eq!(metrics.overdue_count, 1);
    assert_eq!(metrics.collected, Decimal::from(300));
    assert_eq!(metrics.drafted, Decimal::ZERO);
}

#[test]
fn monthly_delta_compares_calendar_months() {
    let now: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let stamps = [
        created_at(2026, 3, 1, 0),
        created_at(2026, 3, 15, 9),
        created_at(2026, 2, 1, 0),
        created_at(2026, 2, 14, 10),
        created_at(2026, 2, 28, 23),
        created_at(2026, 1, 31, 23),
    ];
    let employees = stamps
        .iter()
        .map(|stamp| {
            let mut employee = employee("Platform", EmploymentStatus::Active);
            employee.meta.created_at_ms = *stamp;
            employee
        })
        .collect::<Vec<_>>();

    let delta = monthly_delta(&employees, now);
    assert_eq!(delta.current_month, 2);
    assert_eq!(delta.previous_month, 3);
    assert_eq!(delta.delta, -1);

    let empty = monthly_delta::<Employee>(&[], now);
    assert_eq!(empty.delta, 0);
}
