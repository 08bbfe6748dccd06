//! Invoice money math and receivables dashboard.

use super::distribution::{status_distribution, StatusDistribution};
use crate::model::invoice::{Invoice, InvoiceItem, InvoiceStatus};
use crate::model::money::{percent_of, round_money, sum_money};
use rust_decimal::Decimal;
use std::ops::Add;

/// Money breakdown of one item or one whole invoice, in cents precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxable: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Add for InvoiceTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            subtotal: self.subtotal.saturating_add(other.subtotal),
            discount: self.discount.saturating_add(other.discount),
            taxable: self.taxable.saturating_add(other.taxable),
            tax: self.tax.saturating_add(other.tax),
            total: self.total.saturating_add(other.total),
        }
    }
}

/// Discount applies to the subtotal, tax to the discounted amount.
pub fn item_totals(item: &InvoiceItem) -> InvoiceTotals {
    let subtotal = round_money(item.unit_price.saturating_mul(Decimal::from(item.quantity)));
    let discount = round_money(percent_of(subtotal, item.discount_percent));
    let taxable = subtotal.saturating_sub(discount);
    let tax = round_money(percent_of(taxable, item.tax_rate_percent));
    InvoiceTotals {
        subtotal,
        discount,
        taxable,
        tax,
        total: taxable.saturating_add(tax),
    }
}

/// Sum of rounded item totals.
pub fn invoice_totals(invoice: &Invoice) -> InvoiceTotals {
    invoice
        .items
        .iter()
        .map(item_totals)
        .fold(InvoiceTotals::default(), |sum, item| sum + item)
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceMetrics {
    pub total: usize,
    /// Billed amount of sent and overdue invoices.
    pub outstanding: Decimal,
    pub overdue: Decimal,
    pub overdue_count: usize,
    pub collected: Decimal,
    /// Amount still in draft, not yet billed.
    pub drafted: Decimal,
    pub distribution: StatusDistribution<InvoiceStatus>,
}

pub fn invoice_metrics(invoices: &[Invoice], precision: u32) -> InvoiceMetrics {
    let amount_in = |statuses: &[InvoiceStatus]| -> Decimal {
        sum_money(
            invoices
                .iter()
                .filter(|invoice| statuses.contains(&invoice.status))
                .map(|invoice| invoice_totals(invoice).total),
        )
    };
    let distribution = status_distribution(invoices, precision);

    InvoiceMetrics {
        total: invoices.len(),
        outstanding: amount_in(&[InvoiceStatus::Sent, InvoiceStatus::Overdue]),
        overdue: amount_in(&[InvoiceStatus::Overdue]),
        overdue_count: distribution.count(InvoiceStatus::Overdue),
        collected: amount_in(&[InvoiceStatus::Paid]),
        drafted: amount_in(&[InvoiceStatus::Draft]),
        distribution,
    }
}
