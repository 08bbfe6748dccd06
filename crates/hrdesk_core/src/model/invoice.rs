//! Client invoices and line items.

use super::money::{check_amount, is_percent, MAX_QUANTITY};
use super::record::{merge, require_text, Record, RecordMeta, ValidationError};
use super::status::Status;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Overdue,
    Paid,
    Cancelled,
}

impl Status for InvoiceStatus {
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Sent,
        Self::Overdue,
        Self::Paid,
        Self::Cancelled,
    ];

    fn initial() -> Self {
        Self::Draft
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Overdue => "overdue",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Sent => "Sent",
            Self::Overdue => "Overdue",
            Self::Paid => "Paid",
            Self::Cancelled => "Cancelled",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Sent, Self::Cancelled],
            Self::Sent => &[Self::Overdue, Self::Paid, Self::Cancelled],
            Self::Overdue => &[Self::Sent, Self::Paid, Self::Cancelled],
            Self::Paid | Self::Cancelled => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_rate_percent: Decimal,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, unit_price: Decimal, quantity: u32) -> Self {
        Self {
            description: description.into(),
            unit_price,
            quantity,
            discount_percent: Decimal::ZERO,
            tax_rate_percent: Decimal::ZERO,
        }
    }

    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.discount_percent = percent;
        self
    }

    pub fn with_tax(mut self, percent: Decimal) -> Self {
        self.tax_rate_percent = percent;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub number: String,
    pub client_name: String,
    #[serde(default)]
    pub issued_on_ms: Option<i64>,
    #[serde(default)]
    pub due_on_ms: Option<i64>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn new(number: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::default(),
            number: number.into(),
            client_name: client_name.into(),
            issued_on_ms: None,
            due_on_ms: None,
            items: Vec::new(),
            status: InvoiceStatus::initial(),
        }
    }

    /// Whether the due date has passed at `now_ms` while payment is open.
    pub fn is_past_due(&self, now_ms: i64) -> bool {
        self.status == InvoiceStatus::Sent && self.due_on_ms.is_some_and(|due| due < now_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoicePatch {
    pub number: Option<String>,
    pub client_name: Option<String>,
    pub issued_on_ms: Option<Option<i64>>,
    pub due_on_ms: Option<Option<i64>>,
    pub items: Option<Vec<InvoiceItem>>,
}

impl Record for Invoice {
    type Status = InvoiceStatus;
    type Patch = InvoicePatch;

    const KIND: &'static str = "invoice";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn status(&self) -> InvoiceStatus {
        self.status
    }

    fn set_status(&mut self, status: InvoiceStatus) {
        self.status = status;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("number", &self.number)?;
        require_text("client_name", &self.client_name)?;
        if let (Some(issued), Some(due)) = (self.issued_on_ms, self.due_on_ms) {
            if due < issued {
                return Err(ValidationError::InvalidValue {
                    field: "due_on_ms",
                    reason: "must not be earlier than issued_on_ms".to_string(),
                });
            }
        }
        for item in &self.items {
            require_text("items.description", &item.description)?;
            check_amount("items.unit_price", item.unit_price)?;
            if item.quantity > MAX_QUANTITY {
                return Err(ValidationError::InvalidValue {
                    field: "items.quantity",
                    reason: format!("must not exceed {MAX_QUANTITY}"),
                });
            }
            if !is_percent(item.discount_percent) || !is_percent(item.tax_rate_percent) {
                return Err(ValidationError::InvalidValue {
                    field: "items",
                    reason: "discount and tax rates must be between 0 and 100".to_string(),
                });
            }
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: InvoicePatch) {
        merge(&mut self.number, patch.number);
        merge(&mut self.client_name, patch.client_name);
        merge(&mut self.issued_on_ms, patch.issued_on_ms);
        merge(&mut self.due_on_ms, patch.due_on_ms);
        merge(&mut self.items, patch.items);
    }
}
