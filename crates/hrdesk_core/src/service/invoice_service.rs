//! Client invoicing use-case service.

use super::error::{ServiceError, ServiceResult};
use super::INVOICES_NAMESPACE;
use crate::config::CoreConfig;
use crate::metrics::{
    invoice_metrics, invoice_totals, InvoiceMetrics, InvoiceTotals, DEFAULT_PERCENT_PRECISION,
};
use crate::model::invoice::{Invoice, InvoicePatch, InvoiceStatus};
use crate::model::record::{Record, RecordId};
use crate::repo::slot_repo::SlotRepository;
use crate::store::{now_epoch_ms, RecordStore, StoreError};
use log::info;

pub struct InvoiceService<'s, S: SlotRepository + ?Sized> {
    invoices: RecordStore<'s, Invoice, S>,
    precision: u32,
}

impl<'s, S: SlotRepository + ?Sized> InvoiceService<'s, S> {
    pub fn open(repo: &'s S) -> ServiceResult<Self> {
        Ok(Self {
            invoices: RecordStore::open(INVOICES_NAMESPACE, repo)?,
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

    pub fn invoices(&self) -> &RecordStore<'s, Invoice, S> {
        &self.invoices
    }

    pub fn invoices_mut(&mut self) -> &mut RecordStore<'s, Invoice, S> {
        &mut self.invoices
    }

    pub fn create_invoice(&mut self, invoice: Invoice) -> ServiceResult<RecordId> {
        Ok(self.invoices.add(invoice)?)
    }

    pub fn update_invoice(&mut self, id: &RecordId, patch: InvoicePatch) -> ServiceResult<()> {
        Ok(self.invoices.update(id, patch)?)
    }

    pub fn remove_invoice(&mut self, id: &RecordId) -> ServiceResult<Option<Invoice>> {
        Ok(self.invoices.remove(id)?)
    }

    /// Sends a draft (or re-sends an overdue) invoice. An unset issue date
    /// is stamped with the send time, or with the due date when that is
    /// already past; the overdue sweep then flags it.
    ///
    /// # Errors
    /// - `EmptyInvoice` when the invoice has no items.
    pub fn send(&mut self, id: &RecordId) -> ServiceResult<()> {
        let invoice = self.require(id)?;
        if invoice.items.is_empty() {
            return Err(ServiceError::EmptyInvoice(id.clone()));
        }
        if invoice.issued_on_ms.is_none() {
            let now_ms = now_epoch_ms();
            let issued_on_ms = invoice.due_on_ms.map_or(now_ms, |due| due.min(now_ms));
            let patch = InvoicePatch {
                issued_on_ms: Some(Some(issued_on_ms)),
                ..InvoicePatch::default()
            };
            self.invoices
                .transition_with_patch(id, InvoiceStatus::Sent, patch)?;
        } else {
            self.invoices.transition(id, InvoiceStatus::Sent)?;
        }
        Ok(())
    }

    pub fn mark_overdue(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.invoices.transition(id, InvoiceStatus::Overdue)?;
        Ok(())
    }

    /// Marks every sent invoice past its due date as overdue.
    pub fn mark_overdue_as_of(&mut self, now_ms: i64) -> ServiceResult<Vec<RecordId>> {
        let due = self
            .invoices
            .records()
            .iter()
            .filter(|invoice| invoice.is_past_due(now_ms))
            .map(|invoice| invoice.id().clone())
            .collect::<Vec<_>>();
        for id in &due {
            self.invoices.transition(id, InvoiceStatus::Overdue)?;
        }
        if !due.is_empty() {
            info!(
                "event=invoice_overdue_sweep module=service status=ok marked={}",
                due.len()
            );
        }
        Ok(due)
    }

    pub fn mark_paid(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.invoices.transition(id, InvoiceStatus::Paid)?;
        Ok(())
    }

    pub fn cancel(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.invoices.transition(id, InvoiceStatus::Cancelled)?;
        Ok(())
    }

    pub fn totals(&self, id: &RecordId) -> ServiceResult<InvoiceTotals> {
        Ok(invoice_totals(self.require(id)?))
    }

    pub fn metrics(&self) -> InvoiceMetrics {
        invoice_metrics(self.invoices.records(), self.precision)
    }

    pub fn sync(&mut self) -> ServiceResult<bool> {
        Ok(self.invoices.sync()?)
    }

    fn require(&self, id: &RecordId) -> ServiceResult<&Invoice> {
        Ok(self
            .invoices
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?)
    }
}
