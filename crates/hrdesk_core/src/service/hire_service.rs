//! Offer approval and hiring use-case service.

use super::error::ServiceResult;
use super::OFFERS_NAMESPACE;
use crate::config::CoreConfig;
use crate::metrics::{offer_metrics, OfferMetrics, SalaryStructure, DEFAULT_PERCENT_PRECISION};
use crate::model::offer::{Offer, OfferPatch, OfferStatus};
use crate::model::record::RecordId;
use crate::repo::slot_repo::SlotRepository;
use crate::store::RecordStore;

/// Offer collection with approval workflow operations.
pub struct HireService<'s, S: SlotRepository + ?Sized> {
    offers: RecordStore<'s, Offer, S>,
    precision: u32,
}

impl<'s, S: SlotRepository + ?Sized> HireService<'s, S> {
    pub fn open(repo: &'s S) -> ServiceResult<Self> {
        Ok(Self {
            offers: RecordStore::open(OFFERS_NAMESPACE, repo)?,
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

    pub fn offers(&self) -> &RecordStore<'s, Offer, S> {
        &self.offers
    }

    pub fn offers_mut(&mut self) -> &mut RecordStore<'s, Offer, S> {
        &mut self.offers
    }

    pub fn create_offer(&mut self, offer: Offer) -> ServiceResult<RecordId> {
        Ok(self.offers.add(offer)?)
    }

    /// Drafts an offer whose CTC and breakdown come from a payroll
    /// salary structure.
    pub fn create_offer_from_structure(
        &mut self,
        candidate_name: &str,
        role: &str,
        structure: &SalaryStructure,
    ) -> ServiceResult<RecordId> {
        let mut offer = Offer::new(candidate_name, role, structure.annual_ctc);
        offer.salary_breakdown = structure.to_offer_breakdown();
        self.create_offer(offer)
    }

    pub fn update_offer(&mut self, id: &RecordId, patch: OfferPatch) -> ServiceResult<()> {
        Ok(self.offers.update(id, patch)?)
    }

    pub fn remove_offer(&mut self, id: &RecordId) -> ServiceResult<Option<Offer>> {
        Ok(self.offers.remove(id)?)
    }

    pub fn submit_for_approval(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, OfferStatus::PendingApproval, None)
    }

    pub fn approve(&mut self, id: &RecordId, note: Option<&str>) -> ServiceResult<()> {
        self.move_to(id, OfferStatus::Approved, note)
    }

    pub fn reject(&mut self, id: &RecordId, note: Option<&str>) -> ServiceResult<()> {
        self.move_to(id, OfferStatus::Rejected, note)
    }

    /// Returns a rejected offer to draft for rework.
    pub fn revise(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, OfferStatus::Draft, None)
    }

    pub fn send(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, OfferStatus::Sent, None)
    }

    pub fn record_acceptance(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, OfferStatus::Accepted, None)
    }

    pub fn record_decline(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.move_to(id, OfferStatus::Declined, None)
    }

    fn move_to(&mut self, id: &RecordId, status: OfferStatus, note: Option<&str>) -> ServiceResult<()> {
        match note.map(str::trim).filter(|note| !note.is_empty()) {
            Some(note) => self
                .offers
                .transition_with_patch(id, status, OfferPatch::note(note))?,
            None => self.offers.transition(id, status)?,
        };
        Ok(())
    }

    pub fn metrics(&self) -> OfferMetrics {
        offer_metrics(self.offers.records(), self.precision)
    }

    pub fn sync(&mut self) -> ServiceResult<bool> {
        Ok(self.offers.sync()?)
    }
}
