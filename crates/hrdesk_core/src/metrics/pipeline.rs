//! Hiring pipeline dashboards: preboarding, onboarding and offers.

use super::distribution::{
    percentage, percentage_of_amount, status_distribution, StatusDistribution,
};
use crate::model::lifecycle::{Candidate, OnboardingRecord, OnboardingStatus, PreboardingStage};
use crate::model::money::{round_money, sum_money};
use crate::model::offer::{Offer, OfferStatus};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct PreboardingMetrics {
    pub total: usize,
    /// Candidates not yet ready and not withdrawn.
    pub in_progress: usize,
    pub ready_to_join: usize,
    pub withdrawn: usize,
    pub distribution: StatusDistribution<PreboardingStage>,
}

pub fn preboarding_metrics(candidates: &[Candidate], precision: u32) -> PreboardingMetrics {
    let distribution = status_distribution(candidates, precision);
    let ready_to_join = distribution.count(PreboardingStage::ReadyToJoin);
    let withdrawn = distribution.count(PreboardingStage::Withdrawn);
    PreboardingMetrics {
        total: candidates.len(),
        in_progress: candidates.len() - ready_to_join - withdrawn,
        ready_to_join,
        withdrawn,
        distribution,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingMetrics {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub dropped: usize,
    /// Done checklist tasks over all tasks of non-dropped records.
    pub checklist_completion: f64,
    pub distribution: StatusDistribution<OnboardingStatus>,
}

pub fn onboarding_metrics(records: &[OnboardingRecord], precision: u32) -> OnboardingMetrics {
    let distribution = status_distribution(records, precision);
    let (done, total_tasks) = records
        .iter()
        .filter(|record| record.status != OnboardingStatus::Dropped)
        .map(OnboardingRecord::checklist_progress)
        .fold((0, 0), |(done, total), (record_done, record_total)| {
            (done + record_done, total + record_total)
        });

    OnboardingMetrics {
        total: records.len(),
        not_started: distribution.count(OnboardingStatus::NotStarted),
        in_progress: distribution.count(OnboardingStatus::InProgress),
        completed: distribution.count(OnboardingStatus::Completed),
        dropped: distribution.count(OnboardingStatus::Dropped),
        checklist_completion: percentage(done, total_tasks, precision),
        distribution,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferMetrics {
    pub total: usize,
    pub awaiting_approval: usize,
    /// Sent offers still waiting for the candidate.
    pub awaiting_response: usize,
    pub accepted: usize,
    pub declined: usize,
    /// Accepted over decided (accepted + declined) offers.
    pub acceptance_rate: f64,
    /// Annual CTC summed over accepted offers.
    pub committed_ctc: Decimal,
    /// Share of the total offered CTC that was accepted.
    pub committed_share: f64,
    pub distribution: StatusDistribution<OfferStatus>,
}

pub fn offer_metrics(offers: &[Offer], precision: u32) -> OfferMetrics {
    let distribution = status_distribution(offers, precision);
    let accepted = distribution.count(OfferStatus::Accepted);
    let declined = distribution.count(OfferStatus::Declined);
    let committed_ctc = round_money(sum_money(
        offers
            .iter()
            .filter(|offer| offer.status == OfferStatus::Accepted)
            .map(|offer| offer.annual_ctc),
    ));
    let offered_ctc = sum_money(offers.iter().map(|offer| offer.annual_ctc));

    OfferMetrics {
        total: offers.len(),
        awaiting_approval: distribution.count(OfferStatus::PendingApproval),
        awaiting_response: distribution.count(OfferStatus::Sent),
        accepted,
        declined,
        acceptance_rate: percentage(accepted, accepted + declined, precision),
        committed_share: percentage_of_amount(committed_ctc, offered_ctc, precision),
        committed_ctc,
        distribution,
    }
}
