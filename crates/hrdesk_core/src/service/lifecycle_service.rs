//! Candidate lifecycle use-case service.
//!
//! # Responsibility
//! - Advance candidates through preboarding stages.
//! - Move ready candidates into onboarding atomically.
//! - Track onboarding checklists through completion.
//!
//! # Invariants
//! - Only `Ready to Join` candidates leave preboarding.
//! - A candidate lives in exactly one of the two collections.

use super::error::{ServiceError, ServiceResult};
use super::{ONBOARDING_NAMESPACE, PREBOARDING_NAMESPACE};
use crate::config::CoreConfig;
use crate::metrics::{
    monthly_delta, onboarding_metrics, preboarding_metrics, MonthlyDelta, OnboardingMetrics,
    PreboardingMetrics, DEFAULT_PERCENT_PRECISION,
};
use crate::model::lifecycle::{
    Candidate, CandidatePatch, OnboardingPatch, OnboardingRecord, OnboardingStatus,
    PreboardingStage,
};
use crate::model::record::RecordId;
use crate::model::status::Status;
use crate::repo::slot_repo::SlotRepository;
use crate::store::{transfer, RecordStore, StoreError};
use chrono::{DateTime, Utc};
use log::info;

/// Preboarding and onboarding collections over one repository.
pub struct LifecycleService<'s, S: SlotRepository + ?Sized> {
    preboarding: RecordStore<'s, Candidate, S>,
    onboarding: RecordStore<'s, OnboardingRecord, S>,
    precision: u32,
}

impl<'s, S: SlotRepository + ?Sized> LifecycleService<'s, S> {
    /// Opens both lifecycle stores from `repo`.
    pub fn open(repo: &'s S) -> ServiceResult<Self> {
        Ok(Self {
            preboarding: RecordStore::open(PREBOARDING_NAMESPACE, repo)?,
            onboarding: RecordStore::open(ONBOARDING_NAMESPACE, repo)?,
            precision: DEFAULT_PERCENT_PRECISION,
        })
    }

    /// Opens with the percent precision configured for the process.
    pub fn open_with_config(repo: &'s S, config: &CoreConfig) -> ServiceResult<Self> {
        Ok(Self::open(repo)?.with_precision(config.percent_precision))
    }

    /// Sets the dashboard percentage precision.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn preboarding(&self) -> &RecordStore<'s, Candidate, S> {
        &self.preboarding
    }

    pub fn preboarding_mut(&mut self) -> &mut RecordStore<'s, Candidate, S> {
        &mut self.preboarding
    }

    pub fn onboarding(&self) -> &RecordStore<'s, OnboardingRecord, S> {
        &self.onboarding
    }

    pub fn onboarding_mut(&mut self) -> &mut RecordStore<'s, OnboardingRecord, S> {
        &mut self.onboarding
    }

    pub fn add_candidate(&mut self, candidate: Candidate) -> ServiceResult<RecordId> {
        Ok(self.preboarding.add(candidate)?)
    }

    pub fn update_candidate(&mut self, id: &RecordId, patch: CandidatePatch) -> ServiceResult<()> {
        Ok(self.preboarding.update(id, patch)?)
    }

    pub fn remove_candidate(&mut self, id: &RecordId) -> ServiceResult<Option<Candidate>> {
        Ok(self.preboarding.remove(id)?)
    }

    pub fn accept_offer(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.advance(id, PreboardingStage::OfferAccepted)
    }

    pub fn initiate_bgv(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.advance(id, PreboardingStage::BgvInProgress)
    }

    pub fn verify_bgv(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.advance(id, PreboardingStage::BgvVerified)
    }

    pub fn mark_ready(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.advance(id, PreboardingStage::ReadyToJoin)
    }

    pub fn withdraw(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.advance(id, PreboardingStage::Withdrawn)
    }

    fn advance(&mut self, id: &RecordId, stage: PreboardingStage) -> ServiceResult<()> {
        self.preboarding.transition(id, stage)?;
        Ok(())
    }

    /// Moves a ready candidate into onboarding; returns the onboarding id.
    ///
    /// Removal from preboarding and insertion into onboarding commit
    /// together or not at all.
    ///
    /// # Errors
    /// - `NotReadyToJoin` when the candidate is in any other stage.
    /// - `Store(NotFound)` for unknown ids.
    pub fn move_to_onboarding(&mut self, id: &RecordId) -> ServiceResult<RecordId> {
        let stage = self
            .preboarding
            .get(id)
            .map(|candidate| candidate.status)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if stage != PreboardingStage::ReadyToJoin {
            return Err(ServiceError::NotReadyToJoin {
                id: id.clone(),
                stage: stage.label(),
            });
        }

        let onboarding_id = transfer(
            &mut self.preboarding,
            &mut self.onboarding,
            id,
            OnboardingRecord::from_candidate,
        )?;
        info!(
            "event=candidate_move module=service status=ok candidate_id={id} onboarding_id={onboarding_id}"
        );
        Ok(onboarding_id)
    }

    pub fn start_onboarding(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.onboarding.transition(id, OnboardingStatus::InProgress)?;
        Ok(())
    }

    /// Marks one checklist task done; returns `(done, total)`.
    ///
    /// Task names match case-insensitively. Completing a task of a record
    /// that has not started yet starts it in the same write.
    pub fn complete_checklist_task(
        &mut self,
        id: &RecordId,
        task: &str,
    ) -> ServiceResult<(usize, usize)> {
        let record = self
            .onboarding
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let wanted = task.trim();
        let mut checklist = record.checklist.clone();
        let item = checklist
            .iter_mut()
            .find(|item| item.task.trim().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ServiceError::ChecklistTaskNotFound {
                id: id.clone(),
                task: wanted.to_string(),
            })?;
        item.done = true;

        let done = checklist.iter().filter(|item| item.done).count();
        let total = checklist.len();
        let patch = OnboardingPatch {
            checklist: Some(checklist),
            ..OnboardingPatch::default()
        };
        if record.status == OnboardingStatus::NotStarted {
            self.onboarding
                .transition_with_patch(id, OnboardingStatus::InProgress, patch)?;
        } else {
            self.onboarding.update(id, patch)?;
        }
        Ok((done, total))
    }

    /// # Errors
    /// - `ChecklistIncomplete` while any checklist task is open.
    pub fn complete_onboarding(&mut self, id: &RecordId) -> ServiceResult<()> {
        let record = self
            .onboarding
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let (done, total) = record.checklist_progress();
        if done < total {
            return Err(ServiceError::ChecklistIncomplete {
                id: id.clone(),
                remaining: total - done,
            });
        }
        self.onboarding.transition(id, OnboardingStatus::Completed)?;
        Ok(())
    }

    pub fn drop_onboarding(&mut self, id: &RecordId) -> ServiceResult<()> {
        self.onboarding.transition(id, OnboardingStatus::Dropped)?;
        Ok(())
    }

    pub fn preboarding_metrics(&self) -> PreboardingMetrics {
        preboarding_metrics(self.preboarding.records(), self.precision)
    }

    pub fn onboarding_metrics(&self) -> OnboardingMetrics {
        onboarding_metrics(self.onboarding.records(), self.precision)
    }

    /// Candidates added this month vs last month.
    pub fn candidate_intake(&self, now: DateTime<Utc>) -> MonthlyDelta {
        monthly_delta(self.preboarding.records(), now)
    }

    /// Rehydrates either store written by another handle.
    pub fn sync(&mut self) -> ServiceResult<bool> {
        let preboarding = self.preboarding.sync()?;
        let onboarding = self.onboarding.sync()?;
        Ok(preboarding || onboarding)
    }
}
