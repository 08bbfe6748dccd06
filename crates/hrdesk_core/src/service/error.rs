use crate::model::record::RecordId;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for domain use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Store-level failure (lookup, transition, persistence).
    Store(StoreError),
    /// Candidate must reach `Ready to Join` before moving to onboarding.
    NotReadyToJoin { id: RecordId, stage: &'static str },
    /// Onboarding cannot complete with open checklist tasks.
    ChecklistIncomplete { id: RecordId, remaining: usize },
    /// Checklist has no task with this name.
    ChecklistTaskNotFound { id: RecordId, task: String },
    /// Invoice without line items cannot be sent.
    EmptyInvoice(RecordId),
    /// Another salary component already uses this code.
    DuplicateComponentCode(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::NotReadyToJoin { id, stage } => {
                write!(f, "candidate {id} is `{stage}`, not ready to join")
            }
            Self::ChecklistIncomplete { id, remaining } => {
                write!(f, "onboarding {id} has {remaining} open checklist task(s)")
            }
            Self::ChecklistTaskNotFound { id, task } => {
                write!(f, "onboarding {id} has no checklist task `{task}`")
            }
            Self::EmptyInvoice(id) => write!(f, "invoice {id} has no line items"),
            Self::DuplicateComponentCode(code) => {
                write!(f, "salary component code `{code}` already exists")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
