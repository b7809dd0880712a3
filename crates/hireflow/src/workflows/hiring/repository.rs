use serde::Serialize;

use super::domain::{ApplicationId, ApplicationRecord};
use super::pipeline::{PersistInstruction, WebhookEvent};
use super::templates::RenderedEmail;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    /// Write a planned status change, returning the stored record. Fails with
    /// [`RepositoryError::Conflict`] when the stored status no longer matches
    /// `change.previous_status`.
    fn apply_status(
        &self,
        change: &PersistInstruction,
    ) -> Result<ApplicationRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record conflicts with its stored state")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound email hook (SMTP relay, transactional mail API, ...).
pub trait NotificationSender: Send + Sync {
    fn send(&self, email: RenderedEmail) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("email transport unavailable: {0}")]
    Transport(String),
    #[error("recipient rejected: {0}")]
    Recipient(String),
}

/// Best-effort webhook delivery for status changes.
pub trait WebhookPublisher: Send + Sync {
    fn publish(&self, event: &WebhookEvent) -> Result<(), WebhookError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook delivery failed: {0}")]
    Delivery(String),
}

/// Public projection of an application used by status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub candidate_name: String,
    pub job_role: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_score: Option<f32>,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            candidate_name: self.candidate.full_name(),
            job_role: self.job_role.name.clone(),
            status: self.status.label(),
            effective_score: self
                .has_any_overall_score()
                .then(|| self.effective_score()),
        }
    }
}
