use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicationId, ApplicationStatus, CandidateId, JobRoleId};

/// Side effects a status change requires. Nothing here has been carried out yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPlan {
    pub persist: PersistInstruction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationPlan>,
    pub webhook_event: WebhookEvent,
}

/// Status write guarded by the stage the transition was planned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistInstruction {
    pub application_id: ApplicationId,
    pub previous_status: ApplicationStatus,
    pub new_status: ApplicationStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPlan {
    pub template_type: TemplateKind,
}

/// Email template families sent by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Interview,
    ThankYou,
    Welcome,
}

impl TemplateKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Interview, Self::ThankYou, Self::Welcome]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Interview => "interview",
            Self::ThankYou => "thank_you",
            Self::Welcome => "welcome",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label() == label)
    }

    /// Template that accompanies a move into `status`, if any.
    pub const fn for_status(status: ApplicationStatus) -> Option<Self> {
        match status {
            ApplicationStatus::Reviewed | ApplicationStatus::InterviewScheduled => {
                Some(Self::Interview)
            }
            ApplicationStatus::Rejected => Some(Self::ThankYou),
            ApplicationStatus::Hired => Some(Self::Welcome),
            ApplicationStatus::Applied
            | ApplicationStatus::InterviewCompleted
            | ApplicationStatus::OfferSent => None,
        }
    }
}

pub const STATUS_CHANGED_EVENT: &str = "status_changed";

/// Payload posted to the webhook endpoint after a status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event_type: String,
    pub previous_status: ApplicationStatus,
    pub new_status: ApplicationStatus,
    pub candidate_id: CandidateId,
    pub job_role_id: JobRoleId,
    pub timestamp: DateTime<Utc>,
}
