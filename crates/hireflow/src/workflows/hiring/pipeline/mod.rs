mod plan;

pub use plan::{
    NotificationPlan, PersistInstruction, TemplateKind, TransitionPlan, WebhookEvent,
    STATUS_CHANGED_EVENT,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationRecord, ApplicationStatus, InvalidStateError};

/// Board actions a reviewer can trigger on a single application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineAction {
    Approve,
    Reject,
}

impl PipelineAction {
    /// Status the action moves an application in `current` to.
    pub fn target(self, current: ApplicationStatus) -> Result<ApplicationStatus, TransitionError> {
        match self {
            PipelineAction::Approve => current
                .advance()
                .ok_or(TransitionError::TerminalState { current }),
            PipelineAction::Reject if current.is_terminal() => {
                Err(TransitionError::TerminalState { current })
            }
            PipelineAction::Reject => Ok(ApplicationStatus::Rejected),
        }
    }

    pub const fn is_approve(self) -> bool {
        matches!(self, PipelineAction::Approve)
    }
}

/// Stage policy for applications: which moves are allowed and what each one triggers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStateMachine;

impl PipelineStateMachine {
    pub fn new() -> Self {
        Self
    }

    pub fn transition(
        &self,
        record: &ApplicationRecord,
        new_status: &str,
        is_approve_action: bool,
    ) -> Result<TransitionPlan, TransitionError> {
        let new_status = new_status.parse::<ApplicationStatus>()?;
        self.transition_at(record, new_status, is_approve_action, Utc::now())
    }

    /// Plan the move of `record` into `new_status`, stamped with `at`.
    pub fn transition_at(
        &self,
        record: &ApplicationRecord,
        new_status: ApplicationStatus,
        is_approve_action: bool,
        at: DateTime<Utc>,
    ) -> Result<TransitionPlan, TransitionError> {
        let current = record.status;

        if current.is_terminal() {
            return Err(TransitionError::TerminalState { current });
        }
        if current == new_status {
            return Err(TransitionError::Unchanged { current });
        }
        if is_approve_action && current.advance() != Some(new_status) {
            return Err(TransitionError::NotNextStage {
                current,
                requested: new_status,
            });
        }

        let notification =
            TemplateKind::for_status(new_status).map(|template_type| NotificationPlan {
                template_type,
            });

        Ok(TransitionPlan {
            persist: PersistInstruction {
                application_id: record.id.clone(),
                previous_status: current,
                new_status,
                updated_at: at,
            },
            notification,
            webhook_event: WebhookEvent {
                event_type: STATUS_CHANGED_EVENT.to_string(),
                previous_status: current,
                new_status,
                candidate_id: record.candidate.id.clone(),
                job_role_id: record.job_role.id.clone(),
                timestamp: at,
            },
        })
    }
}

/// Reasons a status change is refused before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    #[error("application is already {current} and cannot move further")]
    TerminalState { current: ApplicationStatus },
    #[error("application is already {current}")]
    Unchanged { current: ApplicationStatus },
    #[error("approve moves {current} to its next stage, not {requested}")]
    NotNextStage {
        current: ApplicationStatus,
        requested: ApplicationStatus,
    },
}
