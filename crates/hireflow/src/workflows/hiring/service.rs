use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::board::PipelineBoard;
use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus, ScoreRangeError};
use super::filter::{CriteriaError, FilterCriteria, FilterOutcome, SmartFilterEngine};
use super::pipeline::{
    PipelineAction, PipelineStateMachine, TemplateKind, TransitionError, TransitionPlan,
};
use super::repository::{
    ApplicationRepository, NotificationError, NotificationSender, RepositoryError,
    WebhookPublisher,
};
use super::templates::{EmailTemplate, TemplateError, TemplateResolver};

/// Service composing the repository, filter engine, state machine, and outbound hooks.
pub struct PipelineService<R, N, W> {
    repository: Arc<R>,
    notifier: Arc<N>,
    webhooks: Arc<W>,
    templates: TemplateResolver,
    engine: SmartFilterEngine,
    machine: PipelineStateMachine,
}

impl<R, N, W> PipelineService<R, N, W>
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        webhooks: Arc<W>,
        templates: TemplateResolver,
    ) -> Self {
        Self {
            repository,
            notifier,
            webhooks,
            templates,
            engine: SmartFilterEngine::new(),
            machine: PipelineStateMachine::new(),
        }
    }

    /// Store an application received from intake.
    pub fn register(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, PipelineServiceError> {
        record.validate()?;
        let stored = self.repository.insert(record)?;
        info!(application_id = %stored.id.0, status = %stored.status, "application registered");
        Ok(stored)
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, PipelineServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<ApplicationRecord>, PipelineServiceError> {
        Ok(self.repository.list()?)
    }

    /// Validate `criteria` and run the smart filter over every stored application.
    pub fn filter(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<FilterOutcome, PipelineServiceError> {
        criteria.validate()?;
        let applications = self.repository.list()?;
        Ok(self.engine.apply(&applications, criteria))
    }

    pub fn board(&self) -> Result<PipelineBoard, PipelineServiceError> {
        let applications = self.repository.list()?;
        Ok(PipelineBoard::from_records(&applications))
    }

    /// Move an application to an explicitly named stage (board drag-and-drop).
    pub fn change_status(
        &self,
        application_id: &ApplicationId,
        new_status: &str,
    ) -> Result<TransitionReport, PipelineServiceError> {
        let new_status = new_status
            .parse::<ApplicationStatus>()
            .map_err(TransitionError::from)?;
        let record = self.get(application_id)?;
        self.execute(&record, new_status, false)
    }

    /// Approve to the next stage or reject.
    pub fn act(
        &self,
        application_id: &ApplicationId,
        action: PipelineAction,
    ) -> Result<TransitionReport, PipelineServiceError> {
        let record = self.get(application_id)?;
        let new_status = action.target(record.status)?;
        self.execute(&record, new_status, action.is_approve())
    }

    pub fn templates(&self) -> Vec<EmailTemplate> {
        self.templates.catalog()
    }

    pub fn template(&self, kind: &str) -> Result<EmailTemplate, PipelineServiceError> {
        let kind = parse_template_kind(kind)?;
        Ok(self.templates.resolve(kind))
    }

    /// Replace the copy used for one template kind. Later transitions render the override.
    pub fn customize_template(
        &self,
        kind: &str,
        subject: String,
        body: String,
    ) -> Result<EmailTemplate, PipelineServiceError> {
        let kind = parse_template_kind(kind)?;
        let stored = self.templates.customize(EmailTemplate {
            kind,
            subject,
            body,
        })?;
        info!(template = kind.label(), "email template customized");
        Ok(stored)
    }

    pub fn reset_templates(&self) {
        self.templates.reset();
        info!("email templates reset to built-in copy");
    }

    fn execute(
        &self,
        record: &ApplicationRecord,
        new_status: ApplicationStatus,
        is_approve_action: bool,
    ) -> Result<TransitionReport, PipelineServiceError> {
        let plan = self
            .machine
            .transition_at(record, new_status, is_approve_action, Utc::now())?;

        // Nothing is sent unless the status change is stored.
        let stored = self.repository.apply_status(&plan.persist)?;
        info!(
            application_id = %stored.id.0,
            from = %record.status,
            to = %stored.status,
            "application status changed"
        );

        let notification = match plan.notification {
            Some(notification) => {
                let email = self.templates.render(notification.template_type, &stored);
                let recipient = email.to.clone();
                match self.notifier.send(email) {
                    Ok(()) => NotificationOutcome::Sent { to: recipient },
                    Err(err) => {
                        warn!(application_id = %stored.id.0, error = %err, "notification failed");
                        NotificationOutcome::from(err)
                    }
                }
            }
            None => NotificationOutcome::NotRequired,
        };

        if let Err(err) = self.webhooks.publish(&plan.webhook_event) {
            warn!(application_id = %stored.id.0, error = %err, "webhook delivery failed");
        }

        Ok(TransitionReport {
            record: stored,
            plan,
            notification,
        })
    }
}

fn parse_template_kind(kind: &str) -> Result<TemplateKind, TemplateError> {
    TemplateKind::from_label(kind).ok_or_else(|| TemplateError::UnknownKind(kind.to_string()))
}

/// Result of an applied status change, including partial notification failure.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionReport {
    pub record: ApplicationRecord,
    pub plan: TransitionPlan,
    pub notification: NotificationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent { to: String },
    Failed { error: String },
    NotRequired,
}

impl NotificationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, NotificationOutcome::Failed { .. })
    }
}

/// Error raised by the pipeline service.
#[derive(Debug, thiserror::Error)]
pub enum PipelineServiceError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    InvalidRecord(#[from] ScoreRangeError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl From<NotificationError> for NotificationOutcome {
    fn from(err: NotificationError) -> Self {
        NotificationOutcome::Failed {
            error: err.to_string(),
        }
    }
}
