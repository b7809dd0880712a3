//! Hiring pipeline: smart candidate filtering, pipeline statistics, and the
//! stage state machine that decides which emails and webhooks follow a status change.
//!
//! Filtering and transition planning are pure. [`PipelineService`] wires them to
//! the injected repository, email sender, and webhook publisher.

pub mod board;
pub mod domain;
pub mod filter;
pub mod pipeline;
pub mod repository;
pub mod router;
pub mod service;
pub mod templates;

#[cfg(test)]
mod tests;

pub use board::{BoardColumn, PipelineBoard};
pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, Candidate, CandidateId,
    InvalidStateError, JobRole, JobRoleId, PreScreeningScores, ScoreRangeError, VoiceAnalysis,
    MAX_SCORE,
};
pub use filter::{
    CriteriaError, FilterCriteria, FilterOutcome, FilterStatistics, SmartFilterEngine,
};
pub use pipeline::{
    NotificationPlan, PersistInstruction, PipelineAction, PipelineStateMachine, TemplateKind,
    TransitionError, TransitionPlan, WebhookEvent,
};
pub use repository::{
    ApplicationRepository, ApplicationStatusView, NotificationError, NotificationSender,
    RepositoryError, WebhookError, WebhookPublisher,
};
pub use router::pipeline_router;
pub use service::{
    NotificationOutcome, PipelineService, PipelineServiceError, TransitionReport,
};
pub use templates::{
    EmailTemplate, InMemoryTemplateStore, RenderedEmail, TemplateError, TemplateResolver,
    TemplateStore,
};
