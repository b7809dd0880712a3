use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationRecord};
use super::filter::FilterCriteria;
use super::pipeline::PipelineAction;
use super::repository::{
    ApplicationRepository, NotificationSender, RepositoryError, WebhookPublisher,
};
use super::service::{PipelineService, PipelineServiceError};
use super::templates::TemplateError;

/// Router builder exposing HTTP endpoints for the hiring pipeline.
pub fn pipeline_router<R, N, W>(service: Arc<PipelineService<R, N, W>>) -> Router
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_handler::<R, N, W>).post(register_handler::<R, N, W>),
        )
        .route(
            "/api/v1/applications/filter",
            post(filter_handler::<R, N, W>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R, N, W>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(change_status_handler::<R, N, W>),
        )
        .route(
            "/api/v1/applications/:application_id/approve",
            post(approve_handler::<R, N, W>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_handler::<R, N, W>),
        )
        .route("/api/v1/pipeline/board", get(board_handler::<R, N, W>))
        .route(
            "/api/v1/templates",
            get(list_templates_handler::<R, N, W>).delete(reset_templates_handler::<R, N, W>),
        )
        .route(
            "/api/v1/templates/:kind",
            get(template_handler::<R, N, W>).put(customize_template_handler::<R, N, W>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChangeRequest {
    pub(crate) status: String,
}

pub(crate) async fn register_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
    Json(record): Json<ApplicationRecord>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.register(record) {
        Ok(record) => (StatusCode::CREATED, Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.list() {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(ApplicationRecord::status_view).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn filter_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
    Json(criteria): Json<FilterCriteria>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.filter(&criteria) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn board_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.board() {
        Ok(board) => (StatusCode::OK, Json(board)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn change_status_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
    Path(application_id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.change_status(&ApplicationId(application_id), &request.status) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approve_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.act(&ApplicationId(application_id), PipelineAction::Approve) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reject_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.act(&ApplicationId(application_id), PipelineAction::Reject) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateUpdateRequest {
    pub(crate) subject: String,
    pub(crate) body: String,
}

pub(crate) async fn list_templates_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    (StatusCode::OK, Json(service.templates())).into_response()
}

pub(crate) async fn template_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
    Path(kind): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.template(&kind) {
        Ok(template) => (StatusCode::OK, Json(template)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn customize_template_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
    Path(kind): Path<String>,
    Json(request): Json<TemplateUpdateRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    match service.customize_template(&kind, request.subject, request.body) {
        Ok(template) => (StatusCode::OK, Json(template)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_templates_handler<R, N, W>(
    State(service): State<Arc<PipelineService<R, N, W>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
    W: WebhookPublisher + 'static,
{
    service.reset_templates();
    StatusCode::NO_CONTENT.into_response()
}

fn error_response(err: PipelineServiceError) -> Response {
    let status = match &err {
        PipelineServiceError::Criteria(_)
        | PipelineServiceError::InvalidRecord(_)
        | PipelineServiceError::Transition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineServiceError::Template(TemplateError::Empty { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PipelineServiceError::Template(TemplateError::UnknownKind(_))
        | PipelineServiceError::Persistence(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PipelineServiceError::Persistence(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PipelineServiceError::Persistence(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
