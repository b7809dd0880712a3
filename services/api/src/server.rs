use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository, LoggingMailer, StatusWebhooks};
use crate::routes::with_pipeline_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hireflow::config::AppConfig;
use hireflow::error::AppError;
use hireflow::telemetry;
use hireflow::workflows::hiring::{InMemoryTemplateStore, PipelineService, TemplateResolver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let webhooks = match StatusWebhooks::from_config(&config.notifications) {
        Ok(webhooks) => webhooks,
        Err(err) => {
            warn!(error = %err, "webhook client unavailable; status events will not be posted");
            StatusWebhooks::Disabled
        }
    };
    let pipeline_service = Arc::new(PipelineService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(LoggingMailer::new(config.notifications.email_from.clone())),
        Arc::new(webhooks),
        TemplateResolver::new(Arc::new(InMemoryTemplateStore::default())),
    ));

    let app = with_pipeline_routes(pipeline_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        webhooks = config.notifications.webhook_url.is_some(),
        "hireflow pipeline service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
