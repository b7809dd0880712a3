use hireflow::config::NotificationConfig;
use hireflow::workflows::hiring::{
    ApplicationId, ApplicationRecord, ApplicationRepository, NotificationError,
    NotificationSender, PersistInstruction, RenderedEmail, RepositoryError, WebhookError,
    WebhookEvent, WebhookPublisher, MAX_SCORE,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{info, warn};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("hireflow/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type Records = HashMap<ApplicationId, ApplicationRecord>;

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<Records>>,
}

impl InMemoryApplicationRepository {
    pub(crate) fn seeded(records: Vec<ApplicationRecord>) -> Result<Self, RepositoryError> {
        let repository = Self::default();
        for record in records {
            repository.insert(record)?;
        }
        Ok(repository)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    /// Oldest application first.
    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.lock()?;
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|left, right| {
            left.applied_at
                .cmp(&right.applied_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(records)
    }

    fn apply_status(
        &self,
        change: &PersistInstruction,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard
            .get_mut(&change.application_id)
            .ok_or(RepositoryError::NotFound)?;
        if record.status != change.previous_status {
            return Err(RepositoryError::Conflict);
        }
        record.status = change.new_status;
        record.updated_at = Some(change.updated_at);
        Ok(record.clone())
    }
}

/// Stand-in mail transport: logs each message and keeps a copy for the demo output.
#[derive(Clone)]
pub(crate) struct LoggingMailer {
    from: String,
    outbox: Arc<Mutex<Vec<RenderedEmail>>>,
}

impl LoggingMailer {
    pub(crate) fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            outbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn sent(&self) -> Vec<RenderedEmail> {
        self.outbox
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationSender for LoggingMailer {
    fn send(&self, email: RenderedEmail) -> Result<(), NotificationError> {
        if !email.to.contains('@') {
            return Err(NotificationError::Recipient(email.to));
        }

        info!(
            from = %self.from,
            to = %email.to,
            template = email.template.label(),
            subject = %email.subject,
            "email dispatched"
        );

        self.outbox
            .lock()
            .map_err(|_| NotificationError::Transport("outbox mutex poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}

/// Posts status-change events as JSON. Delivery runs on a spawned task so the
/// caller never waits on the remote endpoint.
#[derive(Clone)]
pub(crate) struct HttpWebhookPublisher {
    client: reqwest::Client,
    url: String,
}

impl HttpWebhookPublisher {
    pub(crate) fn new(url: impl Into<String>) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|err| WebhookError::Delivery(err.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl WebhookPublisher for HttpWebhookPublisher {
    fn publish(&self, event: &WebhookEvent) -> Result<(), WebhookError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| WebhookError::Delivery(err.to_string()))?;

        let request = self.client.post(&self.url).json(event);
        let url = self.url.clone();
        let candidate_id = event.candidate_id.0.clone();

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => warn!(
                    %url,
                    %candidate_id,
                    status = response.status().as_u16(),
                    "webhook endpoint rejected event"
                ),
                Err(err) => warn!(
                    %url,
                    %candidate_id,
                    error = %err,
                    "webhook delivery failed"
                ),
            }
        });

        Ok(())
    }
}

/// Webhook target chosen from configuration.
#[derive(Clone)]
pub(crate) enum StatusWebhooks {
    Disabled,
    Http(HttpWebhookPublisher),
}

impl StatusWebhooks {
    pub(crate) fn from_config(config: &NotificationConfig) -> Result<Self, WebhookError> {
        match &config.webhook_url {
            Some(url) => Ok(Self::Http(HttpWebhookPublisher::new(url.as_str())?)),
            None => Ok(Self::Disabled),
        }
    }
}

impl WebhookPublisher for StatusWebhooks {
    fn publish(&self, event: &WebhookEvent) -> Result<(), WebhookError> {
        match self {
            StatusWebhooks::Disabled => {
                info!(
                    event_type = %event.event_type,
                    from = %event.previous_status,
                    to = %event.new_status,
                    "webhook disabled; event not delivered"
                );
                Ok(())
            }
            StatusWebhooks::Http(publisher) => publisher.publish(event),
        }
    }
}

/// Command-line score threshold, using the same bounds as the HTTP filter endpoint.
pub(crate) fn parse_threshold(raw: &str) -> Result<f32, String> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse '{raw}' as a score ({err})"))?;
    if !value.is_finite() || !(0.0..=MAX_SCORE).contains(&value) {
        return Err(format!("score thresholds must be between 0 and {MAX_SCORE}"));
    }
    Ok(value)
}
