use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::hiring::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, Candidate, CandidateId, JobRole,
    JobRoleId, PreScreeningScores, VoiceAnalysis,
};
use crate::workflows::hiring::pipeline::{PersistInstruction, WebhookEvent};
use crate::workflows::hiring::repository::{
    ApplicationRepository, NotificationError, NotificationSender, RepositoryError, WebhookError,
    WebhookPublisher,
};
use crate::workflows::hiring::templates::{InMemoryTemplateStore, RenderedEmail, TemplateResolver};
use crate::workflows::hiring::{pipeline_router, PipelineService};

pub(super) fn record(id: &str, status: ApplicationStatus) -> ApplicationRecord {
    ApplicationRecord {
        id: ApplicationId(id.to_string()),
        status,
        candidate: Candidate {
            id: CandidateId(format!("cand-{id}")),
            first_name: "Maya".to_string(),
            last_name: "Okafor".to_string(),
            email: format!("{id}@example.com"),
            phone: None,
            tags: BTreeSet::from(["spanish".to_string()]),
        },
        job_role: JobRole {
            id: JobRoleId("role-support".to_string()),
            name: "Customer Support Specialist".to_string(),
            booking_link: Some("https://cal.example.com/support".to_string()),
        },
        voice_analysis: None,
        pre_screening: None,
        has_voice_recording: false,
        has_resume: true,
        has_video: false,
        applied_at: Utc
            .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
        interview_at: None,
        updated_at: None,
    }
}

pub(super) fn voice(overall: f32, clarity: Option<f32>, energy: Option<f32>) -> VoiceAnalysis {
    VoiceAnalysis {
        overall,
        clarity,
        pacing: None,
        tone: None,
        energy,
        confidence: None,
    }
}

pub(super) fn pre_screening(overall: f32, motivation: Option<f32>) -> PreScreeningScores {
    PreScreeningScores {
        overall,
        motivation,
        experience: None,
        availability: None,
        communication: None,
    }
}

pub(super) fn analyzed(id: &str, overall: f32, clarity: f32, energy: f32) -> ApplicationRecord {
    let mut record = record(id, ApplicationStatus::Applied);
    record.voice_analysis = Some(voice(overall, Some(clarity), Some(energy)));
    record.has_voice_recording = true;
    record
}

pub(super) fn pre_screened(id: &str, overall: f32) -> ApplicationRecord {
    let mut record = record(id, ApplicationStatus::Applied);
    record.pre_screening = Some(pre_screening(overall, None));
    record
}

pub(super) fn ids(records: &[ApplicationRecord]) -> Vec<&str> {
    records.iter().map(|record| record.id.0.as_str()).collect()
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<ApplicationId, ApplicationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn seeded(records: Vec<ApplicationRecord>) -> Self {
        let repository = Self::default();
        for record in records {
            repository.insert(record).expect("seed record");
        }
        repository
    }
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn apply_status(
        &self,
        change: &PersistInstruction,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
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

/// Reads succeed, status writes fail.
pub(super) struct ReadOnlyRepository(pub(super) MemoryRepository);

impl ApplicationRepository for ReadOnlyRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.0.fetch(id)
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.0.list()
    }

    fn apply_status(
        &self,
        _change: &PersistInstruction,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Holds every `fetch` until `parties` callers arrive, so concurrent
/// transitions plan against the same stored status.
pub(super) struct GatedRepository {
    inner: MemoryRepository,
    gate: Barrier,
}

impl GatedRepository {
    pub(super) fn new(inner: MemoryRepository, parties: usize) -> Self {
        Self {
            inner,
            gate: Barrier::new(parties),
        }
    }
}

impl ApplicationRepository for GatedRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let record = self.inner.fetch(id);
        self.gate.wait();
        record
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list()
    }

    fn apply_status(
        &self,
        change: &PersistInstruction,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.apply_status(change)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryOutbox {
    sent: Arc<Mutex<Vec<RenderedEmail>>>,
}

impl MemoryOutbox {
    pub(super) fn sent(&self) -> Vec<RenderedEmail> {
        self.sent.lock().expect("outbox mutex poisoned").clone()
    }
}

impl NotificationSender for MemoryOutbox {
    fn send(&self, email: RenderedEmail) -> Result<(), NotificationError> {
        self.sent.lock().expect("outbox mutex poisoned").push(email);
        Ok(())
    }
}

pub(super) struct BouncingOutbox;

impl NotificationSender for BouncingOutbox {
    fn send(&self, _email: RenderedEmail) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay down".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryWebhooks {
    events: Arc<Mutex<Vec<WebhookEvent>>>,
}

impl MemoryWebhooks {
    pub(super) fn events(&self) -> Vec<WebhookEvent> {
        self.events.lock().expect("webhook mutex poisoned").clone()
    }
}

impl WebhookPublisher for MemoryWebhooks {
    fn publish(&self, event: &WebhookEvent) -> Result<(), WebhookError> {
        self.events
            .lock()
            .expect("webhook mutex poisoned")
            .push(event.clone());
        Ok(())
    }
}

pub(super) struct UnreachableWebhooks;

impl WebhookPublisher for UnreachableWebhooks {
    fn publish(&self, _event: &WebhookEvent) -> Result<(), WebhookError> {
        Err(WebhookError::Delivery("connection refused".to_string()))
    }
}

pub(super) fn templates() -> TemplateResolver {
    TemplateResolver::new(Arc::new(InMemoryTemplateStore::default()))
}

pub(super) type MemoryService = PipelineService<MemoryRepository, MemoryOutbox, MemoryWebhooks>;

pub(super) fn build_service(
    records: Vec<ApplicationRecord>,
) -> (
    MemoryService,
    Arc<MemoryRepository>,
    Arc<MemoryOutbox>,
    Arc<MemoryWebhooks>,
) {
    let repository = Arc::new(MemoryRepository::seeded(records));
    let outbox = Arc::new(MemoryOutbox::default());
    let webhooks = Arc::new(MemoryWebhooks::default());
    let service = PipelineService::new(
        repository.clone(),
        outbox.clone(),
        webhooks.clone(),
        templates(),
    );
    (service, repository, outbox, webhooks)
}

pub(super) fn router_with_records(records: Vec<ApplicationRecord>) -> axum::Router {
    let (service, _, _, _) = build_service(records);
    pipeline_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
