use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::domain::ApplicationRecord;
use super::pipeline::TemplateKind;

/// Subject/body pair with `{{placeholder}}` markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub kind: TemplateKind,
    pub subject: String,
    pub body: String,
}

impl EmailTemplate {
    pub fn builtin(kind: TemplateKind) -> Self {
        let (subject, body) = match kind {
            TemplateKind::Interview => (
                "Next steps for your {{jobRole}} application",
                "Hi {{firstName}},\n\n\
                 Thanks for applying for the {{jobRole}} position. We would like to invite you \
                 to an interview. Please pick a time that suits you here: {{bookingLink}}\n\n\
                 We will send any updates to {{email}}.\n\n\
                 Best regards,\nThe Hiring Team",
            ),
            TemplateKind::ThankYou => (
                "Your application for {{jobRole}}",
                "Hi {{firstName}} {{lastName}},\n\n\
                 Thank you for your interest in the {{jobRole}} position and for the time you \
                 spent on your application. After careful consideration we have decided to move \
                 forward with other candidates.\n\n\
                 We wish you every success.\n\n\
                 Best regards,\nThe Hiring Team",
            ),
            TemplateKind::Welcome => (
                "Welcome aboard, {{firstName}}!",
                "Hi {{firstName}} {{lastName}},\n\n\
                 We are delighted to welcome you as our new {{jobRole}}. Onboarding details \
                 will follow shortly at {{email}}.\n\n\
                 Best regards,\nThe Hiring Team",
            ),
        };

        Self {
            kind,
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }
}

/// Rejected template management request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown template '{0}'")]
    UnknownKind(String),
    #[error("template {field} must not be empty")]
    Empty { field: &'static str },
}

/// Key-value storage for customized templates.
pub trait TemplateStore: Send + Sync {
    fn get(&self, kind: TemplateKind) -> Option<EmailTemplate>;
    fn set(&self, template: EmailTemplate);
    fn clear(&self);
}

/// Process-local template store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTemplateStore {
    templates: Arc<Mutex<BTreeMap<TemplateKind, EmailTemplate>>>,
}

impl TemplateStore for InMemoryTemplateStore {
    fn get(&self, kind: TemplateKind) -> Option<EmailTemplate> {
        let guard = self.templates.lock().expect("template mutex poisoned");
        guard.get(&kind).cloned()
    }

    fn set(&self, template: EmailTemplate) {
        let mut guard = self.templates.lock().expect("template mutex poisoned");
        guard.insert(template.kind, template);
    }

    fn clear(&self) {
        self.templates
            .lock()
            .expect("template mutex poisoned")
            .clear();
    }
}

/// An interpolated email ready for the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub template: TemplateKind,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Picks the stored override for a template kind, falling back to the built-in copy.
#[derive(Clone)]
pub struct TemplateResolver {
    store: Arc<dyn TemplateStore>,
}

impl TemplateResolver {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    pub fn resolve(&self, kind: TemplateKind) -> EmailTemplate {
        self.store
            .get(kind)
            .unwrap_or_else(|| EmailTemplate::builtin(kind))
    }

    /// Effective template for every kind, overrides included.
    pub fn catalog(&self) -> Vec<EmailTemplate> {
        TemplateKind::ordered()
            .into_iter()
            .map(|kind| self.resolve(kind))
            .collect()
    }

    /// Store an override. Subject and body must carry text.
    pub fn customize(&self, template: EmailTemplate) -> Result<EmailTemplate, TemplateError> {
        if template.subject.trim().is_empty() {
            return Err(TemplateError::Empty { field: "subject" });
        }
        if template.body.trim().is_empty() {
            return Err(TemplateError::Empty { field: "body" });
        }
        self.store.set(template.clone());
        Ok(template)
    }

    /// Drop every override so the built-in copy applies again.
    pub fn reset(&self) {
        self.store.clear();
    }

    pub fn render(&self, kind: TemplateKind, record: &ApplicationRecord) -> RenderedEmail {
        let template = self.resolve(kind);
        let values = placeholder_values(record);

        RenderedEmail {
            template: kind,
            to: record.candidate.email.clone(),
            subject: interpolate(&template.subject, &values),
            body: interpolate(&template.body, &values),
        }
    }
}

fn placeholder_values(record: &ApplicationRecord) -> [(&'static str, &str); 5] {
    [
        ("firstName", record.candidate.first_name.as_str()),
        ("lastName", record.candidate.last_name.as_str()),
        ("jobRole", record.job_role.name.as_str()),
        ("email", record.candidate.email.as_str()),
        (
            "bookingLink",
            record.job_role.booking_link.as_deref().unwrap_or_default(),
        ),
    ]
}

/// Replace every `{{key}}` with its value in a single pass. Substituted values
/// are never rescanned, and unknown placeholders are left untouched.
pub(crate) fn interpolate(text: &str, values: &[(&'static str, &str)]) -> String {
    let mut rendered = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        rendered.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let substitution = after_open.find("}}").and_then(|close| {
            let key = &after_open[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });

        match substitution {
            Some((value, close)) => {
                rendered.push_str(value);
                rest = &after_open[close + 2..];
            }
            None => {
                rendered.push_str("{{");
                rest = after_open;
            }
        }
    }

    rendered.push_str(rest);
    rendered
}
