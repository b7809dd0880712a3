use std::sync::Arc;

use super::common::*;
use crate::workflows::hiring::domain::ApplicationStatus;
use crate::workflows::hiring::pipeline::TemplateKind;
use crate::workflows::hiring::templates::{
    interpolate, EmailTemplate, InMemoryTemplateStore, TemplateResolver, TemplateStore,
};

#[test]
fn render_fills_every_placeholder() {
    let store = Arc::new(InMemoryTemplateStore::default());
    store.set(EmailTemplate {
        kind: TemplateKind::Interview,
        subject: "{{jobRole}} interview".to_string(),
        body: "{{firstName}} {{lastName}} <{{email}}> {{bookingLink}}".to_string(),
    });
    let resolver = TemplateResolver::new(store);

    let email = resolver.render(
        TemplateKind::Interview,
        &record("app-1", ApplicationStatus::Reviewed),
    );

    assert_eq!(email.to, "app-1@example.com");
    assert_eq!(email.subject, "Customer Support Specialist interview");
    assert_eq!(
        email.body,
        "Maya Okafor <app-1@example.com> https://cal.example.com/support"
    );
}

#[test]
fn missing_booking_link_renders_empty() {
    let mut application = record("app-2", ApplicationStatus::Reviewed);
    application.job_role.booking_link = None;

    let email = templates().render(TemplateKind::Interview, &application);

    assert!(!email.body.contains("{{bookingLink}}"));
    assert!(email.body.contains("here: \n"));
}

#[test]
fn builtin_templates_exist_for_every_kind() {
    let resolver = templates();
    for kind in TemplateKind::ordered() {
        let template = resolver.resolve(kind);
        assert_eq!(template, EmailTemplate::builtin(kind));
        assert!(template.body.contains("{{firstName}}"), "{}", kind.label());
    }
}

#[test]
fn clearing_the_store_restores_defaults() {
    let store = Arc::new(InMemoryTemplateStore::default());
    store.set(EmailTemplate {
        kind: TemplateKind::Welcome,
        subject: "custom".to_string(),
        body: "custom".to_string(),
    });
    let resolver = TemplateResolver::new(store.clone());
    assert_eq!(resolver.resolve(TemplateKind::Welcome).subject, "custom");

    store.clear();

    assert_eq!(
        resolver.resolve(TemplateKind::Welcome),
        EmailTemplate::builtin(TemplateKind::Welcome)
    );
}

#[test]
fn interpolate_leaves_unknown_placeholders() {
    let rendered = interpolate("{{firstName}} {{salary}}", &[("firstName", "Ana")]);
    assert_eq!(rendered, "Ana {{salary}}");
}

#[test]
fn placeholder_text_inside_candidate_fields_renders_literally() {
    let mut application = record("app-x", ApplicationStatus::OfferSent);
    application.candidate.first_name = "{{email}}".to_string();
    application.candidate.last_name = "{{bookingLink}}".to_string();

    let email = templates().render(TemplateKind::Welcome, &application);

    assert_eq!(email.subject, "Welcome aboard, {{email}}!");
    assert!(!email.subject.contains("app-x@example.com"));
}

#[test]
fn interpolate_handles_unterminated_and_nested_braces() {
    let values = [("firstName", "Ana")];
    assert_eq!(interpolate("Hi {{firstName", &values), "Hi {{firstName");
    assert_eq!(interpolate("{{{{firstName}}", &values), "{{Ana");
}
