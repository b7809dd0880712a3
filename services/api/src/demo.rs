use crate::infra::{InMemoryApplicationRepository, LoggingMailer, StatusWebhooks};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use hireflow::config::DEFAULT_EMAIL_FROM;
use hireflow::error::AppError;
use hireflow::workflows::hiring::{
    ApplicationId, ApplicationRecord, ApplicationStatus, Candidate, CandidateId, FilterCriteria,
    FilterOutcome, InMemoryTemplateStore, JobRole, JobRoleId, PipelineAction, PipelineBoard,
    PipelineService, PreScreeningScores, SmartFilterEngine, TemplateResolver, TransitionReport,
    VoiceAnalysis,
};
use hireflow::workflows::import::CandidateImporter;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Smart filter switches shared by the `filter` and `demo` commands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CriteriaArgs {
    /// Minimum overall voice score
    #[arg(long, default_value_t = 0.0, value_parser = crate::infra::parse_threshold)]
    pub(crate) min_overall_score: f32,
    /// Minimum English fluency (voice clarity) score
    #[arg(long, default_value_t = 0.0, value_parser = crate::infra::parse_threshold)]
    pub(crate) min_english_fluency: f32,
    /// Minimum motivation (voice energy) score
    #[arg(long, default_value_t = 0.0, value_parser = crate::infra::parse_threshold)]
    pub(crate) min_motivation: f32,
    /// Minimum voice clarity score
    #[arg(long, default_value_t = 0.0, value_parser = crate::infra::parse_threshold)]
    pub(crate) min_clarity: f32,
    /// Drop applications without a voice analysis
    #[arg(long)]
    pub(crate) require_voice_analysis: bool,
    /// Drop rejected applications
    #[arg(long)]
    pub(crate) hide_rejected: bool,
    /// Keep only the best N percent by effective score (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub(crate) top_percent: Option<u8>,
}

impl CriteriaArgs {
    pub(crate) fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            min_overall_score: self.min_overall_score,
            min_english_fluency: self.min_english_fluency,
            min_motivation: self.min_motivation,
            min_clarity: self.min_clarity,
            require_voice_analysis: self.require_voice_analysis,
            hide_rejected: self.hide_rejected,
            top_percent_only: self.top_percent,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct FilterArgs {
    /// Applications CSV export to filter
    #[arg(long)]
    pub(crate) applications: PathBuf,
    #[command(flatten)]
    pub(crate) criteria: CriteriaArgs,
    /// List every application that passed the filter
    #[arg(long)]
    pub(crate) list: bool,
    /// Print the outcome as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) criteria: CriteriaArgs,
    /// Optional applications CSV export used instead of the seeded candidate pool
    #[arg(long)]
    pub(crate) applications: Option<PathBuf>,
    /// Skip the stage-change portion of the demo
    #[arg(long)]
    pub(crate) skip_transitions: bool,
}

pub(crate) fn run_filter(args: FilterArgs) -> Result<(), AppError> {
    let FilterArgs {
        applications,
        criteria,
        list,
        json,
    } = args;

    let records = CandidateImporter::from_path(&applications)?;
    let criteria = criteria.into_criteria();
    criteria.validate()?;
    let outcome = SmartFilterEngine::new().apply(&records, &criteria);

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Filter outcome unavailable as JSON: {err}"),
        }
        return Ok(());
    }

    println!("Smart filter results for {}", applications.display());
    render_outcome(&outcome, list);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        criteria,
        applications,
        skip_transitions,
    } = args;

    let (records, source) = match applications {
        Some(path) => {
            let records = CandidateImporter::from_path(&path)?;
            (records, format!("CSV export {}", path.display()))
        }
        None => (demo_applications(Utc::now()), "seeded candidate pool".to_string()),
    };
    let criteria = criteria.into_criteria();
    criteria.validate()?;

    println!("HireFlow pipeline demo ({source})");

    let repository = match InMemoryApplicationRepository::seeded(records) {
        Ok(repository) => Arc::new(repository),
        Err(err) => {
            println!("  Candidate pool rejected: {err}");
            return Ok(());
        }
    };
    let mailer = Arc::new(LoggingMailer::new(DEFAULT_EMAIL_FROM));
    let service = PipelineService::new(
        repository,
        mailer.clone(),
        Arc::new(StatusWebhooks::Disabled),
        TemplateResolver::new(Arc::new(InMemoryTemplateStore::default())),
    );

    let outcome = match service.filter(&criteria) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Filter unavailable: {err}");
            return Ok(());
        }
    };
    render_outcome(&outcome, true);

    if skip_transitions {
        return Ok(());
    }

    println!("\nStage changes");
    if let Some(best) = outcome.filtered.first() {
        let id = best.id.clone();
        for _ in 0..2 {
            render_transition(&id, service.act(&id, PipelineAction::Approve));
        }
    }
    if let Some(weakest) = outcome
        .filtered
        .iter()
        .skip(1)
        .last()
        .filter(|record| !record.status.is_terminal())
    {
        render_transition(
            &weakest.id,
            service.act(&weakest.id, PipelineAction::Reject),
        );
    }

    match service.board() {
        Ok(board) => render_board(&board),
        Err(err) => println!("  Board unavailable: {err}"),
    }

    let sent = mailer.sent();
    if sent.is_empty() {
        println!("\nOutbox: no emails sent");
    } else {
        println!("\nOutbox");
        for email in sent {
            println!(
                "- [{}] {} -> {}",
                email.template.label(),
                email.subject,
                email.to
            );
        }
    }

    Ok(())
}

fn render_outcome(outcome: &FilterOutcome, list: bool) {
    let stats = &outcome.statistics;
    println!(
        "- {} applications | {} voice analyzed | {} pre-screened",
        stats.total, stats.analyzed, stats.pre_screened
    );
    println!(
        "- {} high scoring | {} native level | {} motivated",
        stats.high_scoring, stats.native_level, stats.motivated
    );
    println!("- {} passed the filter", stats.filtered);

    if !list {
        return;
    }
    for record in &outcome.filtered {
        let score = if record.has_any_overall_score() {
            format!("{:.1}", record.effective_score())
        } else {
            "unscored".to_string()
        };
        println!(
            "  - {} | {} | {} | {} | {}",
            record.id.0,
            record.candidate.full_name(),
            record.job_role.name,
            record.status.display_name(),
            score
        );
    }
}

fn render_transition<E: std::fmt::Display>(
    id: &ApplicationId,
    result: Result<TransitionReport, E>,
) {
    match result {
        Ok(report) => {
            let email = report
                .plan
                .notification
                .map(|plan| plan.template_type.label())
                .unwrap_or("none");
            println!(
                "- {}: {} -> {} (email: {email}, webhook: {})",
                id.0,
                report.plan.webhook_event.previous_status.display_name(),
                report.record.status.display_name(),
                report.plan.webhook_event.event_type
            );
            if report.notification.is_failure() {
                println!("  Notification failed: {:?}", report.notification);
            }
        }
        Err(err) => println!("- {}: transition refused ({err})", id.0),
    }
}

fn render_board(board: &PipelineBoard) {
    println!("\nPipeline board");
    for column in &board.columns {
        println!("- {}: {}", column.label, column.count);
    }
}

fn demo_applications(now: DateTime<Utc>) -> Vec<ApplicationRecord> {
    let support = JobRole {
        id: JobRoleId("role-support".to_string()),
        name: "Customer Support Specialist".to_string(),
        booking_link: Some("https://cal.example.com/hireflow/support".to_string()),
    };
    let sales = JobRole {
        id: JobRoleId("role-sales".to_string()),
        name: "Inside Sales Representative".to_string(),
        booking_link: None,
    };

    vec![
        demo_record(
            "app-1001",
            ("Amara", "Nwosu"),
            &support,
            Some(voice(8.9, 9.3, 8.4)),
            Some(prescreen(86.0, 91.0)),
            now - Duration::days(6),
        ),
        demo_record(
            "app-1002",
            ("Diego", "Alvarez"),
            &support,
            Some(voice(7.2, 7.8, 6.1)),
            None,
            now - Duration::days(5),
        ),
        demo_record(
            "app-1003",
            ("Hana", "Kobayashi"),
            &sales,
            None,
            Some(prescreen(78.0, 82.0)),
            now - Duration::days(4),
        ),
        demo_record(
            "app-1004",
            ("Oskar", "Nilsson"),
            &sales,
            Some(voice(5.4, 6.0, 4.8)),
            Some(prescreen(55.0, 60.0)),
            now - Duration::days(3),
        ),
        demo_record(
            "app-1005",
            ("Leila", "Haddad"),
            &support,
            None,
            None,
            now - Duration::days(1),
        ),
    ]
}

fn voice(overall: f32, clarity: f32, energy: f32) -> VoiceAnalysis {
    VoiceAnalysis {
        overall,
        clarity: Some(clarity),
        pacing: None,
        tone: None,
        energy: Some(energy),
        confidence: None,
    }
}

fn prescreen(overall: f32, motivation: f32) -> PreScreeningScores {
    PreScreeningScores {
        overall,
        motivation: Some(motivation),
        experience: None,
        availability: None,
        communication: None,
    }
}

fn demo_record(
    id: &str,
    (first_name, last_name): (&str, &str),
    role: &JobRole,
    voice_analysis: Option<VoiceAnalysis>,
    pre_screening: Option<PreScreeningScores>,
    applied_at: DateTime<Utc>,
) -> ApplicationRecord {
    ApplicationRecord {
        id: ApplicationId(id.to_string()),
        status: ApplicationStatus::Applied,
        candidate: Candidate {
            id: CandidateId(format!("cand-{id}")),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}.{}@example.com", first_name, last_name).to_lowercase(),
            phone: None,
            tags: BTreeSet::new(),
        },
        job_role: role.clone(),
        has_voice_recording: voice_analysis.is_some(),
        voice_analysis,
        pre_screening,
        has_resume: true,
        has_video: false,
        applied_at,
        interview_at: None,
        updated_at: None,
    }
}
