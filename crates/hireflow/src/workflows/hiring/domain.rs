use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobRoleId(pub String);

/// Person behind one or more applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Advertised role an application targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRole {
    pub id: JobRoleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
}

/// Scores produced by the voice-analysis oracle. The struct only exists once an
/// overall score has been computed; sub-scores may still be missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceAnalysis {
    pub overall: f32,
    #[serde(default)]
    pub clarity: Option<f32>,
    #[serde(default)]
    pub pacing: Option<f32>,
    #[serde(default)]
    pub tone: Option<f32>,
    #[serde(default)]
    pub energy: Option<f32>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Scores derived from the written pre-screening questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreScreeningScores {
    pub overall: f32,
    #[serde(default)]
    pub motivation: Option<f32>,
    #[serde(default)]
    pub experience: Option<f32>,
    #[serde(default)]
    pub availability: Option<f32>,
    #[serde(default)]
    pub communication: Option<f32>,
}

/// Upper bound accepted for any score. Voice scores are nominally 0-10 and
/// pre-screening scores 0-100; both are stored raw.
pub const MAX_SCORE: f32 = 100.0;

/// One candidate's application to one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub candidate: Candidate,
    pub job_role: JobRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_analysis: Option<VoiceAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_screening: Option<PreScreeningScores>,
    #[serde(default)]
    pub has_voice_recording: bool,
    #[serde(default)]
    pub has_resume: bool,
    #[serde(default)]
    pub has_video: bool,
    pub applied_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApplicationRecord {
    pub fn voice_overall(&self) -> Option<f32> {
        self.voice_analysis.map(|voice| voice.overall)
    }

    pub fn voice_clarity(&self) -> Option<f32> {
        self.voice_analysis.and_then(|voice| voice.clarity)
    }

    pub fn voice_energy(&self) -> Option<f32> {
        self.voice_analysis.and_then(|voice| voice.energy)
    }

    pub fn pre_screening_overall(&self) -> Option<f32> {
        self.pre_screening.map(|scores| scores.overall)
    }

    pub fn pre_screening_motivation(&self) -> Option<f32> {
        self.pre_screening.and_then(|scores| scores.motivation)
    }

    /// Best available score across both sources, absent scores counting as 0.
    /// The two sources use different scales and are compared raw.
    pub fn effective_score(&self) -> f32 {
        self.voice_overall()
            .unwrap_or(0.0)
            .max(self.pre_screening_overall().unwrap_or(0.0))
    }

    pub fn has_any_overall_score(&self) -> bool {
        self.voice_analysis.is_some() || self.pre_screening.is_some()
    }

    /// Reject records whose scores fall outside the accepted range.
    pub fn validate(&self) -> Result<(), ScoreRangeError> {
        if let Some(voice) = &self.voice_analysis {
            check_score("voice_analysis.overall", Some(voice.overall))?;
            check_score("voice_analysis.clarity", voice.clarity)?;
            check_score("voice_analysis.pacing", voice.pacing)?;
            check_score("voice_analysis.tone", voice.tone)?;
            check_score("voice_analysis.energy", voice.energy)?;
            check_score("voice_analysis.confidence", voice.confidence)?;
        }

        if let Some(scores) = &self.pre_screening {
            check_score("pre_screening.overall", Some(scores.overall))?;
            check_score("pre_screening.motivation", scores.motivation)?;
            check_score("pre_screening.experience", scores.experience)?;
            check_score("pre_screening.availability", scores.availability)?;
            check_score("pre_screening.communication", scores.communication)?;
        }

        Ok(())
    }
}

fn check_score(field: &'static str, value: Option<f32>) -> Result<(), ScoreRangeError> {
    match value {
        Some(score) if !score.is_finite() || !(0.0..=MAX_SCORE).contains(&score) => {
            Err(ScoreRangeError { field, value: score })
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("score {field} = {value} is outside 0..={max}", max = MAX_SCORE)]
pub struct ScoreRangeError {
    pub field: &'static str,
    pub value: f32,
}

/// Stage an application occupies on the hiring board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Reviewed,
    InterviewScheduled,
    InterviewCompleted,
    OfferSent,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Applied,
            Self::Reviewed,
            Self::InterviewScheduled,
            Self::InterviewCompleted,
            Self::OfferSent,
            Self::Hired,
            Self::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Reviewed => "reviewed",
            Self::InterviewScheduled => "interview_scheduled",
            Self::InterviewCompleted => "interview_completed",
            Self::OfferSent => "offer_sent",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Reviewed => "Reviewed",
            Self::InterviewScheduled => "Interview Scheduled",
            Self::InterviewCompleted => "Interview Completed",
            Self::OfferSent => "Offer Sent",
            Self::Hired => "Hired",
            Self::Rejected => "Rejected",
        }
    }

    /// Successor reached by an approve action; `None` for terminal stages.
    pub const fn advance(self) -> Option<Self> {
        match self {
            Self::Applied => Some(Self::Reviewed),
            Self::Reviewed => Some(Self::InterviewScheduled),
            Self::InterviewScheduled => Some(Self::InterviewCompleted),
            Self::InterviewCompleted => Some(Self::OfferSent),
            Self::OfferSent => Some(Self::Hired),
            Self::Hired | Self::Rejected => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = InvalidStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| InvalidStateError {
                value: value.to_string(),
            })
    }
}

/// Raised when a status string does not name a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid application status")]
pub struct InvalidStateError {
    pub value: String,
}
