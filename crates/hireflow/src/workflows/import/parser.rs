use std::collections::BTreeSet;
use std::io::Read;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use crate::workflows::hiring::{
    ApplicationId, ApplicationRecord, ApplicationStatus, Candidate, CandidateId, JobRole,
    JobRoleId, PreScreeningScores, VoiceAnalysis,
};

use super::ImportError;

pub(crate) fn parse_records<R: Read>(mut reader: R) -> Result<Vec<ApplicationRecord>, ImportError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input.as_slice());
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let line = row
            .position()
            .map_or(0, |position| first_line(&input, position));
        let record = row
            .deserialize::<ApplicationRow>(Some(&headers))?
            .into_record(line)?;
        record
            .validate()
            .map_err(|source| ImportError::Scores { line, source })?;
        records.push(record);
    }

    Ok(records)
}

/// Line on which a row's first field sits. The reader records a row's position
/// before it skips blank lines, so those are counted here.
fn first_line(input: &[u8], position: &csv::Position) -> usize {
    let start = usize::try_from(position.byte())
        .unwrap_or(input.len())
        .min(input.len());
    let skipped = input[start..]
        .iter()
        .take_while(|byte| matches!(byte, b'\r' | b'\n'))
        .filter(|byte| **byte == b'\n')
        .count();
    usize::try_from(position.line()).unwrap_or(usize::MAX).saturating_add(skipped)
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    #[serde(rename = "Application ID")]
    application_id: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Candidate ID")]
    candidate_id: String,
    #[serde(rename = "First Name")]
    first_name: String,
    #[serde(rename = "Last Name")]
    last_name: String,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Phone", default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(rename = "Tags", default, deserialize_with = "empty_string_as_none")]
    tags: Option<String>,
    #[serde(rename = "Job Role ID")]
    job_role_id: String,
    #[serde(rename = "Job Role")]
    job_role: String,
    #[serde(
        rename = "Booking Link",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    booking_link: Option<String>,
    #[serde(rename = "Voice Overall", default)]
    voice_overall: Option<f32>,
    #[serde(rename = "Voice Clarity", default)]
    voice_clarity: Option<f32>,
    #[serde(rename = "Voice Pacing", default)]
    voice_pacing: Option<f32>,
    #[serde(rename = "Voice Tone", default)]
    voice_tone: Option<f32>,
    #[serde(rename = "Voice Energy", default)]
    voice_energy: Option<f32>,
    #[serde(rename = "Voice Confidence", default)]
    voice_confidence: Option<f32>,
    #[serde(rename = "Pre-Screening Overall", default)]
    pre_screening_overall: Option<f32>,
    #[serde(rename = "Motivation", default)]
    motivation: Option<f32>,
    #[serde(rename = "Experience", default)]
    experience: Option<f32>,
    #[serde(rename = "Availability", default)]
    availability: Option<f32>,
    #[serde(rename = "Communication", default)]
    communication: Option<f32>,
    #[serde(
        rename = "Has Voice Recording",
        default,
        deserialize_with = "flag"
    )]
    has_voice_recording: bool,
    #[serde(rename = "Has Resume", default, deserialize_with = "flag")]
    has_resume: bool,
    #[serde(rename = "Has Video", default, deserialize_with = "flag")]
    has_video: bool,
    #[serde(rename = "Applied At")]
    applied_at: String,
    #[serde(
        rename = "Interview At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    interview_at: Option<String>,
    #[serde(
        rename = "Updated At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    updated_at: Option<String>,
}

impl ApplicationRow {
    fn into_record(self, line: usize) -> Result<ApplicationRecord, ImportError> {
        let status = self
            .status
            .parse::<ApplicationStatus>()
            .map_err(|source| ImportError::Status { line, source })?;

        let voice_analysis = match self.voice_overall {
            Some(overall) => Some(VoiceAnalysis {
                overall,
                clarity: self.voice_clarity,
                pacing: self.voice_pacing,
                tone: self.voice_tone,
                energy: self.voice_energy,
                confidence: self.voice_confidence,
            }),
            None if [
                self.voice_clarity,
                self.voice_pacing,
                self.voice_tone,
                self.voice_energy,
                self.voice_confidence,
            ]
            .iter()
            .any(Option::is_some) =>
            {
                return Err(ImportError::Row {
                    line,
                    message: "voice sub-scores present without an overall voice score".to_string(),
                });
            }
            None => None,
        };

        let pre_screening = self
            .pre_screening_overall
            .map(|overall| PreScreeningScores {
                overall,
                motivation: self.motivation,
                experience: self.experience,
                availability: self.availability,
                communication: self.communication,
            });

        let applied_at = parse_timestamp(&self.applied_at).ok_or_else(|| ImportError::Row {
            line,
            message: format!("unreadable Applied At value '{}'", self.applied_at),
        })?;
        let interview_at = optional_timestamp(self.interview_at.as_deref(), "Interview At", line)?;
        let updated_at = optional_timestamp(self.updated_at.as_deref(), "Updated At", line)?;

        let tags: BTreeSet<String> = self
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ApplicationRecord {
            id: ApplicationId(self.application_id),
            status,
            candidate: Candidate {
                id: CandidateId(self.candidate_id),
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
                tags,
            },
            job_role: JobRole {
                id: JobRoleId(self.job_role_id),
                name: self.job_role,
                booking_link: self.booking_link,
            },
            voice_analysis,
            pre_screening,
            has_voice_recording: self.has_voice_recording,
            has_resume: self.has_resume,
            has_video: self.has_video,
            applied_at,
            interview_at,
            updated_at,
        })
    }
}

fn optional_timestamp(
    value: Option<&str>,
    column: &str,
    line: usize,
) -> Result<Option<DateTime<Utc>>, ImportError> {
    value
        .map(|raw| {
            parse_timestamp(raw).ok_or_else(|| ImportError::Row {
                line,
                message: format!("unreadable {column} value '{raw}'"),
            })
        })
        .transpose()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" | "n" => Ok(false),
        "true" | "yes" | "1" | "y" => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "expected yes/no flag, found '{other}'"
        ))),
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
