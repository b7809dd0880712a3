use std::cmp::Ordering;

use super::super::domain::{ApplicationRecord, ApplicationStatus};
use super::criteria::FilterCriteria;

pub(crate) fn passes_hard_filters(record: &ApplicationRecord, criteria: &FilterCriteria) -> bool {
    if criteria.hide_rejected && record.status == ApplicationStatus::Rejected {
        return false;
    }

    let Some(voice) = &record.voice_analysis else {
        return !criteria.require_voice_analysis;
    };

    // A missing sub-score fails its threshold.
    let meets = |score: Option<f32>, minimum: f32| score.is_some_and(|value| value >= minimum);

    meets(Some(voice.overall), criteria.min_overall_score)
        && meets(voice.clarity, criteria.min_english_fluency)
        && meets(voice.energy, criteria.min_motivation)
        && meets(voice.clarity, criteria.min_clarity)
}

/// Keep the best `percent` of the scored records, ranked by effective score.
/// Records without any overall score are dropped first.
pub(crate) fn select_top_percent<'a>(
    candidates: Vec<&'a ApplicationRecord>,
    percent: u8,
) -> Vec<&'a ApplicationRecord> {
    let mut scored: Vec<&ApplicationRecord> = candidates
        .into_iter()
        .filter(|record| record.has_any_overall_score())
        .collect();

    // `sort_by` is stable, so equal scores keep their input order.
    scored.sort_by(|left, right| {
        right
            .effective_score()
            .partial_cmp(&left.effective_score())
            .unwrap_or(Ordering::Equal)
    });

    let keep = top_count(scored.len(), percent);
    scored.truncate(keep);
    scored
}

pub(crate) fn top_count(count: usize, percent: u8) -> usize {
    (count * usize::from(percent)).div_ceil(100)
}
