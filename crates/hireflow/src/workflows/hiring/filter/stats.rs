use serde::{Deserialize, Serialize};

use super::super::domain::ApplicationRecord;

pub(crate) const HIGH_SCORE_THRESHOLD: f32 = 80.0;
pub(crate) const NATIVE_CLARITY_THRESHOLD: f32 = 90.0;
pub(crate) const MOTIVATED_THRESHOLD: f32 = 80.0;

/// Aggregates shown above the candidate list. Everything except `filtered`
/// describes the unfiltered input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterStatistics {
    pub total: usize,
    pub analyzed: usize,
    pub pre_screened: usize,
    pub high_scoring: usize,
    pub native_level: usize,
    pub motivated: usize,
    pub filtered: usize,
}

pub(crate) fn collect_statistics(
    applications: &[ApplicationRecord],
    filtered: usize,
) -> FilterStatistics {
    let mut stats = FilterStatistics {
        total: applications.len(),
        filtered,
        ..FilterStatistics::default()
    };

    for record in applications {
        if record.voice_analysis.is_some() {
            stats.analyzed += 1;
        }
        if record.pre_screening.is_some() {
            stats.pre_screened += 1;
        }
        if record.effective_score() >= HIGH_SCORE_THRESHOLD {
            stats.high_scoring += 1;
        }
        if record
            .voice_clarity()
            .is_some_and(|clarity| clarity >= NATIVE_CLARITY_THRESHOLD)
        {
            stats.native_level += 1;
        }

        let motivation = record
            .voice_energy()
            .unwrap_or(0.0)
            .max(record.pre_screening_motivation().unwrap_or(0.0));
        if motivation >= MOTIVATED_THRESHOLD {
            stats.motivated += 1;
        }
    }

    stats
}
