mod criteria;
mod rules;
mod stats;

pub use criteria::{CriteriaError, FilterCriteria};
pub use stats::FilterStatistics;

use super::domain::ApplicationRecord;
use serde::Serialize;

/// Stateless filter that narrows an application list and summarizes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartFilterEngine;

impl SmartFilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Filter `applications` with pre-validated `criteria`.
    pub fn apply(
        &self,
        applications: &[ApplicationRecord],
        criteria: &FilterCriteria,
    ) -> FilterOutcome {
        let mut survivors: Vec<&ApplicationRecord> = applications
            .iter()
            .filter(|record| rules::passes_hard_filters(record, criteria))
            .collect();

        if let Some(percent) = criteria.top_percent_only {
            if !survivors.is_empty() {
                survivors = rules::select_top_percent(survivors, percent);
            }
        }

        let filtered: Vec<ApplicationRecord> = survivors.into_iter().cloned().collect();
        let statistics = stats::collect_statistics(applications, filtered.len());

        FilterOutcome {
            filtered,
            statistics,
        }
    }
}

/// Result of a filter pass: the visible records plus aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub filtered: Vec<ApplicationRecord>,
    pub statistics: FilterStatistics,
}
