use serde::{Deserialize, Serialize};

use super::super::domain::MAX_SCORE;

/// Thresholds and switches applied by the smart filter. Validate at the
/// boundary with [`FilterCriteria::validate`]; the engine trusts its input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub min_overall_score: f32,
    /// Compared against the voice clarity score.
    pub min_english_fluency: f32,
    /// Compared against the voice energy score.
    pub min_motivation: f32,
    pub min_clarity: f32,
    pub require_voice_analysis: bool,
    pub hide_rejected: bool,
    pub top_percent_only: Option<u8>,
}

impl FilterCriteria {
    pub fn validate(&self) -> Result<(), CriteriaError> {
        let thresholds = [
            ("min_overall_score", self.min_overall_score),
            ("min_english_fluency", self.min_english_fluency),
            ("min_motivation", self.min_motivation),
            ("min_clarity", self.min_clarity),
        ];

        for (field, value) in thresholds {
            if !value.is_finite() || !(0.0..=MAX_SCORE).contains(&value) {
                return Err(CriteriaError::ThresholdOutOfRange { field, value });
            }
        }

        if let Some(percent) = self.top_percent_only {
            if !(1..=100).contains(&percent) {
                return Err(CriteriaError::TopPercentOutOfRange(percent));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CriteriaError {
    #[error("{field} must be between 0 and {max}, found {value}", max = MAX_SCORE)]
    ThresholdOutOfRange { field: &'static str, value: f32 },
    #[error("top_percent_only must be between 1 and 100, found {0}")]
    TopPercentOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(FilterCriteria::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_top_percent() {
        let criteria = FilterCriteria {
            top_percent_only: Some(0),
            ..FilterCriteria::default()
        };
        assert_eq!(
            criteria.validate(),
            Err(CriteriaError::TopPercentOutOfRange(0))
        );
    }

    #[test]
    fn rejects_non_finite_thresholds() {
        let criteria = FilterCriteria {
            min_clarity: f32::NAN,
            ..FilterCriteria::default()
        };
        assert!(matches!(
            criteria.validate(),
            Err(CriteriaError::ThresholdOutOfRange {
                field: "min_clarity",
                ..
            })
        ));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"hide_rejected": true}"#).expect("criteria parse");
        assert!(criteria.hide_rejected);
        assert_eq!(criteria.min_overall_score, 0.0);
        assert_eq!(criteria.top_percent_only, None);
    }
}
