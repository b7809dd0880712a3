use super::common::*;
use crate::workflows::hiring::domain::ApplicationStatus;
use crate::workflows::hiring::filter::{FilterCriteria, SmartFilterEngine};

fn top_percent(percent: u8) -> FilterCriteria {
    FilterCriteria {
        top_percent_only: Some(percent),
        ..FilterCriteria::default()
    }
}

#[test]
fn screening_scenario_keeps_only_strong_active_candidate() {
    let strong = analyzed("strong", 9.0, 9.0, 9.0);
    let mut rejected = record("weak", ApplicationStatus::Rejected);
    rejected.voice_analysis = Some(voice(4.0, None, None));

    let criteria = FilterCriteria {
        min_overall_score: 6.0,
        min_english_fluency: 7.0,
        min_motivation: 6.0,
        min_clarity: 6.0,
        require_voice_analysis: true,
        hide_rejected: true,
        top_percent_only: None,
    };

    let outcome = SmartFilterEngine::new().apply(&[strong.clone(), rejected], &criteria);

    assert_eq!(outcome.filtered, vec![strong]);
    assert_eq!(outcome.statistics.total, 2);
    assert_eq!(outcome.statistics.filtered, 1);
}

#[test]
fn hide_rejected_removes_every_rejected_record() {
    let applications = vec![
        record("a", ApplicationStatus::Applied),
        record("b", ApplicationStatus::Rejected),
        record("c", ApplicationStatus::OfferSent),
        record("d", ApplicationStatus::Rejected),
    ];
    let criteria = FilterCriteria {
        hide_rejected: true,
        ..FilterCriteria::default()
    };

    let outcome = SmartFilterEngine::new().apply(&applications, &criteria);

    assert_eq!(ids(&outcome.filtered), vec!["a", "c"]);
    assert!(outcome
        .filtered
        .iter()
        .all(|record| record.status != ApplicationStatus::Rejected));
}

#[test]
fn require_voice_analysis_drops_unanalyzed_records() {
    let applications = vec![
        analyzed("voiced", 5.0, 5.0, 5.0),
        pre_screened("written", 95.0),
        record("bare", ApplicationStatus::Applied),
    ];
    let criteria = FilterCriteria {
        require_voice_analysis: true,
        ..FilterCriteria::default()
    };

    let outcome = SmartFilterEngine::new().apply(&applications, &criteria);

    assert_eq!(ids(&outcome.filtered), vec!["voiced"]);
    assert!(outcome
        .filtered
        .iter()
        .all(|record| record.voice_overall().is_some()));
}

#[test]
fn unanalyzed_records_skip_score_thresholds() {
    let applications = vec![
        analyzed("low", 3.0, 3.0, 3.0),
        record("bare", ApplicationStatus::Applied),
    ];
    let criteria = FilterCriteria {
        min_overall_score: 6.0,
        ..FilterCriteria::default()
    };

    let outcome = SmartFilterEngine::new().apply(&applications, &criteria);

    assert_eq!(ids(&outcome.filtered), vec!["bare"]);
}

#[test]
fn missing_sub_scores_fail_their_thresholds() {
    let mut no_clarity = record("no-clarity", ApplicationStatus::Applied);
    no_clarity.voice_analysis = Some(voice(8.0, None, Some(8.0)));
    let mut no_energy = record("no-energy", ApplicationStatus::Applied);
    no_energy.voice_analysis = Some(voice(8.0, Some(8.0), None));

    let outcome = SmartFilterEngine::new().apply(
        &[no_clarity, no_energy, analyzed("complete", 8.0, 8.0, 8.0)],
        &FilterCriteria::default(),
    );

    assert_eq!(ids(&outcome.filtered), vec!["complete"]);
}

#[test]
fn fluency_and_clarity_thresholds_both_read_clarity() {
    let applications = vec![
        analyzed("clear", 7.0, 8.0, 7.0),
        analyzed("muffled", 7.0, 6.5, 7.0),
    ];
    let fluency = FilterCriteria {
        min_english_fluency: 7.0,
        ..FilterCriteria::default()
    };
    let clarity = FilterCriteria {
        min_clarity: 7.0,
        ..FilterCriteria::default()
    };

    let engine = SmartFilterEngine::new();
    assert_eq!(
        ids(&engine.apply(&applications, &fluency).filtered),
        vec!["clear"]
    );
    assert_eq!(
        ids(&engine.apply(&applications, &clarity).filtered),
        vec!["clear"]
    );
}

#[test]
fn top_ten_percent_of_one_hundred_keeps_ten() {
    let applications: Vec<_> = (0..100)
        .map(|index| pre_screened(&format!("app-{index:03}"), index as f32))
        .collect();

    let outcome = SmartFilterEngine::new().apply(&applications, &top_percent(10));

    assert_eq!(outcome.filtered.len(), 10);
    assert_eq!(outcome.filtered[0].id.0, "app-099");
    assert_eq!(outcome.filtered[9].id.0, "app-090");
}

#[test]
fn top_percent_rounds_up() {
    let applications: Vec<_> = (0..23)
        .map(|index| pre_screened(&format!("app-{index:02}"), 50.0 + index as f32))
        .collect();

    let outcome = SmartFilterEngine::new().apply(&applications, &top_percent(10));

    assert_eq!(outcome.filtered.len(), 3);
}

#[test]
fn top_percent_ignores_unscored_records_and_keeps_tie_order() {
    let applications = vec![
        record("unscored", ApplicationStatus::Applied),
        pre_screened("first-tie", 70.0),
        pre_screened("lower", 40.0),
        pre_screened("second-tie", 70.0),
    ];

    let outcome = SmartFilterEngine::new().apply(&applications, &top_percent(50));

    // 3 scored records at 50% keeps 2.
    assert_eq!(ids(&outcome.filtered), vec!["first-tie", "second-tie"]);
}

#[test]
fn top_percent_compares_raw_scores_across_scales() {
    let written = pre_screened("written", 85.0);
    let voiced = analyzed("voiced", 9.0, 9.0, 9.0);

    let outcome = SmartFilterEngine::new().apply(&[voiced, written], &top_percent(50));

    // 85 on the 0-100 questionnaire outranks 9 on the 0-10 voice scale.
    assert_eq!(ids(&outcome.filtered), vec!["written"]);
}

#[test]
fn effective_score_prefers_the_larger_source() {
    let mut both = analyzed("both", 9.5, 9.0, 9.0);
    both.pre_screening = Some(pre_screening(60.0, None));

    assert_eq!(both.effective_score(), 60.0);
    assert_eq!(
        record("none", ApplicationStatus::Applied).effective_score(),
        0.0
    );
}

#[test]
fn statistics_describe_unfiltered_input() {
    let mut native = analyzed("native", 95.0, 92.0, 40.0);
    native.status = ApplicationStatus::Rejected;
    let mut motivated = pre_screened("motivated", 50.0);
    motivated.pre_screening = Some(pre_screening(50.0, Some(85.0)));
    let applications = vec![
        native,
        motivated,
        pre_screened("high", 81.0),
        analyzed("energetic", 6.0, 6.0, 80.0),
        record("bare", ApplicationStatus::Applied),
    ];
    let criteria = FilterCriteria {
        hide_rejected: true,
        require_voice_analysis: true,
        ..FilterCriteria::default()
    };

    let outcome = SmartFilterEngine::new().apply(&applications, &criteria);
    let stats = outcome.statistics;

    assert_eq!(stats.total, 5);
    assert_eq!(stats.analyzed, 2);
    assert_eq!(stats.pre_screened, 2);
    assert_eq!(stats.high_scoring, 2);
    assert_eq!(stats.native_level, 1);
    assert_eq!(stats.motivated, 2);
    assert_eq!(stats.filtered, 1);
    assert_eq!(ids(&outcome.filtered), vec!["energetic"]);
}

#[test]
fn voice_scores_on_ten_point_scale_never_count_as_high_scoring() {
    let applications = vec![analyzed("perfect", 10.0, 10.0, 10.0)];

    let stats = SmartFilterEngine::new()
        .apply(&applications, &FilterCriteria::default())
        .statistics;

    assert_eq!(stats.high_scoring, 0);
    assert_eq!(stats.native_level, 0);
    assert_eq!(stats.motivated, 0);
}

#[test]
fn apply_is_idempotent_and_bounded() {
    let applications = vec![
        analyzed("a", 7.0, 7.0, 7.0),
        pre_screened("b", 65.0),
        record("c", ApplicationStatus::Rejected),
        analyzed("d", 9.0, 9.0, 4.0),
    ];
    let criteria = FilterCriteria {
        min_motivation: 5.0,
        top_percent_only: Some(50),
        ..FilterCriteria::default()
    };
    let engine = SmartFilterEngine::new();

    let first = engine.apply(&applications, &criteria);
    let second = engine.apply(&applications, &criteria);

    assert_eq!(first, second);
    assert!(first.filtered.len() <= first.statistics.total);
    assert_eq!(first.statistics.filtered, first.filtered.len());
}

#[test]
fn empty_input_yields_empty_outcome() {
    let outcome = SmartFilterEngine::new().apply(&[], &top_percent(25));

    assert!(outcome.filtered.is_empty());
    assert_eq!(outcome.statistics.total, 0);
    assert_eq!(outcome.statistics.filtered, 0);
}
