use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use uplift::analysis::compare::{summarize, AI_ADOPTION_KEY};
use uplift::analysis::{compare, improvement_pct, CompareSettings, Metric};
use uplift::model::ContributorWindowStats;

fn stats(commits: u64, estimated: f64, active_days: u64) -> ContributorWindowStats {
    ContributorWindowStats {
        commits,
        estimated_total_changes: estimated,
        active_days,
        ..ContributorWindowStats::default()
    }
}

fn window(entries: &[(&str, ContributorWindowStats)]) -> BTreeMap<String, ContributorWindowStats> {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn settings(min_commits: u64) -> CompareSettings {
    CompareSettings { before_weeks: 8.0, after_weeks: 8.0, min_commits, zero_baseline_pct: 100.0 }
}

#[test]
fn alice_end_to_end() {
    let before = window(&[("alice", stats(10, 500.0, 5))]);
    let after = window(&[("alice", stats(20, 1500.0, 8))]);

    let result = compare(&before, &after, &settings(3));

    assert_eq!(result.user_comparisons.len(), 1);
    let alice = &result.user_comparisons[0];
    assert_eq!(alice.contributor, "alice");
    assert_eq!(alice.before.commits_per_week, 1.25);
    assert_eq!(alice.after.commits_per_week, 2.5);
    assert_eq!(alice.improvements.commits_per_week_pct, 100.0);
    assert_eq!(alice.before.changes_per_week, 62.5);
    assert_eq!(alice.after.changes_per_week, 187.5);
    assert_eq!(alice.improvements.changes_per_week_pct, 200.0);
    assert_eq!(alice.before.commits_per_active_day, 2.0);
    assert_eq!(alice.after.commits_per_active_day, 2.5);
    assert_eq!(alice.improvements.commits_per_active_day_pct, 25.0);
    assert_eq!(alice.before.changes_per_commit, 50.0);
    assert_eq!(alice.after.changes_per_commit, 75.0);
    assert_eq!(alice.improvements.changes_per_commit_pct, 50.0);
    assert_eq!(alice.improvements.assistance_rate_pct, 0.0);
}

#[test]
fn qualification_requires_threshold_in_both_windows() {
    let before = window(&[
        ("low_before", stats(2, 10.0, 1)),
        ("even", stats(3, 10.0, 1)),
        ("only_before", stats(9, 10.0, 1)),
    ]);
    let after = window(&[
        ("low_before", stats(5, 10.0, 1)),
        ("even", stats(3, 10.0, 1)),
        ("only_after", stats(9, 10.0, 1)),
    ]);

    let result = compare(&before, &after, &settings(3));

    let names: Vec<&str> = result.user_comparisons.iter().map(|c| c.contributor.as_str()).collect();
    assert_eq!(names, vec!["even"]);
    assert_eq!(result.analysis_stats.total_users_before, 3);
    assert_eq!(result.analysis_stats.total_users_after, 3);
    assert_eq!(result.analysis_stats.common_users, 2);
    assert_eq!(result.analysis_stats.qualified_users, 1);
    assert_eq!(result.analysis_stats.min_commits_threshold, 3);
}

#[test]
fn zero_baselines_never_divide() {
    assert_eq!(improvement_pct(0.0, 0.0, 100.0), 0.0);
    assert_eq!(improvement_pct(0.0, 5.0, 100.0), 100.0);
    assert_eq!(improvement_pct(0.0, 5.0, 250.0), 250.0);
    assert_eq!(improvement_pct(4.0, 2.0, 100.0), -50.0);
}

#[test]
fn zero_active_days_and_changes_stay_finite() {
    let before = window(&[("dave", stats(4, 0.0, 0))]);
    let after = window(&[("dave", stats(4, 120.0, 2))]);

    let result = compare(&before, &after, &settings(1));
    let dave = &result.user_comparisons[0];

    assert_eq!(dave.before.commits_per_active_day, 0.0);
    assert_eq!(dave.improvements.commits_per_active_day_pct, 100.0);
    assert_eq!(dave.improvements.changes_per_week_pct, 100.0);
    assert_eq!(dave.improvements.commits_per_week_pct, 0.0);
    for metric in Metric::ALL {
        assert!(metric.improvement(&dave.improvements).is_finite());
    }
}

#[test]
fn assistance_rate_is_a_percentage_of_commits() {
    let before = window(&[(
        "erin",
        ContributorWindowStats { assisted_commits: 1, ..stats(4, 40.0, 2) },
    )]);
    let after = window(&[(
        "erin",
        ContributorWindowStats { assisted_commits: 3, likelihood_score_total: 9, ..stats(4, 40.0, 2) },
    )]);

    let result = compare(&before, &after, &settings(1));
    let erin = &result.user_comparisons[0];

    assert_eq!(erin.before.assistance_rate, 25.0);
    assert_eq!(erin.after.assistance_rate, 75.0);
    assert_eq!(erin.improvements.assistance_rate_pct, 200.0);
    assert_eq!(erin.improvements.ai_adoption_change_pct, 50.0);
    assert_eq!(erin.after.avg_ai_likelihood, 2.25);
    assert_eq!(result.summary[AI_ADOPTION_KEY].avg_improvement_pct, 50.0);
}

#[test]
fn compare_is_a_pure_function() {
    let before = window(&[("a", stats(5, 50.0, 3)), ("b", stats(7, 700.0, 4))]);
    let after = window(&[("a", stats(6, 20.0, 3)), ("b", stats(3, 900.0, 1))]);

    let first = compare(&before, &after, &settings(3));
    let second = compare(&before, &after, &settings(3));
    assert_eq!(first, second);
}

#[test]
fn summary_uses_mean_upper_median_and_direction_counts() {
    let s = summarize(&[10.0, -20.0, 40.0, 0.0]).unwrap();
    assert_eq!(s.avg_improvement_pct, 7.5);
    assert_eq!(s.median_improvement_pct, 10.0);
    assert_eq!(s.users_improved, 2);
    assert_eq!(s.users_declined, 1);
    assert_eq!(s.total_users, 4);

    assert!(summarize(&[]).is_none());
}

#[test]
fn empty_population_has_no_summary() {
    let before = window(&[("a", stats(1, 5.0, 1))]);
    let after = window(&[("a", stats(1, 5.0, 1))]);
    let result = compare(&before, &after, &settings(3));
    assert!(result.summary.is_empty());
    assert!(result.user_comparisons.is_empty());
}

#[test]
fn ranking_is_descending_and_ties_keep_login_order() {
    let before = window(&[
        ("carol", stats(4, 0.0, 1)),
        ("alice", stats(4, 0.0, 1)),
        ("bob", stats(4, 0.0, 1)),
        ("dan", stats(4, 0.0, 1)),
    ]);
    let after = window(&[
        ("carol", stats(8, 0.0, 1)),
        ("alice", stats(8, 0.0, 1)),
        ("bob", stats(2, 0.0, 1)),
        ("dan", stats(12, 0.0, 1)),
    ]);

    let result = compare(&before, &after, &settings(1));
    let ranked: Vec<&str> = result
        .ranked(Metric::CommitsPerWeek)
        .iter()
        .map(|c| c.contributor.as_str())
        .collect();

    assert_eq!(ranked, vec!["dan", "alice", "carol", "bob"]);
}

#[test]
fn report_json_keys_comparisons_by_login() {
    let before = window(&[("bob", stats(4, 40.0, 2)), ("alice", stats(4, 80.0, 2))]);
    let after = window(&[("bob", stats(8, 40.0, 2)), ("alice", stats(4, 80.0, 2))]);
    let result = compare(&before, &after, &settings(1));

    let json = serde_json::to_value(&result).unwrap();
    let by_login = json["user_comparisons"].as_object().unwrap();
    assert_eq!(by_login.keys().collect::<Vec<_>>(), vec!["alice", "bob"]);
    assert_eq!(json["user_comparisons"]["bob"]["improvements"]["commits_per_week_pct"], 100.0);
    assert!(json["user_comparisons"]["bob"]["before"].get("ai_assistance_rate").is_some());
    assert!(json["user_comparisons"]["bob"].get("contributor").is_none());

    let back: uplift::model::ComparisonResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, result);
}
