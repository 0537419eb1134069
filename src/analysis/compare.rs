use crate::model::{
    AnalysisStats, ComparisonResult, ContributorComparison, ContributorWindowStats, Improvements,
    MetricSummary, RateSnapshot,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Improvement reported when a rate grows from exactly zero.
pub const DEFAULT_ZERO_BASELINE_PCT: f64 = 100.0;

/// Summary key for the percentage-point change of the assistance rate.
pub const AI_ADOPTION_KEY: &str = "ai_assistance_adoption";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareSettings {
    pub before_weeks: f64,
    pub after_weeks: f64,
    pub min_commits: u64,
    pub zero_baseline_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CommitsPerWeek,
    ChangesPerWeek,
    CommitsPerActiveDay,
    AssistanceRate,
    ChangesPerCommit,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::CommitsPerWeek,
        Metric::ChangesPerWeek,
        Metric::CommitsPerActiveDay,
        Metric::AssistanceRate,
        Metric::ChangesPerCommit,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::CommitsPerWeek => "commits_per_week",
            Metric::ChangesPerWeek => "changes_per_week",
            Metric::CommitsPerActiveDay => "commits_per_active_day",
            Metric::AssistanceRate => "assistance_rate",
            Metric::ChangesPerCommit => "changes_per_commit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::CommitsPerWeek => "Commits per week",
            Metric::ChangesPerWeek => "Changes per week",
            Metric::CommitsPerActiveDay => "Commits per active day",
            Metric::AssistanceRate => "AI assistance rate",
            Metric::ChangesPerCommit => "Changes per commit",
        }
    }

    pub fn rate(&self, snapshot: &RateSnapshot) -> f64 {
        match self {
            Metric::CommitsPerWeek => snapshot.commits_per_week,
            Metric::ChangesPerWeek => snapshot.changes_per_week,
            Metric::CommitsPerActiveDay => snapshot.commits_per_active_day,
            Metric::AssistanceRate => snapshot.assistance_rate,
            Metric::ChangesPerCommit => snapshot.changes_per_commit,
        }
    }

    pub fn improvement(&self, improvements: &Improvements) -> f64 {
        match self {
            Metric::CommitsPerWeek => improvements.commits_per_week_pct,
            Metric::ChangesPerWeek => improvements.changes_per_week_pct,
            Metric::CommitsPerActiveDay => improvements.commits_per_active_day_pct,
            Metric::AssistanceRate => improvements.assistance_rate_pct,
            Metric::ChangesPerCommit => improvements.changes_per_commit_pct,
        }
    }
}

/// Relative change in percent. A zero baseline yields `zero_baseline_pct`
/// when the rate grew and 0 when it stayed at zero.
pub fn improvement_pct(before: f64, after: f64, zero_baseline_pct: f64) -> f64 {
    if before > 0.0 {
        (after - before) / before * 100.0
    } else if after > 0.0 {
        zero_baseline_pct
    } else {
        0.0
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn rates(stats: &ContributorWindowStats, weeks: f64) -> RateSnapshot {
    let commits = stats.commits as f64;
    RateSnapshot {
        commits_per_week: ratio(commits, weeks),
        changes_per_week: ratio(stats.estimated_total_changes, weeks),
        commits_per_active_day: ratio(commits, stats.active_days as f64),
        assistance_rate: ratio(stats.assisted_commits as f64, commits) * 100.0,
        changes_per_commit: ratio(stats.estimated_total_changes, commits),
        avg_ai_likelihood: ratio(stats.likelihood_score_total as f64, commits),
        total_commits: stats.commits,
        active_days: stats.active_days,
    }
}

fn improvements(before: &RateSnapshot, after: &RateSnapshot, zero_baseline_pct: f64) -> Improvements {
    let pct = |metric: Metric| improvement_pct(metric.rate(before), metric.rate(after), zero_baseline_pct);
    Improvements {
        commits_per_week_pct: pct(Metric::CommitsPerWeek),
        changes_per_week_pct: pct(Metric::ChangesPerWeek),
        commits_per_active_day_pct: pct(Metric::CommitsPerActiveDay),
        assistance_rate_pct: pct(Metric::AssistanceRate),
        changes_per_commit_pct: pct(Metric::ChangesPerCommit),
        ai_adoption_change_pct: after.assistance_rate - before.assistance_rate,
    }
}

/// Mean, upper median, and improved/declined counts. `None` for no values.
pub fn summarize(values: &[f64]) -> Option<MetricSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(MetricSummary {
        avg_improvement_pct: values.iter().sum::<f64>() / values.len() as f64,
        median_improvement_pct: sorted[sorted.len() / 2],
        users_improved: values.iter().filter(|v| **v > 0.0).count(),
        users_declined: values.iter().filter(|v| **v < 0.0).count(),
        total_users: values.len(),
    })
}

pub fn compare(
    before: &BTreeMap<String, ContributorWindowStats>,
    after: &BTreeMap<String, ContributorWindowStats>,
    settings: &CompareSettings,
) -> ComparisonResult {
    let common: Vec<(&String, &ContributorWindowStats, &ContributorWindowStats)> = before
        .iter()
        .filter_map(|(login, b)| after.get(login).map(|a| (login, b, a)))
        .collect();

    let user_comparisons: Vec<ContributorComparison> = common
        .iter()
        .filter(|(_, b, a)| b.commits >= settings.min_commits && a.commits >= settings.min_commits)
        .map(|(login, b, a)| {
            let before = rates(b, settings.before_weeks);
            let after = rates(a, settings.after_weeks);
            let improvements = improvements(&before, &after, settings.zero_baseline_pct);
            ContributorComparison { contributor: (*login).clone(), before, after, improvements }
        })
        .collect();

    let mut summary = BTreeMap::new();
    for metric in Metric::ALL {
        let values: Vec<f64> =
            user_comparisons.iter().map(|c| metric.improvement(&c.improvements)).collect();
        if let Some(s) = summarize(&values) {
            summary.insert(metric.key().to_string(), s);
        }
    }
    let adoption: Vec<f64> =
        user_comparisons.iter().map(|c| c.improvements.ai_adoption_change_pct).collect();
    if let Some(s) = summarize(&adoption) {
        summary.insert(AI_ADOPTION_KEY.to_string(), s);
    }

    let analysis_stats = AnalysisStats {
        total_users_before: before.len(),
        total_users_after: after.len(),
        common_users: common.len(),
        qualified_users: user_comparisons.len(),
        min_commits_threshold: settings.min_commits,
    };

    ComparisonResult { summary, user_comparisons, analysis_stats }
}

impl ComparisonResult {
    /// Contributors by descending improvement on `metric`. The sort is stable, so
    /// ties keep login order.
    pub fn ranked(&self, metric: Metric) -> Vec<&ContributorComparison> {
        let mut ranked: Vec<&ContributorComparison> = self.user_comparisons.iter().collect();
        ranked.sort_by(|a, b| {
            metric
                .improvement(&b.improvements)
                .partial_cmp(&metric.improvement(&a.improvements))
                .unwrap_or(Ordering::Equal)
        });
        ranked
    }
}
