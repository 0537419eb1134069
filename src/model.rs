use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    /// Account login; `None` when the hosting service could not resolve the author.
    pub author: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub sha: String,
    pub additions: u64,
    pub deletions: u64,
    pub total_changes: u64,
    pub files_changed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssistSignal {
    pub explicit_mention: bool,
    pub generation_pattern: bool,
    pub docs_pattern: bool,
    pub bulk_pattern: bool,
    pub score: u32,
    pub likely_assisted: bool,
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `weeks` before `pivot`. `None` when the start is out of range.
    pub fn before(pivot: DateTime<Utc>, weeks: f64) -> Option<Self> {
        let start = pivot.checked_sub_signed(weeks_duration(weeks)?)?;
        Some(Self::new(start, pivot))
    }

    /// The `weeks` after `pivot`. `None` when the end is out of range.
    pub fn after(pivot: DateTime<Utc>, weeks: f64) -> Option<Self> {
        let end = pivot.checked_add_signed(weeks_duration(weeks)?)?;
        Some(Self::new(pivot, end))
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        timestamp >= &self.start && timestamp < &self.end
    }
}

fn weeks_duration(weeks: f64) -> Option<TimeDelta> {
    let seconds = (weeks * 7.0 * 86_400.0).round();
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_seconds(seconds as i64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorWindowStats {
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub sampled_changes: u64,
    pub sampled_commit_count: u64,
    pub estimated_total_changes: f64,
    pub files_changed: u64,
    pub active_days: u64,
    pub assisted_commits: u64,
    pub likelihood_score_total: u64,
    pub repositories: BTreeSet<String>,
    #[serde(skip)]
    pub active_dates: BTreeSet<NaiveDate>,
}

impl ContributorWindowStats {
    /// Sums every counter of `other` into `self`. Active days are summed, the
    /// date sets are unioned so a distinct count stays available.
    pub fn absorb(&mut self, other: &ContributorWindowStats) {
        self.commits += other.commits;
        self.additions += other.additions;
        self.deletions += other.deletions;
        self.sampled_changes += other.sampled_changes;
        self.sampled_commit_count += other.sampled_commit_count;
        self.estimated_total_changes += other.estimated_total_changes;
        self.files_changed += other.files_changed;
        self.active_days += other.active_days;
        self.assisted_commits += other.assisted_commits;
        self.likelihood_score_total += other.likelihood_score_total;
        self.repositories.extend(other.repositories.iter().cloned());
        self.active_dates.extend(other.active_dates.iter().copied());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoWindowSummary {
    pub repository: String,
    pub listed: u64,
    pub unattributed: u64,
    pub sampled: u64,
    pub truncated: bool,
    pub complete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowAggregate {
    pub contributors: BTreeMap<String, ContributorWindowStats>,
    pub repositories: Vec<RepoWindowSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub commits_per_week: f64,
    pub changes_per_week: f64,
    pub commits_per_active_day: f64,
    #[serde(rename = "ai_assistance_rate")]
    pub assistance_rate: f64,
    pub changes_per_commit: f64,
    pub avg_ai_likelihood: f64,
    pub total_commits: u64,
    pub active_days: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Improvements {
    pub commits_per_week_pct: f64,
    pub changes_per_week_pct: f64,
    pub commits_per_active_day_pct: f64,
    pub assistance_rate_pct: f64,
    pub changes_per_commit_pct: f64,
    /// Percentage-point change of the assistance rate.
    pub ai_adoption_change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorComparison {
    /// Serialized as the key of `user_comparisons`.
    #[serde(skip)]
    pub contributor: String,
    pub before: RateSnapshot,
    pub after: RateSnapshot,
    pub improvements: Improvements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub avg_improvement_pct: f64,
    pub median_improvement_pct: f64,
    pub users_improved: usize,
    pub users_declined: usize,
    pub total_users: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total_users_before: usize,
    pub total_users_after: usize,
    pub common_users: usize,
    pub qualified_users: usize,
    pub min_commits_threshold: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub summary: BTreeMap<String, MetricSummary>,
    /// Ordered by contributor login, ascending. Serialized as an object keyed by login.
    #[serde(with = "by_login")]
    pub user_comparisons: Vec<ContributorComparison>,
    pub analysis_stats: AnalysisStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub weeks: f64,
    pub repositories: Vec<RepoWindowSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPeriods {
    pub before: PeriodInfo,
    pub after: PeriodInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub organization: String,
    #[serde(rename = "copilot_adoption_date")]
    pub ai_adoption_date: DateTime<Utc>,
    pub analysis_periods: AnalysisPeriods,
    pub repositories_analyzed: Vec<String>,
    pub sample_policy: String,
    pub detail_sample_limit: usize,
    pub active_days: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub comparison: ComparisonResult,
}

mod by_login {
    use super::ContributorComparison;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(items: &[ContributorComparison], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(items.iter().map(|c| (&c.contributor, c)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ContributorComparison>, D::Error> {
        let by_login = BTreeMap::<String, ContributorComparison>::deserialize(deserializer)?;
        Ok(by_login
            .into_iter()
            .map(|(login, mut comparison)| {
                comparison.contributor = login;
                comparison
            })
            .collect())
    }
}
