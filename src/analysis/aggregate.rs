use super::extrapolate::estimate_total;
use super::sample::{Pacing, SamplePolicy, Sampler};
use super::score::score;
use crate::model::{
    CommitDetail, CommitSummary, ContributorWindowStats, RepoWindowSummary, Window, WindowAggregate,
};
use crate::source::{CommitListing, CommitSource};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, warn};

/// How active days from several repositories combine for one contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveDays {
    /// Sum of per-repository active days; one date in two repositories counts twice.
    #[default]
    PerRepository,
    /// Distinct calendar dates across all repositories.
    Distinct,
}

impl ActiveDays {
    pub fn name(&self) -> &'static str {
        match self {
            ActiveDays::PerRepository => "per-repository",
            ActiveDays::Distinct => "distinct",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSettings {
    pub detail_limit: usize,
    pub policy: SamplePolicy,
    pub pacing: Pacing,
    pub active_days: ActiveDays,
    /// Restrict listings to these logins; empty means everyone.
    pub authors: Vec<String>,
    pub show_progress: bool,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            detail_limit: 50,
            policy: SamplePolicy::Prefix,
            pacing: Pacing::default(),
            active_days: ActiveDays::PerRepository,
            authors: Vec::new(),
            show_progress: false,
        }
    }
}

pub struct Aggregator<'a, S: CommitSource + ?Sized> {
    source: &'a S,
    settings: &'a AggregateSettings,
}

impl<'a, S: CommitSource + ?Sized> Aggregator<'a, S> {
    pub fn new(source: &'a S, settings: &'a AggregateSettings) -> Self {
        Self { source, settings }
    }

    pub fn aggregate(&self, repositories: &[String], window: &Window) -> WindowAggregate {
        let pb = self.progress_bar();
        let mut result = WindowAggregate::default();

        for repo in repositories {
            pb.set_message(format!("{repo}: listing commits"));
            let listing = self.list(repo, window);
            pb.set_message(format!("{repo}: sampling {} commits", listing.commits.len()));

            let (per_contributor, summary) = self.aggregate_repository(repo, &listing, &pb);
            info!(
                repo = repo.as_str(),
                listed = summary.listed,
                sampled = summary.sampled,
                contributors = per_contributor.len(),
                "repository window aggregated"
            );

            for (login, stats) in per_contributor {
                result.contributors.entry(login).or_default().absorb(&stats);
            }
            result.repositories.push(summary);
        }

        if self.settings.active_days == ActiveDays::Distinct {
            for stats in result.contributors.values_mut() {
                stats.active_days = stats.active_dates.len() as u64;
            }
        }

        pb.finish_and_clear();
        result
    }

    fn list(&self, repo: &str, window: &Window) -> CommitListing {
        let listings: Vec<CommitListing> = if self.settings.authors.is_empty() {
            vec![self.source.list_commits(repo, None, window)]
        } else {
            self.settings
                .authors
                .iter()
                .map(|author| self.source.list_commits(repo, Some(author), window))
                .collect()
        };

        // Author matching is case-insensitive upstream, so per-author listings can overlap.
        let mut seen = HashSet::new();
        let mut merged = CommitListing { commits: Vec::new(), complete: true };
        for listing in listings {
            if !listing.complete {
                warn!(repo, "commit listing incomplete, continuing with partial data");
            }
            merged.complete &= listing.complete;
            merged.commits.extend(
                listing
                    .commits
                    .into_iter()
                    .filter(|c| window.contains(&c.timestamp) && seen.insert(c.sha.clone())),
            );
        }
        merged
    }

    fn aggregate_repository(
        &self,
        repo: &str,
        listing: &CommitListing,
        pb: &ProgressBar,
    ) -> (BTreeMap<String, ContributorWindowStats>, RepoWindowSummary) {
        let sampler = Sampler::new(
            self.source,
            self.settings.detail_limit,
            self.settings.policy,
            self.settings.pacing,
        );
        let outcome = sampler.sample(repo, &listing.commits, pb);
        let details: HashMap<&str, &CommitDetail> =
            outcome.details.iter().map(|d| (d.sha.as_str(), d)).collect();

        let mut per_contributor: BTreeMap<String, ContributorWindowStats> = BTreeMap::new();
        let mut unattributed = 0u64;

        for commit in &listing.commits {
            let Some(login) = commit.author.as_deref() else {
                unattributed += 1;
                continue;
            };
            let stats = per_contributor.entry(login.to_string()).or_default();
            accumulate(stats, commit, details.get(commit.sha.as_str()).copied());
        }

        for stats in per_contributor.values_mut() {
            stats.active_days = stats.active_dates.len() as u64;
            stats.estimated_total_changes =
                estimate_total(stats.sampled_changes, stats.sampled_commit_count, stats.commits);
            stats.repositories.insert(repo.to_string());
        }

        let summary = RepoWindowSummary {
            repository: repo.to_string(),
            listed: listing.commits.len() as u64,
            unattributed,
            sampled: outcome.details.len() as u64,
            truncated: outcome.truncated,
            complete: listing.complete,
        };
        (per_contributor, summary)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.settings.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} ({pos} details)")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    }
}

fn accumulate(stats: &mut ContributorWindowStats, commit: &CommitSummary, detail: Option<&CommitDetail>) {
    stats.commits += 1;
    stats.active_dates.insert(commit.timestamp.date_naive());

    let signal = score(&commit.message);
    stats.likelihood_score_total += u64::from(signal.score);
    if signal.likely_assisted {
        stats.assisted_commits += 1;
    }

    if let Some(detail) = detail {
        stats.additions += detail.additions;
        stats.deletions += detail.deletions;
        stats.sampled_changes += detail.total_changes;
        stats.files_changed += detail.files_changed;
        stats.sampled_commit_count += 1;
    }
}
