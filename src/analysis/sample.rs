use crate::model::{CommitDetail, CommitSummary};
use crate::source::{CommitSource, DetailFetch};
use crate::util::short_sha;
use clap::ValueEnum;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Which commits of a listing get a detail request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SamplePolicy {
    /// The first `limit` commits in listing order (most recent first).
    #[default]
    Prefix,
    /// `limit` commits spread evenly over the listing.
    Stride,
    /// The first `limit` commits of every attributed contributor.
    PerContributor,
}

impl SamplePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SamplePolicy::Prefix => "prefix",
            SamplePolicy::Stride => "stride",
            SamplePolicy::PerContributor => "per-contributor",
        }
    }

    /// Indices into `commits` to fetch, ascending.
    pub fn select(&self, commits: &[CommitSummary], limit: usize) -> Vec<usize> {
        let len = commits.len();
        match self {
            SamplePolicy::Prefix => (0..len.min(limit)).collect(),
            SamplePolicy::Stride => {
                if len <= limit {
                    (0..len).collect()
                } else {
                    (0..limit).map(|i| i * len / limit).collect()
                }
            }
            SamplePolicy::PerContributor => {
                let mut taken: HashMap<&str, usize> = HashMap::new();
                commits
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, commit)| {
                        let author = commit.author.as_deref()?;
                        let count = taken.entry(author).or_insert(0);
                        if *count < limit {
                            *count += 1;
                            Some(idx)
                        } else {
                            None
                        }
                    })
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub every: usize,
    pub pause: Duration,
}

impl Pacing {
    pub fn none() -> Self {
        Self { every: 0, pause: Duration::ZERO }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self { every: 20, pause: Duration::from_secs(1) }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleOutcome {
    pub details: Vec<CommitDetail>,
    /// Detail requests actually issued.
    pub attempted: usize,
    /// The source reported a rate limit before the selection was exhausted.
    pub truncated: bool,
}

pub struct Sampler<'a, S: CommitSource + ?Sized> {
    source: &'a S,
    limit: usize,
    policy: SamplePolicy,
    pacing: Pacing,
}

impl<'a, S: CommitSource + ?Sized> Sampler<'a, S> {
    pub fn new(source: &'a S, limit: usize, policy: SamplePolicy, pacing: Pacing) -> Self {
        Self { source, limit, policy, pacing }
    }

    /// Fetches details for the selected commits of one repository listing.
    /// Failed fetches are skipped; a rate limit ends the sample early.
    pub fn sample(&self, repo: &str, commits: &[CommitSummary], pb: &ProgressBar) -> SampleOutcome {
        let mut outcome = SampleOutcome::default();
        let selection = self.policy.select(commits, self.limit);

        for idx in selection {
            let sha = &commits[idx].sha;
            outcome.attempted += 1;
            match self.source.commit_detail(repo, sha) {
                DetailFetch::Found(detail) => {
                    outcome.details.push(detail);
                    pb.inc(1);
                    self.pace(outcome.details.len());
                }
                DetailFetch::Unavailable => {
                    debug!(repo, sha = short_sha(sha), "no detail for commit");
                }
                DetailFetch::RateLimited => {
                    warn!(
                        repo,
                        collected = outcome.details.len(),
                        "rate limited while sampling commit details, keeping partial sample"
                    );
                    outcome.truncated = true;
                    break;
                }
            }
        }

        outcome
    }

    fn pace(&self, fetched: usize) {
        if self.pacing.every == 0 || self.pacing.pause.is_zero() {
            return;
        }
        if fetched % self.pacing.every == 0 {
            debug!(fetched, pause_ms = self.pacing.pause.as_millis() as u64, "pacing detail requests");
            std::thread::sleep(self.pacing.pause);
        }
    }
}
