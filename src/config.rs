//! JSON configuration and the validated [`Settings`] built from it.
//!
//! Every check that can fail happens in [`Settings::resolve`], before any
//! request is made.

use crate::analysis::aggregate::{ActiveDays, AggregateSettings};
use crate::analysis::compare::{CompareSettings, DEFAULT_ZERO_BASELINE_PCT};
use crate::analysis::sample::{Pacing, SamplePolicy};
use crate::error::{Result, UpliftError};
use crate::model::Window;
use crate::source::CommitSource;
use crate::util::{parse_date, parse_date_or_relative, parse_pause};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub token: Option<String>,
    pub organization: Option<String>,
    pub repositories: Vec<String>,
    pub api_url: String,
    pub per_page: u32,
    pub max_pages: u32,
    pub max_commits: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            organization: None,
            repositories: Vec::new(),
            api_url: DEFAULT_API_URL.to_string(),
            per_page: 100,
            max_pages: 10,
            max_commits: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    #[serde(alias = "copilot_adoption_date")]
    pub adoption_date: Option<String>,
    pub before_period_weeks: f64,
    pub after_period_weeks: f64,
    pub min_commits_for_analysis: u64,
    pub detail_sample_limit: usize,
    pub sample_policy: SamplePolicy,
    pub active_days: ActiveDays,
    pub zero_baseline_pct: f64,
    pub pause_every: usize,
    pub pause: String,
    pub authors: Vec<String>,
    /// Team slug whose members are added to `authors`.
    pub team: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            adoption_date: None,
            before_period_weeks: 8.0,
            after_period_weeks: 8.0,
            min_commits_for_analysis: 3,
            detail_sample_limit: 50,
            sample_policy: SamplePolicy::Prefix,
            active_days: ActiveDays::PerRepository,
            zero_baseline_pct: DEFAULT_ZERO_BASELINE_PCT,
            pause_every: 20,
            pause: "1s".to_string(),
            authors: Vec::new(),
            team: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            UpliftError::Config(format!("Cannot read config file {}: {e}", path.display()))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| UpliftError::Config(format!("Malformed config: {e}")))
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repositories: Vec<String>,
    pub adoption_date: Option<String>,
    pub before_weeks: Option<f64>,
    pub after_weeks: Option<f64>,
    pub min_commits: Option<u64>,
    pub sample_limit: Option<usize>,
    pub sample_policy: Option<SamplePolicy>,
    pub active_days: Option<ActiveDays>,
    pub team: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub per_page: u32,
    pub max_pages: u32,
    pub max_commits: usize,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub organization: String,
    pub repositories: Vec<String>,
    pub adoption_date: DateTime<Utc>,
    pub before: Window,
    pub after: Window,
    pub compare: CompareSettings,
    pub aggregate: AggregateSettings,
    pub github: GithubSettings,
    pub team: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(config: Config, overrides: Overrides) -> Result<Self> {
        let Config { github, analysis, cache_dir } = config;

        let organization = github
            .organization
            .filter(|o| !o.trim().is_empty())
            .ok_or_else(|| UpliftError::Config("github.organization is required".to_string()))?;

        let repositories = if overrides.repositories.is_empty() {
            github.repositories
        } else {
            overrides.repositories
        };
        if repositories.is_empty() {
            return Err(UpliftError::Config(
                "github.repositories must name at least one repository".to_string(),
            ));
        }

        // Relative phrases are for ad-hoc runs from the command line; a config file
        // must pin the date so reports stay reproducible.
        let adoption_date = match (overrides.adoption_date, analysis.adoption_date) {
            (Some(raw), _) => parse_date_or_relative(&raw, Utc::now())?,
            (None, Some(raw)) => parse_date(&raw)?,
            (None, None) => {
                return Err(UpliftError::Config("analysis.adoption_date is required".to_string()))
            }
        };

        let before_weeks = overrides.before_weeks.unwrap_or(analysis.before_period_weeks);
        let after_weeks = overrides.after_weeks.unwrap_or(analysis.after_period_weeks);
        for (key, weeks) in [("before_period_weeks", before_weeks), ("after_period_weeks", after_weeks)] {
            if !(weeks.is_finite() && weeks > 0.0) {
                return Err(UpliftError::Config(format!("analysis.{key} must be positive, got {weeks}")));
            }
        }

        if !analysis.zero_baseline_pct.is_finite() {
            return Err(UpliftError::Config("analysis.zero_baseline_pct must be finite".to_string()));
        }
        if github.per_page == 0 || github.per_page > 100 {
            return Err(UpliftError::Config(format!(
                "github.per_page must be between 1 and 100, got {}",
                github.per_page
            )));
        }

        let before = Window::before(adoption_date, before_weeks).ok_or_else(|| {
            UpliftError::Config(format!("analysis.before_period_weeks is out of range: {before_weeks}"))
        })?;
        let after = Window::after(adoption_date, after_weeks).ok_or_else(|| {
            UpliftError::Config(format!("analysis.after_period_weeks is out of range: {after_weeks}"))
        })?;

        let pacing = Pacing { every: analysis.pause_every, pause: parse_pause(&analysis.pause)? };

        let token = github
            .token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty()));

        Ok(Self {
            organization,
            repositories,
            adoption_date,
            before,
            after,
            compare: CompareSettings {
                before_weeks,
                after_weeks,
                min_commits: overrides.min_commits.unwrap_or(analysis.min_commits_for_analysis),
                zero_baseline_pct: analysis.zero_baseline_pct,
            },
            aggregate: AggregateSettings {
                detail_limit: overrides.sample_limit.unwrap_or(analysis.detail_sample_limit),
                policy: overrides.sample_policy.unwrap_or(analysis.sample_policy),
                pacing,
                active_days: overrides.active_days.unwrap_or(analysis.active_days),
                authors: dedupe_logins(analysis.authors),
                show_progress: false,
            },
            github: GithubSettings {
                api_url: github.api_url.trim_end_matches('/').to_string(),
                token,
                per_page: github.per_page,
                max_pages: github.max_pages,
                max_commits: github.max_commits,
            },
            team: overrides.team.or(analysis.team).filter(|t| !t.trim().is_empty()),
            cache_dir: overrides.cache_dir.or(cache_dir),
        })
    }

    /// Looks up the configured team through `source` and adds its members to
    /// the author filter. A no-op without a team.
    pub fn resolve_team<S: CommitSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let Some(team) = &self.team else {
            return Ok(());
        };
        let members = source.team_members(team)?;
        if members.is_empty() {
            return Err(UpliftError::Config(format!("team '{team}' has no members")));
        }
        info!(team = team.as_str(), members = members.len(), "resolved team members");

        let mut authors = std::mem::take(&mut self.aggregate.authors);
        authors.extend(members);
        self.aggregate.authors = dedupe_logins(authors);
        Ok(())
    }
}

/// Drops blank and repeated logins. GitHub logins are case-insensitive, so the
/// first spelling of each login wins.
fn dedupe_logins(logins: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    logins
        .into_iter()
        .map(|login| login.trim().to_string())
        .filter(|login| !login.is_empty() && seen.insert(login.to_lowercase()))
        .collect()
}
