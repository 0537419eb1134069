//! Offline record/replay of commit history.
//!
//! [`Recorder`] wraps a live source and keeps every listing and detail it
//! hands out; [`SnapshotSource`] serves a saved [`Snapshot`] back through the
//! same [`CommitSource`] interface.

use crate::error::{Result, UpliftError};
use crate::model::{CommitDetail, CommitSummary, Window, SCHEMA_VERSION};
use crate::source::{CommitListing, CommitSource, DetailFetch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub organization: String,
    pub repositories: Vec<RepoRecord>,
    /// Team slug to member logins, for runs that filter by team.
    #[serde(default)]
    pub teams: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    /// Listing order as returned by the source.
    pub commits: Vec<CommitSummary>,
    #[serde(default)]
    pub details: Vec<CommitDetail>,
    /// Listings that stopped early on an error or a cap.
    #[serde(default)]
    pub incomplete: Vec<ListingKey>,
    /// Commits whose detail request hit the rate limit.
    #[serde(default)]
    pub rate_limited: Vec<String>,
}

/// Identifies one `list_commits` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingKey {
    pub window: Window,
    #[serde(default)]
    pub author: Option<String>,
}

impl ListingKey {
    fn matches(&self, author: Option<&str>, window: &Window) -> bool {
        let same_author = match (self.author.as_deref(), author) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        same_author && self.window == *window
    }
}

impl Snapshot {
    pub fn new(organization: &str) -> Self {
        Self {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            organization: organization.to_string(),
            repositories: Vec::new(),
            teams: BTreeMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        if snapshot.version != SCHEMA_VERSION {
            return Err(UpliftError::Snapshot(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, snapshot.version
            )));
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn record_mut(&mut self, repo: &str) -> &mut RepoRecord {
        let idx = match self.repositories.iter().position(|r| r.name == repo) {
            Some(idx) => idx,
            None => {
                self.repositories.push(RepoRecord { name: repo.to_string(), ..RepoRecord::default() });
                self.repositories.len() - 1
            }
        };
        &mut self.repositories[idx]
    }
}

struct IndexedRepo {
    commits: Vec<CommitSummary>,
    details: HashMap<String, CommitDetail>,
    incomplete: Vec<ListingKey>,
    rate_limited: HashSet<String>,
}

pub struct SnapshotSource {
    label: String,
    repos: HashMap<String, IndexedRepo>,
    teams: BTreeMap<String, Vec<String>>,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        let label = format!("snapshot:{}", snapshot.generated_at.to_rfc3339());
        let repos = snapshot
            .repositories
            .into_iter()
            .map(|record| {
                let details = record.details.into_iter().map(|d| (d.sha.clone(), d)).collect();
                let indexed = IndexedRepo {
                    commits: record.commits,
                    details,
                    incomplete: record.incomplete,
                    rate_limited: record.rate_limited.into_iter().collect(),
                };
                (record.name, indexed)
            })
            .collect();
        Self { label, repos, teams: snapshot.teams }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(Snapshot::load(path)?))
    }
}

impl CommitSource for SnapshotSource {
    fn list_commits(&self, repo: &str, author: Option<&str>, window: &Window) -> CommitListing {
        let Some(r) = self.repos.get(repo) else {
            return CommitListing { commits: Vec::new(), complete: true };
        };
        let commits = r
            .commits
            .iter()
            .filter(|c| window.contains(&c.timestamp))
            .filter(|c| match author {
                Some(wanted) => c.author.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .cloned()
            .collect();
        let complete = !r.incomplete.iter().any(|key| key.matches(author, window));
        CommitListing { commits, complete }
    }

    fn commit_detail(&self, repo: &str, sha: &str) -> DetailFetch {
        let Some(r) = self.repos.get(repo) else {
            return DetailFetch::Unavailable;
        };
        match r.details.get(sha) {
            Some(detail) => DetailFetch::Found(detail.clone()),
            None if r.rate_limited.contains(sha) => DetailFetch::RateLimited,
            None => DetailFetch::Unavailable,
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }

    fn team_members(&self, team: &str) -> Result<Vec<String>> {
        self.teams
            .get(team)
            .cloned()
            .ok_or_else(|| UpliftError::Snapshot(format!("team '{team}' was not recorded")))
    }
}

pub struct Recorder<'a, S: CommitSource + ?Sized> {
    inner: &'a S,
    snapshot: RefCell<Snapshot>,
    seen: RefCell<HashSet<(String, String)>>,
}

impl<'a, S: CommitSource + ?Sized> Recorder<'a, S> {
    pub fn new(inner: &'a S, organization: &str) -> Self {
        Self {
            inner,
            snapshot: RefCell::new(Snapshot::new(organization)),
            seen: RefCell::new(HashSet::new()),
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot.into_inner()
    }
}

impl<S: CommitSource + ?Sized> CommitSource for Recorder<'_, S> {
    fn list_commits(&self, repo: &str, author: Option<&str>, window: &Window) -> CommitListing {
        let listing = self.inner.list_commits(repo, author, window);
        let mut snapshot = self.snapshot.borrow_mut();
        let mut seen = self.seen.borrow_mut();
        let record = snapshot.record_mut(repo);
        for commit in &listing.commits {
            if seen.insert((repo.to_string(), commit.sha.clone())) {
                record.commits.push(commit.clone());
            }
        }
        if !listing.complete {
            record.incomplete.push(ListingKey { window: *window, author: author.map(str::to_string) });
        }
        listing
    }

    fn commit_detail(&self, repo: &str, sha: &str) -> DetailFetch {
        let fetched = self.inner.commit_detail(repo, sha);
        let mut snapshot = self.snapshot.borrow_mut();
        let record = snapshot.record_mut(repo);
        match &fetched {
            DetailFetch::Found(detail) => {
                if !record.details.iter().any(|d| d.sha == detail.sha) {
                    record.details.push(detail.clone());
                }
            }
            DetailFetch::RateLimited => {
                if !record.rate_limited.iter().any(|s| s == sha) {
                    record.rate_limited.push(sha.to_string());
                }
            }
            DetailFetch::Unavailable => {}
        }
        fetched
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn team_members(&self, team: &str) -> Result<Vec<String>> {
        let members = self.inner.team_members(team)?;
        self.snapshot.borrow_mut().teams.insert(team.to_string(), members.clone());
        Ok(members)
    }
}
