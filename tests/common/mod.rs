#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use uplift::error::{Result, UpliftError};
use uplift::model::{CommitDetail, CommitSummary, Window};
use uplift::source::{CommitListing, CommitSource, DetailFetch};

pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

pub fn commit(sha: &str, author: Option<&str>, at: DateTime<Utc>, message: &str) -> CommitSummary {
    CommitSummary {
        sha: sha.to_string(),
        author: author.map(str::to_string),
        timestamp: at,
        message: message.to_string(),
    }
}

pub fn detail(sha: &str, additions: u64, deletions: u64, files: u64) -> CommitDetail {
    CommitDetail {
        sha: sha.to_string(),
        additions,
        deletions,
        total_changes: additions + deletions,
        files_changed: files,
    }
}

/// March 2024, the whole month.
pub fn march() -> Window {
    Window::new(ts(1, 0), Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap())
}

#[derive(Default)]
pub struct FakeSource {
    pub listings: HashMap<String, Vec<CommitSummary>>,
    pub incomplete: Vec<String>,
    pub details: HashMap<(String, String), DetailFetch>,
    pub detail_calls: RefCell<Vec<String>>,
    pub list_calls: RefCell<Vec<(String, Option<String>)>>,
    pub teams: HashMap<String, Vec<String>>,
}

impl FakeSource {
    pub fn with_repo(mut self, repo: &str, commits: Vec<CommitSummary>) -> Self {
        self.listings.insert(repo.to_string(), commits);
        self
    }

    pub fn with_detail(mut self, repo: &str, detail: CommitDetail) -> Self {
        self.details
            .insert((repo.to_string(), detail.sha.clone()), DetailFetch::Found(detail));
        self
    }

    pub fn with_team(mut self, team: &str, members: &[&str]) -> Self {
        self.teams.insert(team.to_string(), members.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn with_fetch(mut self, repo: &str, sha: &str, fetch: DetailFetch) -> Self {
        self.details.insert((repo.to_string(), sha.to_string()), fetch);
        self
    }
}

impl CommitSource for FakeSource {
    fn list_commits(&self, repo: &str, author: Option<&str>, _window: &Window) -> CommitListing {
        self.list_calls
            .borrow_mut()
            .push((repo.to_string(), author.map(str::to_string)));
        let commits = self
            .listings
            .get(repo)
            .map(|all| {
                all.iter()
                    .filter(|c| author.is_none() || c.author.as_deref() == author)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        CommitListing { commits, complete: !self.incomplete.iter().any(|r| r == repo) }
    }

    fn commit_detail(&self, repo: &str, sha: &str) -> DetailFetch {
        self.detail_calls.borrow_mut().push(sha.to_string());
        self.details
            .get(&(repo.to_string(), sha.to_string()))
            .cloned()
            .unwrap_or(DetailFetch::Unavailable)
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }

    fn team_members(&self, team: &str) -> Result<Vec<String>> {
        self.teams
            .get(team)
            .cloned()
            .ok_or_else(|| UpliftError::Config(format!("no team {team}")))
    }
}
