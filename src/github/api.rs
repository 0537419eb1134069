//! Wire shapes of the GitHub REST responses this crate reads. Only the
//! fields we use are declared; everything else is ignored.

use crate::model::{CommitDetail, CommitSummary};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ApiCommit {
    pub sha: String,
    #[serde(default)]
    pub author: Option<ApiUser>,
    pub commit: ApiCommitBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCommitBody {
    #[serde(default)]
    pub author: Option<ApiSignature>,
    #[serde(default)]
    pub committer: Option<ApiSignature>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiSignature {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCommitDetail {
    pub sha: String,
    #[serde(default)]
    pub stats: Option<ApiStats>,
    #[serde(default)]
    pub files: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub total: u64,
}

impl ApiCommit {
    /// `None` when the commit carries no usable date.
    pub fn into_summary(self) -> Option<CommitSummary> {
        let timestamp = self
            .commit
            .author
            .as_ref()
            .and_then(|s| s.date)
            .or_else(|| self.commit.committer.as_ref().and_then(|s| s.date))?;
        let author = self
            .author
            .and_then(|u| u.login)
            .filter(|login| !login.is_empty());

        Some(CommitSummary { sha: self.sha, author, timestamp, message: self.commit.message })
    }
}

impl ApiCommitDetail {
    /// `None` when the response has no stats block.
    pub fn into_detail(self) -> Option<CommitDetail> {
        let stats = self.stats?;
        Some(CommitDetail {
            sha: self.sha,
            additions: stats.additions,
            deletions: stats.deletions,
            total_changes: stats.total,
            files_changed: self.files.len() as u64,
        })
    }
}
