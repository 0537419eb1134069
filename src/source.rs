use crate::error::{Result, UpliftError};
use crate::model::{CommitDetail, CommitSummary, Window};

/// One repository's commit listing for a window, in the order the source returned it.
#[derive(Debug, Clone, Default)]
pub struct CommitListing {
    pub commits: Vec<CommitSummary>,
    /// `false` when pagination stopped on an error or a hard cap.
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailFetch {
    Found(CommitDetail),
    Unavailable,
    /// Quota exhausted; callers stop requesting details for the current sample.
    RateLimited,
}

/// Where commit history comes from. Implementations never fail outright:
/// transport problems surface as a partial listing or an absent detail.
pub trait CommitSource {
    fn list_commits(&self, repo: &str, author: Option<&str>, window: &Window) -> CommitListing;

    fn commit_detail(&self, repo: &str, sha: &str) -> DetailFetch;

    /// Short label recorded in report metadata.
    fn describe(&self) -> String;

    /// Logins of the members of an organization team. Unlike listings, a
    /// failed lookup is an error.
    fn team_members(&self, team: &str) -> Result<Vec<String>> {
        Err(UpliftError::Config(format!(
            "{} cannot resolve team '{team}'",
            self.describe()
        )))
    }
}
