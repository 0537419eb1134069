use super::api::{ApiCommit, ApiCommitDetail, ApiUser};
use crate::cache::Cache;
use crate::config::GithubSettings;
use crate::error::{Result, UpliftError};
use crate::model::Window;
use crate::source::{CommitListing, CommitSource, DetailFetch};
use crate::util::short_sha;
use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::time::Duration;
use tracing::{debug, warn};

const API_VERSION: &str = "2022-11-28";

pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    organization: String,
    token: Option<String>,
    per_page: u32,
    max_pages: u32,
    max_commits: usize,
    cache: Option<RefCell<Cache>>,
}

/// Which endpoints the token can reach.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ApiAccess {
    pub repository_access: bool,
    pub organization_access: bool,
    pub copilot_api_access: bool,
}

impl GithubClient {
    pub fn new(settings: &GithubSettings, organization: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(30))
            .user_agent(concat!("uplift/", env!("CARGO_PKG_VERSION")))
            .build();

        if settings.token.is_none() {
            warn!("no GitHub token configured, requests are unauthenticated and heavily rate limited");
        }

        Self {
            agent,
            api_url: settings.api_url.clone(),
            organization: organization.to_string(),
            token: settings.token.clone(),
            per_page: settings.per_page,
            max_pages: settings.max_pages,
            max_commits: settings.max_commits,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(RefCell::new(cache));
        self
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);
        let mut request = self
            .agent
            .get(&url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        for (key, value) in query {
            request = request.query(key, value);
        }

        let response = request.call()?;
        response
            .into_json::<T>()
            .map_err(|e| UpliftError::Response { url, reason: e.to_string() })
    }

    fn can_reach(&self, path: &str) -> bool {
        match self.get_json::<serde_json::Value>(path, &[]) {
            Ok(_) => true,
            Err(err) => {
                debug!(path, %err, "access check failed");
                false
            }
        }
    }

    pub fn check_access(&self, repository: &str) -> ApiAccess {
        let org = &self.organization;
        ApiAccess {
            repository_access: self.can_reach(&format!("/repos/{org}/{repository}")),
            organization_access: self.can_reach(&format!("/orgs/{org}")),
            copilot_api_access: self.can_reach(&format!("/orgs/{org}/copilot/usage")),
        }
    }

    fn cached_detail(&self, repo: &str, sha: &str) -> Option<DetailFetch> {
        let cache = self.cache.as_ref()?;
        match cache.borrow().get_detail(repo, sha) {
            Ok(Some(detail)) => Some(DetailFetch::Found(detail)),
            Ok(None) => None,
            Err(err) => {
                warn!(%err, "detail cache read failed, treating as miss");
                None
            }
        }
    }
}

/// 403 and 429 both mean the quota is spent.
pub fn is_rate_limited(err: &UpliftError) -> bool {
    matches!(err, UpliftError::Http(e) if matches!(**e, ureq::Error::Status(403 | 429, _)))
}

/// Walks pages `1..=max_pages` through `fetch_page` until an empty page, an
/// error or `max_commits`. Anything but an empty page marks the listing
/// incomplete; commits gathered so far are kept.
fn paginate<F>(repo: &str, max_pages: u32, max_commits: usize, mut fetch_page: F) -> CommitListing
where
    F: FnMut(u32) -> Result<Vec<ApiCommit>>,
{
    let mut listing = CommitListing { commits: Vec::new(), complete: true };

    for page in 1..=max_pages {
        let batch = match fetch_page(page) {
            Ok(batch) => batch,
            Err(err) => {
                warn!(repo, page, %err, "error fetching commits, keeping what was collected");
                listing.complete = false;
                return listing;
            }
        };
        if batch.is_empty() {
            return listing;
        }

        debug!(repo, page, count = batch.len(), "fetched commit page");
        listing.commits.extend(batch.into_iter().filter_map(ApiCommit::into_summary));

        if listing.commits.len() >= max_commits {
            warn!(repo, cap = max_commits, "commit cap reached, listing truncated");
            listing.commits.truncate(max_commits);
            listing.complete = false;
            return listing;
        }
    }

    warn!(repo, max_pages, "page cap reached, listing may be truncated");
    listing.complete = false;
    listing
}

fn detail_outcome(repo: &str, sha: &str, fetched: Result<ApiCommitDetail>) -> DetailFetch {
    match fetched {
        Ok(raw) => match raw.into_detail() {
            Some(detail) => DetailFetch::Found(detail),
            None => DetailFetch::Unavailable,
        },
        Err(err) if is_rate_limited(&err) => {
            debug!(repo, sha = short_sha(sha), "rate limited fetching commit detail");
            DetailFetch::RateLimited
        }
        Err(err) => {
            debug!(repo, sha = short_sha(sha), %err, "commit detail unavailable");
            DetailFetch::Unavailable
        }
    }
}

impl CommitSource for GithubClient {
    fn list_commits(&self, repo: &str, author: Option<&str>, window: &Window) -> CommitListing {
        let path = format!("/repos/{}/{}/commits", self.organization, repo);
        let since = window.start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let until = window.end.to_rfc3339_opts(SecondsFormat::Secs, true);

        paginate(repo, self.max_pages, self.max_commits, |page| {
            let mut query = vec![
                ("since", since.clone()),
                ("until", until.clone()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ];
            if let Some(author) = author {
                query.push(("author", author.to_string()));
            }
            self.get_json::<Vec<ApiCommit>>(&path, &query)
        })
    }

    fn commit_detail(&self, repo: &str, sha: &str) -> DetailFetch {
        if let Some(hit) = self.cached_detail(repo, sha) {
            return hit;
        }

        let path = format!("/repos/{}/{}/commits/{}", self.organization, repo, sha);
        let outcome = detail_outcome(repo, sha, self.get_json::<ApiCommitDetail>(&path, &[]));
        if let (DetailFetch::Found(detail), Some(cache)) = (&outcome, &self.cache) {
            if let Err(err) = cache.borrow_mut().store_detail(repo, detail) {
                warn!(%err, "detail cache write failed");
            }
        }
        outcome
    }

    fn describe(&self) -> String {
        format!("github:{}", self.api_url)
    }

    fn team_members(&self, team: &str) -> Result<Vec<String>> {
        let path = format!("/orgs/{}/teams/{}/members", self.organization, team);
        let mut logins = Vec::new();
        for page in 1..=self.max_pages {
            let query = [("per_page", self.per_page.to_string()), ("page", page.to_string())];
            let batch: Vec<ApiUser> = self.get_json(&path, &query)?;
            if batch.is_empty() {
                break;
            }
            logins.extend(batch.into_iter().filter_map(|u| u.login));
        }
        Ok(logins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(prefix: &str, count: usize) -> Vec<ApiCommit> {
        let raw: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "sha": format!("{prefix}{i}"),
                    "author": { "login": "alice" },
                    "commit": { "author": { "date": "2024-03-05T10:00:00Z" }, "message": "work" }
                })
            })
            .collect();
        serde_json::from_value(serde_json::Value::Array(raw)).unwrap()
    }

    fn status_error(code: u16) -> UpliftError {
        let response = ureq::Response::new(code, "status", "{}").unwrap();
        ureq::Error::Status(code, response).into()
    }

    #[test]
    fn stops_on_the_first_empty_page() {
        let mut calls = Vec::new();
        let listing = paginate("api", 10, 1000, |p| {
            calls.push(p);
            Ok(if p <= 2 { page(&format!("p{p}-"), 3) } else { Vec::new() })
        });
        assert_eq!(calls, vec![1, 2, 3]);
        assert_eq!(listing.commits.len(), 6);
        assert!(listing.complete);
    }

    #[test]
    fn page_cap_marks_the_listing_incomplete() {
        let mut calls = 0;
        let listing = paginate("api", 2, 1000, |p| {
            calls += 1;
            Ok(page(&format!("p{p}-"), 3))
        });
        assert_eq!(calls, 2);
        assert_eq!(listing.commits.len(), 6);
        assert!(!listing.complete);
    }

    #[test]
    fn commit_cap_truncates_and_stops() {
        let mut calls = 0;
        let listing = paginate("api", 10, 4, |p| {
            calls += 1;
            Ok(page(&format!("p{p}-"), 3))
        });
        assert_eq!(calls, 2);
        assert_eq!(listing.commits.len(), 4);
        assert!(!listing.complete);
    }

    #[test]
    fn errors_keep_earlier_pages() {
        let listing = paginate("api", 10, 1000, |p| match p {
            1 => Ok(page("p1-", 2)),
            _ => Err(status_error(500)),
        });
        let shas: Vec<&str> = listing.commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["p1-0", "p1-1"]);
        assert!(!listing.complete);
    }

    #[test]
    fn quota_statuses_are_rate_limits() {
        assert!(is_rate_limited(&status_error(403)));
        assert!(is_rate_limited(&status_error(429)));
        assert!(!is_rate_limited(&status_error(404)));
        assert!(!is_rate_limited(&status_error(500)));
        assert!(!is_rate_limited(&UpliftError::Config("nope".into())));
    }

    #[test]
    fn detail_outcomes_follow_the_response() {
        assert_eq!(detail_outcome("api", "abc", Err(status_error(429))), DetailFetch::RateLimited);
        assert_eq!(detail_outcome("api", "abc", Err(status_error(404))), DetailFetch::Unavailable);

        let no_stats: ApiCommitDetail = serde_json::from_str(r#"{ "sha": "abc" }"#).unwrap();
        assert_eq!(detail_outcome("api", "abc", Ok(no_stats)), DetailFetch::Unavailable);

        let raw: ApiCommitDetail = serde_json::from_str(
            r#"{ "sha": "abc", "stats": { "additions": 5, "deletions": 2, "total": 7 }, "files": [{}, {}] }"#,
        )
        .unwrap();
        match detail_outcome("api", "abc", Ok(raw)) {
            DetailFetch::Found(d) => {
                assert_eq!((d.additions, d.deletions, d.total_changes, d.files_changed), (5, 2, 7, 2))
            }
            other => panic!("expected a detail, got {other:?}"),
        }
    }
}
