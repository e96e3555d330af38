//! Repository handle and content resolution
//!
//! [`GithubRepo`] composes client calls into repository-level operations.
//! The interesting part is content resolution: the contents endpoint rejects
//! files over a size ceiling, so oversized files are re-fetched through the
//! hash-addressed git blob endpoint. That takes a two-hop lookup (list the
//! parent folder, match the base name, fetch the blob by sha) because blobs
//! have no notion of path. The fallback happens at most once per call and is
//! invisible to callers apart from the returned [`FetchKind`].

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::client::GithubClient;
use crate::contents::{ContentFile, Contents, FetchKind};
use crate::error::{ApiError, Result};

/// Fixed page size used by the pull request listing endpoint
const PAGE_SIZE: usize = 30;

/// A handle on one remote repository
///
/// Stateless across calls apart from the memoized display URL.
pub struct GithubRepo<'a> {
    client: &'a GithubClient,
    owner: String,
    name: String,
    url: OnceCell<String>,
}

/// A pull request, reduced to what pagination counting needs
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PullRequest {
    pub number: u64,
}

/// A repository branch
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Branch {
    pub name: String,
}

/// A tag and the commit it points at
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub sha: String,
}

/// Repository name and description
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RepoDetails {
    pub name: String,
    pub description: Option<String>,
}

/// Author and date of a single commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub author: String,
    pub date: DateTime<Utc>,
}

/// One commit in a file's history, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct CommitEntry {
    pub sha: String,
    pub author: String,
    pub date: DateTime<Utc>,
}

// ============ Wire Types ============

#[derive(Debug, Deserialize)]
struct TagWire {
    name: String,
    commit: CommitRefWire,
}

#[derive(Debug, Deserialize)]
struct CommitRefWire {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct HistoryEntryWire {
    sha: String,
    commit: HistoryCommitWire,
}

#[derive(Debug, Deserialize)]
struct HistoryCommitWire {
    author: HistoryActorWire,
    committer: HistoryActorWire,
}

#[derive(Debug, Deserialize)]
struct HistoryActorWire {
    #[serde(default)]
    name: String,
    date: String,
}

#[derive(Debug, Deserialize)]
struct GitCommitWire {
    author: GitActorWire,
    committer: GitActorWire,
}

#[derive(Debug, Deserialize)]
struct GitActorWire {
    #[serde(default)]
    name: String,
    date: DateTime<Utc>,
}

impl<'a> GithubRepo<'a> {
    pub(crate) fn new(client: &'a GithubClient, owner: &str, name: &str) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            name: name.to_string(),
            url: OnceCell::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Browser URL for this repository
    pub fn url(&self) -> &str {
        self.url
            .get_or_init(|| format!("https://github.com/{}/{}", self.owner, self.name))
    }

    /// `["repos", owner, name]` plus any further segments
    fn segments<'s>(&'s self, rest: &[&'s str]) -> Vec<&'s str> {
        let mut segments = vec!["repos", self.owner.as_str(), self.name.as_str()];
        segments.extend_from_slice(rest);
        segments
    }

    // ============ Content Resolution ============

    /// Fetch the contents of a path at a ref.
    ///
    /// Tries the path-addressed contents endpoint first. If the API signals
    /// that the file exceeds its size ceiling, the fetch is retried once via
    /// the git blob path; any other error propagates untouched. Single-file
    /// results are stamped with the date of the last commit touching the
    /// path; directory listings are returned as-is. The returned
    /// [`FetchKind`] records which endpoint produced the bytes.
    pub fn contents(&self, path: &str, ref_: &str) -> Result<(Contents, FetchKind)> {
        let (contents, fetch_kind) = match self.direct_contents(path, ref_) {
            Ok(contents) => (contents, FetchKind::Direct),
            Err(ApiError::TooLarge) => {
                tracing::warn!(
                    "{} is too large for the contents endpoint, fetching via git blob",
                    path
                );
                let file = self.blob_contents(path, ref_)?;
                (Contents::File(file), FetchKind::Blob)
            }
            Err(e) => return Err(e),
        };

        self.attach_last_updated(path, ref_, contents, fetch_kind)
    }

    /// Fetch a file straight through the git blob path, skipping the
    /// contents endpoint entirely
    pub fn contents_from_blob(&self, path: &str, ref_: &str) -> Result<(Contents, FetchKind)> {
        let file = self.blob_contents(path, ref_)?;
        self.attach_last_updated(path, ref_, Contents::File(file), FetchKind::Blob)
    }

    fn attach_last_updated(
        &self,
        path: &str,
        ref_: &str,
        contents: Contents,
        fetch_kind: FetchKind,
    ) -> Result<(Contents, FetchKind)> {
        let contents = match contents {
            Contents::File(mut file) => {
                file.last_updated = Some(self.last_updated(path, ref_)?);
                Contents::File(file)
            }
            dir => dir,
        };
        Ok((contents, fetch_kind))
    }

    /// Path-addressed fetch; the response is a single object for a file and
    /// an array for a folder
    fn direct_contents(&self, path: &str, ref_: &str) -> Result<Contents> {
        let mut rest = vec!["contents"];
        rest.extend(path.split('/').filter(|s| !s.is_empty()));
        let value = self
            .client
            .get_json(&self.segments(&rest), &[("ref", ref_)])?;

        if value.is_array() {
            Ok(Contents::Dir(serde_json::from_value(value)?))
        } else {
            Ok(Contents::File(serde_json::from_value(value)?))
        }
    }

    /// Two-hop blob fetch: resolve the file's sha from its parent listing,
    /// then fetch the blob by hash
    fn blob_contents(&self, path: &str, ref_: &str) -> Result<ContentFile> {
        let matched =
            self.matching_file_from_parent(path, ref_)?
                .ok_or_else(|| ApiError::NotFound {
                    message: format!("{} not found in parent folder listing", path),
                })?;
        self.git_blob(&matched.sha)
    }

    /// List the parent folder of a path (the repository root for top-level
    /// paths)
    pub fn parent_contents(&self, path: &str, ref_: &str) -> Result<Contents> {
        let (contents, _) = self.contents(parent_path(path), ref_)?;
        Ok(contents)
    }

    /// The entry in the parent folder whose name matches the path's base
    /// name, if any
    pub fn matching_file_from_parent(&self, path: &str, ref_: &str) -> Result<Option<ContentFile>> {
        let file_name = base_name(path);
        match self.parent_contents(path, ref_)? {
            Contents::Dir(entries) => Ok(entries
                .into_iter()
                .find(|entry| entry.name.as_deref() == Some(file_name))),
            Contents::File(_) => Ok(None),
        }
    }

    /// Fetch a raw git blob by sha
    pub fn git_blob(&self, sha: &str) -> Result<ContentFile> {
        let value = self
            .client
            .get_json(&self.segments(&["git", "blobs", sha]), &[])?;
        Ok(serde_json::from_value(value)?)
    }

    // ============ Commit History ============

    fn commit_history(
        &self,
        path: &str,
        ref_: &str,
        per_page: usize,
    ) -> Result<Vec<HistoryEntryWire>> {
        let per_page = per_page.to_string();
        let value = self.client.get_json(
            &self.segments(&["commits"]),
            &[("sha", ref_), ("path", path), ("per_page", per_page.as_str())],
        )?;
        Ok(serde_json::from_value(value)?)
    }

    /// The `count` most recent commits touching a path, newest first
    pub fn commits_for_file(
        &self,
        path: &str,
        ref_: &str,
        count: usize,
    ) -> Result<Vec<CommitEntry>> {
        self.commit_history(path, ref_, count)?
            .into_iter()
            .map(|entry| {
                Ok(CommitEntry {
                    sha: entry.sha,
                    author: entry.commit.author.name,
                    date: parse_commit_date(&entry.commit.committer.date)?,
                })
            })
            .collect()
    }

    /// Date of the most recent commit touching a path
    pub fn last_updated(&self, path: &str, ref_: &str) -> Result<NaiveDate> {
        let history = self.commit_history(path, ref_, 1)?;
        let entry = history.first().ok_or_else(|| ApiError::NotFound {
            message: format!("No commits found for {}", path),
        })?;

        Ok(parse_commit_date(&entry.commit.committer.date)?.date_naive())
    }

    /// Details of a specific commit
    pub fn commit(&self, sha: &str) -> Result<CommitInfo> {
        let value = self
            .client
            .get_json(&self.segments(&["git", "commits", sha]), &[])?;
        let commit: GitCommitWire = serde_json::from_value(value)?;
        Ok(CommitInfo {
            author: commit.author.name,
            date: commit.committer.date,
        })
    }

    // ============ Pull Requests & Branches ============

    /// One page of pull requests (fixed page size of 30)
    pub fn pull_requests(&self, state: &str, page: usize) -> Result<Vec<PullRequest>> {
        let page = page.to_string();
        let value = self.client.get_json(
            &self.segments(&["pulls"]),
            &[("state", state), ("page", page.as_str()), ("per_page", "30")],
        )?;
        Ok(serde_json::from_value(value)?)
    }

    /// Total pull request count for a state.
    ///
    /// Pages are fetched strictly in order, stopping at the first short
    /// page; a full final page costs one extra empty fetch.
    pub fn pull_request_count(&self, state: &str) -> Result<usize> {
        let mut total = 0;
        let mut page = 1;
        loop {
            let count = self.pull_requests(state, page)?.len();
            total += count;
            if count < PAGE_SIZE {
                return Ok(total);
            }
            page += 1;
        }
    }

    /// Count of open pull requests
    pub fn open_pull_request_count(&self) -> Result<usize> {
        self.pull_request_count("open")
    }

    /// All branches of the repository
    pub fn branches(&self) -> Result<Vec<Branch>> {
        let value = self.client.get_json(&self.segments(&["branches"]), &[])?;
        Ok(serde_json::from_value(value)?)
    }

    /// Count of branches
    pub fn branch_count(&self) -> Result<usize> {
        Ok(self.branches()?.len())
    }

    // ============ Metadata Accessors ============

    /// Decoded repository readme at a ref.
    ///
    /// Always served by the dedicated readme endpoint; readmes are assumed
    /// to fit under the contents size ceiling, so there is no blob fallback
    /// here.
    pub fn readme(&self, ref_: &str) -> Result<Option<String>> {
        let value = self
            .client
            .get_json(&self.segments(&["readme"]), &[("ref", ref_)])?;
        let file: ContentFile = serde_json::from_value(value)?;
        file.decoded_content()
    }

    /// Repository name and description
    pub fn details(&self) -> Result<RepoDetails> {
        let value = self.client.get_json(&self.segments(&[]), &[])?;
        Ok(serde_json::from_value(value)?)
    }

    /// All tags, each with the sha of the commit it points at
    pub fn tags(&self) -> Result<Vec<Tag>> {
        let value = self.client.get_json(&self.segments(&["tags"]), &[])?;
        let tags: Vec<TagWire> = serde_json::from_value(value)?;
        Ok(tags
            .into_iter()
            .map(|t| Tag {
                name: t.name,
                sha: t.commit.sha,
            })
            .collect())
    }

    // ============ Cache Invalidation ============

    /// Drop every cached response URL belonging to this repository.
    ///
    /// Matching is a case-insensitive substring check on `owner/name`
    /// against the full cached URL, so an owner/name pair that is a
    /// substring of another repository's identifier will over-match.
    pub fn clear_cache(&self) -> Result<()> {
        let repo_path = format!("{}/{}", self.owner, self.name).to_lowercase();
        for url in self.client.transport().cached_urls()? {
            if url.to_lowercase().contains(&repo_path) {
                self.client.transport().invalidate(&url)?;
            }
        }
        Ok(())
    }
}

/// Everything before the last `/`, or the empty string for top-level paths
fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Everything after the last `/`
fn base_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

fn parse_commit_date(date: &str) -> Result<DateTime<Utc>> {
    date.parse().map_err(|e| ApiError::Decode {
        message: format!("Invalid commit date {:?}: {}", date, e),
    })
}
