//! hubview — read-only GitHub client
//!
//! This crate reads repository metadata and file contents from the GitHub
//! REST API, including:
//!
//! - **File and folder contents**: path-addressed fetches with a transparent
//!   git-blob fallback for files over the API's size ceiling
//! - **Repository metadata**: readme, description, tags, branches, commits
//! - **Pull request counts**: sequential fixed-page accumulation
//! - **Response caching**: optional SQLite cache keyed by request URL, with
//!   global and per-URL expiry and per-repository invalidation
//!
//! ## Example
//!
//! ```rust,no_run
//! use hubview::{ClientConfig, GithubClient};
//!
//! # fn example() -> hubview::Result<()> {
//! // Token and user agent come from the environment, once, at the boundary.
//! let client = GithubClient::new(&ClientConfig::from_env())?;
//! let repo = client.repository("rust-lang/cargo")?;
//!
//! let (contents, fetch_kind) = repo.contents("src/cargo/lib.rs", "master")?;
//! if let Some(file) = contents.as_file() {
//!     println!("fetched via {}: {:?}", fetch_kind.as_str(), file.decoded_content()?);
//! }
//!
//! println!("open PRs: {}", repo.open_pull_request_count()?);
//! # Ok(())
//! # }
//! ```
//!
//! All operations are synchronous, blocking and read-only; nothing in this
//! crate ever writes to the remote repository.

pub mod cache;
pub mod client;
pub mod config;
pub mod contents;
pub mod error;
pub mod repository;
pub mod transport;

// Re-exports for convenience
pub use cache::{CachedEntry, ResponseCache};
pub use client::GithubClient;
pub use config::{CacheConfig, ClientConfig};
pub use contents::{ContentFile, Contents, FetchKind};
pub use error::{ApiError, Result};
pub use repository::{Branch, CommitEntry, CommitInfo, GithubRepo, PullRequest, RepoDetails, Tag};
pub use transport::{HttpResponse, HttpTransport, Transport};
