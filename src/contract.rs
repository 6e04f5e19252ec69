//! Boundary traits of the aggregation engine.
//!
//! Three seams face the outside world: the hosted contents API
//! ([`ContentListing`]), the git executable ([`GitTransport`]) and the
//! per-repository fetch capability itself ([`RemoteFetcher`]), which has one
//! implementation per transport. All three are annotated for `mockall` so
//! tests can substitute deterministic fakes; the mocks are exported under the
//! `test-export-mocks` feature for downstream test suites.

use std::path::Path;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Deserialize;

use crate::error::Result;
use crate::repo_ref::RepoRef;

/// Entry kinds reported by the contents API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and whatever the API grows later.
    #[serde(other)]
    Other,
}

/// One row of a directory listing. Listings carry no file bodies; each
/// matching file is fetched individually afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// A single file with its encoded body.
#[derive(Debug, Clone, Deserialize)]
pub struct FileContent {
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Base64 with embedded newlines, as the API serves it.
    pub content: Option<String>,
    pub encoding: Option<String>,
}

/// What a repository path resolves to.
#[derive(Debug, Clone)]
pub enum Contents {
    File(FileContent),
    Directory(Vec<TreeEntry>),
}

/// Read access to a hosted repository's tree, one path at a time.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentListing: Send + Sync {
    /// Resolve `path` (repository-root-relative) inside the repository to
    /// either a file or a directory listing, honouring the ref's branch.
    async fn get_contents(&self, repo: &RepoRef, path: &str) -> Result<Contents>;
}

/// Clone-level access to a remote repository.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait GitTransport: Send + Sync {
    /// Check out the repository (its branch when one is named) into `dest`.
    async fn clone_repo(&self, repo: &RepoRef, dest: &Path) -> Result<()>;
}

/// What a completed fetch reports back to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    /// Proto files written into the destination.
    pub files: usize,
}

/// One capability, two transports: fetch the proto subtree of a repository
/// into `dest`, rewriting imports on the way. Implemented over the contents
/// API for anonymous and token-authenticated access, and over `git clone`
/// for SSH access.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, repo: &RepoRef, dest: &Path) -> Result<FetchSummary>;
}
