//! GitHub-backed fetching: a thin contents-API client and the fetcher that
//! mirrors a repository subtree through it.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::contract::{
    ContentListing, Contents, EntryKind, FetchSummary, FileContent, RemoteFetcher, TreeEntry,
};
use crate::copy::write_file;
use crate::error::{Error, Result};
use crate::repo_ref::RepoRef;
use crate::rewrite::{root_segment, ImportRewriter};

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("proto-gather/", env!("CARGO_PKG_VERSION"));

/// Contents-API client. One instance serves a whole run; the token decides
/// whether its requests are authenticated.
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        GitHubClient {
            http: reqwest::Client::new(),
            base_url: API_BASE.to_string(),
            token,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }
}

/// The contents endpoint answers with an array for directories and a single
/// object for files.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawContents {
    Listing(Vec<TreeEntry>),
    Single(FileContent),
}

/// Error body of the API; `message` carries the human-readable reason,
/// rate-limit notices included.
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl ContentListing for GitHubClient {
    async fn get_contents(&self, repo: &RepoRef, path: &str) -> Result<Contents> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, repo.owner, repo.repo, path
        );
        debug!(
            url = %url,
            reference = repo.branch.as_deref().unwrap_or("default"),
            "Fetching repository contents"
        );

        let mut request = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        if let Some(branch) = &repo.branch {
            request = request.query(&[("ref", branch)]);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            Error::Transport(format!(
                "failed to get contents for path '{}' in '{}/{}': {}",
                path, repo.owner, repo.repo, e
            ))
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                owner: repo.owner.clone(),
                repo: repo.repo.clone(),
                path: path.to_string(),
            }),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                let reason = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                let mut message = format!(
                    "GitHub API returned {} for path '{}' in '{}/{}'",
                    status, path, repo.owner, repo.repo
                );
                if !reason.trim().is_empty() {
                    message.push_str(": ");
                    message.push_str(reason.trim());
                }
                Err(Error::Transport(message))
            }
            _ => {
                let raw: RawContents = response.json().await.map_err(|e| {
                    Error::Transport(format!(
                        "failed to decode contents response for path '{}' in '{}/{}': {}",
                        path, repo.owner, repo.repo, e
                    ))
                })?;
                Ok(match raw {
                    RawContents::Listing(entries) => Contents::Directory(entries),
                    RawContents::Single(file) => Contents::File(file),
                })
            }
        }
    }
}

/// Mirrors the proto subtree of one repository through a [`ContentListing`].
///
/// Listings carry no file bodies, so every matching file costs one extra
/// request. Files land at `dest/<repository-root-relative path>` with their
/// imports rewritten to `<repo>/<root>/...`; a specifier path that resolves
/// to a single proto file is stored untouched.
pub struct ApiFetcher<C> {
    listing: C,
}

impl<C> ApiFetcher<C> {
    pub fn new(listing: C) -> Self {
        ApiFetcher { listing }
    }
}

#[async_trait]
impl<C: ContentListing> RemoteFetcher for ApiFetcher<C> {
    async fn fetch(&self, repo: &RepoRef, dest: &Path) -> Result<FetchSummary> {
        let mut files = 0usize;
        let mut pending = VecDeque::from([repo.path_in_repo.clone()]);

        while let Some(path) = pending.pop_front() {
            match self.listing.get_contents(repo, &path).await? {
                Contents::File(file) => {
                    // The requested path is itself a file: store it as-is and
                    // stop descending. Its imports already resolve wherever
                    // the caller points them.
                    if file.kind != EntryKind::File || !file.name.ends_with(".proto") {
                        return Err(Error::UnsupportedEntry(file.path));
                    }
                    let content = decode_file(&file)?;
                    write_file(&dest.join(&file.path), &content)?;
                    debug!(path = %file.path, "Stored proto file");
                    files += 1;
                }
                Contents::Directory(entries) => {
                    for entry in entries {
                        match entry.kind {
                            EntryKind::File if entry.name.ends_with(".proto") => {
                                self.fetch_proto(repo, &entry, dest).await?;
                                files += 1;
                            }
                            EntryKind::Dir => {
                                let mirrored = dest.join(&entry.path);
                                fs::create_dir_all(&mirrored)
                                    .map_err(|e| Error::fs(&mirrored, e))?;
                                pending.push_back(entry.path);
                            }
                            _ => {
                                debug!(path = %entry.path, "Skipping non-proto entry");
                            }
                        }
                    }
                }
            }
        }

        info!(repo = %repo, files, "Fetched repository subtree via contents API");
        Ok(FetchSummary { files })
    }
}

impl<C: ContentListing> ApiFetcher<C> {
    async fn fetch_proto(&self, repo: &RepoRef, entry: &TreeEntry, dest: &Path) -> Result<()> {
        let file = match self.listing.get_contents(repo, &entry.path).await? {
            Contents::File(file) => file,
            Contents::Directory(_) => {
                return Err(Error::Transport(format!(
                    "expected '{}' to be a file, but the listing returned a directory",
                    entry.path
                )));
            }
        };

        let mut content = decode_file(&file)?;
        if let Some(root) = root_segment(Path::new(&file.path)) {
            content = ImportRewriter::new(root, &repo.repo)
                .rewrite(&content)
                .into_owned();
        }
        write_file(&dest.join(&file.path), &content)?;
        debug!(path = %file.path, "Stored proto file");
        Ok(())
    }
}

fn decode_file(file: &FileContent) -> Result<String> {
    let encoded = match (file.content.as_deref(), file.encoding.as_deref()) {
        (Some(content), Some("base64")) => content,
        _ => {
            return Err(Error::Transport(format!(
                "failed to decode content for file '{}': no base64 payload in response",
                file.path
            )));
        }
    };
    // The API wraps the payload in newlines.
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| {
            Error::Transport(format!(
                "failed to decode content for file '{}': {}",
                file.path, e
            ))
        })?;
    String::from_utf8(bytes).map_err(|e| {
        Error::Transport(format!("file '{}' is not valid UTF-8: {}", file.path, e))
    })
}
