//! Clone-backed fetching for repositories reached over SSH.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::contract::{FetchSummary, GitTransport, RemoteFetcher};
use crate::copy::{is_proto_file, write_file};
use crate::error::{Error, Result};
use crate::repo_ref::RepoRef;
use crate::rewrite::{root_segment, ImportRewriter};

/// Runs the system `git` binary. SSH authentication is whatever the
/// environment provides (agent or key files); no credentials pass through
/// here.
pub struct SystemGit;

#[async_trait]
impl GitTransport for SystemGit {
    async fn clone_repo(&self, repo: &RepoRef, dest: &Path) -> Result<()> {
        let remote_url = repo.ssh_url();
        let mut command = tokio::process::Command::new("git");
        command.arg("clone").arg("--depth=1");
        if let Some(branch) = &repo.branch {
            command.args(["--branch", branch]);
        }
        command.arg(&remote_url).arg(dest);
        command.kill_on_drop(true);

        debug!(
            remote_url = %remote_url,
            reference = repo.branch.as_deref().unwrap_or("default"),
            "Cloning repository"
        );
        let output = command.output().await.map_err(|e| {
            Error::Transport(format!(
                "failed to launch git clone for '{}': {}",
                remote_url, e
            ))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Transport(format!(
                "failed to clone repository '{}': {}",
                remote_url,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Clones the whole repository into a scratch directory, then copies the
/// requested subtree into the workspace with imports rewritten.
///
/// The scratch directory is a `TempDir`, so it is removed on every exit
/// path: success, error, or the whole future being dropped mid-clone.
pub struct CloneFetcher<T = SystemGit> {
    transport: T,
}

impl CloneFetcher<SystemGit> {
    pub fn new() -> Self {
        CloneFetcher {
            transport: SystemGit,
        }
    }
}

impl<T> CloneFetcher<T> {
    pub fn with_transport(transport: T) -> Self {
        CloneFetcher { transport }
    }
}

#[async_trait]
impl<T: GitTransport> RemoteFetcher for CloneFetcher<T> {
    async fn fetch(&self, repo: &RepoRef, dest: &Path) -> Result<FetchSummary> {
        let scratch = tempfile::Builder::new()
            .prefix("proto-gather-clone-")
            .tempdir()
            .map_err(|e| Error::fs(std::env::temp_dir(), e))?;

        self.transport.clone_repo(repo, scratch.path()).await?;

        let subtree = scratch.path().join(&repo.path_in_repo);
        if !subtree.exists() {
            return Err(Error::NotFound {
                owner: repo.owner.clone(),
                repo: repo.repo.clone(),
                path: repo.path_in_repo.clone(),
            });
        }

        let mut files = 0usize;
        if subtree.is_dir() {
            copy_rewritten(&subtree, scratch.path(), &repo.repo, dest, &mut files)?;
        } else if is_proto_file(&subtree) {
            copy_one(&subtree, scratch.path(), &repo.repo, dest)?;
            files = 1;
        } else {
            return Err(Error::UnsupportedEntry(repo.path_in_repo.clone()));
        }

        info!(repo = %repo, files, "Fetched repository subtree via clone");
        Ok(FetchSummary { files })
    }
}

fn copy_rewritten(
    dir: &Path,
    clone_root: &Path,
    repo_name: &str,
    dest: &Path,
    files: &mut usize,
) -> Result<()> {
    for entry_res in fs::read_dir(dir).map_err(|e| Error::fs(dir, e))? {
        let entry = entry_res.map_err(|e| Error::fs(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            if entry.file_name() == ".git" {
                debug!(path = %path.display(), "Skipping directory");
                continue;
            }
            copy_rewritten(&path, clone_root, repo_name, dest, files)?;
        } else if path.is_file() && is_proto_file(&path) {
            copy_one(&path, clone_root, repo_name, dest)?;
            *files += 1;
        }
    }
    Ok(())
}

fn copy_one(path: &Path, clone_root: &Path, repo_name: &str, dest: &Path) -> Result<()> {
    let relative = path.strip_prefix(clone_root).map_err(|_| {
        Error::fs(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "file escapes the clone root",
            ),
        )
    })?;
    let content = fs::read_to_string(path).map_err(|e| Error::fs(path, e))?;
    let rewritten = match root_segment(relative) {
        Some(root) => ImportRewriter::new(root, repo_name)
            .rewrite(&content)
            .into_owned(),
        None => content,
    };
    write_file(&dest.join(relative), &rewritten)?;
    debug!(path = %relative.display(), "Stored proto file");
    Ok(())
}
