//! Workspace assembly: the phase-ordered pipeline that turns configured
//! sources into one populated proto tree.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{error, info};

use crate::clone::CloneFetcher;
use crate::config::{AggregateConfig, AuthMode};
use crate::contract::{FetchSummary, RemoteFetcher};
use crate::copy::mirror_proto_tree;
use crate::error::{Error, Result};
use crate::github::{ApiFetcher, GitHubClient};
use crate::repo_ref::RepoRef;

/// Outcome of one run: what landed in the workspace and which sources failed.
#[derive(Debug)]
pub struct AssembleReport {
    pub workspace: PathBuf,
    pub local_files: usize,
    pub fetched: Vec<SourceReport>,
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug)]
pub struct SourceReport {
    pub source: String,
    pub files: usize,
}

#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: Error,
}

/// Assembles the full workspace with the real fetchers.
///
/// Private sources use the transport the configured auth mode picked; public
/// sources always go through the anonymous contents API.
pub async fn assemble(config: &AggregateConfig, dest_root: &Path) -> Result<AssembleReport> {
    let public = ApiFetcher::new(GitHubClient::anonymous());
    let private: Option<Box<dyn RemoteFetcher>> = config.private.as_ref().map(|p| match &p.auth {
        AuthMode::Token(token) => Box::new(ApiFetcher::new(GitHubClient::new(Some(
            token.clone(),
        )))) as Box<dyn RemoteFetcher>,
        AuthMode::Ssh => Box::new(CloneFetcher::new()) as Box<dyn RemoteFetcher>,
    });
    assemble_with(config, dest_root, &public, private.as_deref()).await
}

/// Same pipeline with injected fetchers, for tests and embedding.
///
/// Phases run in a fixed order: destination preparation and the local mirror
/// abort the run on failure; every remote source failure is logged, recorded
/// in the report and tolerated. Remote sources within a phase fetch
/// concurrently, each into its own `dest_root/<repo>` namespace, so two
/// repositories exposing the same relative path never collide.
pub async fn assemble_with(
    config: &AggregateConfig,
    dest_root: &Path,
    public_fetcher: &dyn RemoteFetcher,
    private_fetcher: Option<&dyn RemoteFetcher>,
) -> Result<AssembleReport> {
    info!(dest = %dest_root.display(), "[ASSEMBLE] Preparing destination");
    std::fs::create_dir_all(dest_root).map_err(|e| Error::fs(dest_root, e))?;

    let mut report = AssembleReport {
        workspace: dest_root.to_path_buf(),
        local_files: 0,
        fetched: Vec::new(),
        failures: Vec::new(),
    };

    if let Some(local) = &config.local_path {
        info!(local = %local.display(), "[ASSEMBLE] Mirroring local proto tree");
        report.local_files = mirror_proto_tree(local, dest_root)?;
    }

    if let Some(private) = &config.private {
        let Some(fetcher) = private_fetcher else {
            error!("[ASSEMBLE][ERROR] Private sources configured but no private fetcher supplied");
            return Err(Error::Transport(
                "no fetcher available for private sources".to_string(),
            ));
        };
        info!(count = private.repos.len(), "[ASSEMBLE] Fetching private sources");
        fetch_phase(&private.repos, fetcher, dest_root, &mut report).await;
    }

    if !config.public_repos.is_empty() {
        info!(count = config.public_repos.len(), "[ASSEMBLE] Fetching public sources");
        fetch_phase(&config.public_repos, public_fetcher, dest_root, &mut report).await;
    }

    info!(
        fetched = report.fetched.len(),
        failed = report.failures.len(),
        "[ASSEMBLE] Workspace assembly finished"
    );
    Ok(report)
}

async fn fetch_phase(
    specs: &[String],
    fetcher: &dyn RemoteFetcher,
    dest_root: &Path,
    report: &mut AssembleReport,
) {
    let outcomes = join_all(
        specs
            .iter()
            .map(|spec| fetch_source(spec, fetcher, dest_root)),
    )
    .await;

    for (spec, outcome) in specs.iter().zip(outcomes) {
        match outcome {
            Ok(summary) => {
                info!(source = %spec, files = summary.files, "[ASSEMBLE] Source fetched");
                report.fetched.push(SourceReport {
                    source: spec.clone(),
                    files: summary.files,
                });
            }
            Err(e) => {
                error!(
                    source = %spec,
                    error = %e,
                    "[ASSEMBLE][ERROR] Source failed, continuing with remaining sources"
                );
                report.failures.push(SourceFailure {
                    source: spec.clone(),
                    error: e,
                });
            }
        }
    }
}

async fn fetch_source(
    spec: &str,
    fetcher: &dyn RemoteFetcher,
    dest_root: &Path,
) -> Result<FetchSummary> {
    let repo: RepoRef = spec.parse()?;
    fetcher.fetch(&repo, &dest_root.join(&repo.repo)).await
}
