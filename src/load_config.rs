use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::{AggregateConfig, AuthMode, PrivateSources};

/// Unresolved inputs as they arrive from flags and files.
#[derive(Debug, Default)]
pub struct RawSources {
    pub config_file: Option<PathBuf>,
    pub local: Option<PathBuf>,
    pub public_repos: Vec<String>,
    pub private_repos: Vec<String>,
    pub token: Option<String>,
}

/// Static YAML config file shape (no secrets; the token always comes from a
/// flag or the environment).
#[derive(Deserialize)]
struct FileConfig {
    #[serde(default)]
    local: Option<PathBuf>,
    #[serde(default)]
    public_repos: Vec<String>,
    #[serde(default)]
    private_repos: Vec<String>,
}

/// Merges file, flag and environment inputs into a validated
/// [`AggregateConfig`].
///
/// The private-source auth mode is fixed here, before any fetch starts: an
/// explicit or `GITHUB_TOKEN` token wins, SSH keys under `~/.ssh` are the
/// fallback, and private sources without either are a configuration error.
pub fn load_config(raw: RawSources) -> Result<AggregateConfig> {
    let (local, public_repos, private_repos) = match &raw.config_file {
        Some(path) => {
            if raw.local.is_some() || !raw.public_repos.is_empty() || !raw.private_repos.is_empty()
            {
                error!(config_path = ?path, "Both a config file and source flags were given");
                anyhow::bail!(
                    "--config cannot be combined with --local/--public-repo/--private-repo"
                );
            }
            let file = read_file_config(path)?;
            (file.local, file.public_repos, file.private_repos)
        }
        None => (raw.local, raw.public_repos, raw.private_repos),
    };

    let token = raw
        .token
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .filter(|t| !t.is_empty());

    let private = if private_repos.is_empty() {
        None
    } else {
        let auth = match token {
            Some(token) => {
                info!(token_len = token.len(), "GitHub token found for private sources");
                AuthMode::Token(token)
            }
            None if ssh_keys_available(&default_ssh_dir()) => {
                info!("No GitHub token; falling back to SSH clone for private sources");
                AuthMode::Ssh
            }
            None => {
                error!("Private repositories configured but no GitHub token or SSH key is available");
                anyhow::bail!(
                    "private repositories require a GitHub token (--token or GITHUB_TOKEN) or an SSH key in ~/.ssh"
                );
            }
        };
        Some(PrivateSources {
            repos: private_repos,
            auth,
        })
    };

    let config = AggregateConfig {
        local_path: local,
        public_repos,
        private,
    };

    if config.is_empty() {
        error!("No sources configured");
        anyhow::bail!("at least one source is required: --local, --public-repo or --private-repo");
    }

    config.trace_loaded();
    Ok(config)
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");
    let content = match std::fs::read_to_string(path) {
        Ok(content) => {
            info!(config_path = ?path, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!("Failed to read config file {:?}: {}", path, e));
        }
    };
    match serde_yaml::from_str(&content) {
        Ok(config) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Probes for the key files `git` itself would pick up.
pub fn ssh_keys_available(ssh_dir: &Path) -> bool {
    ["id_rsa", "id_ed25519", "id_ecdsa"]
        .iter()
        .any(|key| ssh_dir.join(key).is_file())
}

fn default_ssh_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".ssh")
}
