use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

/// Everything one aggregation run needs to know about its sources.
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Local directory whose proto tree is mirrored straight into the
    /// workspace root.
    pub local_path: Option<PathBuf>,
    /// Public repository specifiers, fetched through the contents API.
    pub public_repos: Vec<String>,
    /// Private repository specifiers plus how to reach them.
    pub private: Option<PrivateSources>,
}

impl AggregateConfig {
    pub fn trace_loaded(&self) {
        info!(
            local_path = ?self.local_path,
            public_count = self.public_repos.len(),
            private_count = self.private.as_ref().map(|p| p.repos.len()).unwrap_or(0),
            "Loaded AggregateConfig"
        );
        if let Some(private) = &self.private {
            private.auth.trace_loaded();
        }
        debug!(?self, "AggregateConfig loaded (full debug)");
    }

    /// True when no source of any kind is configured.
    pub fn is_empty(&self) -> bool {
        self.local_path.is_none()
            && self.public_repos.is_empty()
            && self.private.as_ref().map_or(true, |p| p.repos.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct PrivateSources {
    pub repos: Vec<String>,
    pub auth: AuthMode,
}

/// How private repositories are reached. Fixed once, before any fetch runs.
#[derive(Clone)]
pub enum AuthMode {
    /// Contents API with a bearer token.
    Token(String),
    /// `git clone` over SSH with whatever keys the environment provides.
    Ssh,
}

impl AuthMode {
    pub fn trace_loaded(&self) {
        match self {
            AuthMode::Token(token) => {
                info!(
                    token_len = token.len(),
                    "Using token authentication for private sources"
                );
            }
            AuthMode::Ssh => {
                info!("Using SSH clone authentication for private sources");
            }
        }
    }
}

// The token itself must never reach the logs.
impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Token(token) => f
                .debug_tuple("Token")
                .field(&format_args!("<{} bytes>", token.len()))
                .finish(),
            AuthMode::Ssh => f.write_str("Ssh"),
        }
    }
}
