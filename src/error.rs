use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds of the aggregation engine.
///
/// Remote failures are caught per source by the assembler and recorded in the
/// run report; filesystem failures on the local side abort the run.
#[derive(Debug, Error)]
pub enum Error {
    /// The source specifier does not match
    /// `github.com/<owner>/<repo>/<path>[@branch]`.
    #[error("invalid repo path format: '{0}'")]
    InvalidSpec(String),

    /// The requested path does not exist in the remote repository.
    #[error("path '{path}' not found within repository '{owner}/{repo}'. Check path spelling or ensure it exists")]
    NotFound {
        owner: String,
        repo: String,
        path: String,
    },

    /// The remote side failed: HTTP, git transport or an undecodable payload.
    #[error("{0}")]
    Transport(String),

    /// A local read or write failed.
    #[error("filesystem operation failed at '{path}': {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote entry is neither a proto file nor a directory.
    #[error("'{0}' is not a .proto file or a directory")]
    UnsupportedEntry(String),
}

impl Error {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }
}
