use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Host all remote specifiers must name.
pub const GITHUB_HOST: &str = "github.com";

/// A parsed `github.com/<owner>/<repo>/<path>[@branch]` source specifier.
///
/// `path_in_repo` is relative to the repository root; it may be empty (the
/// whole repository) and may contain slashes. `branch` is `None` when the
/// specifier names no branch, meaning the repository's default branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub path_in_repo: String,
    pub branch: Option<String>,
}

impl RepoRef {
    /// Remote URL used by the SSH clone strategy.
    pub fn ssh_url(&self) -> String {
        format!("git@{}:{}/{}.git", GITHUB_HOST, self.owner, self.repo)
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        // The branch suffix is everything after the last '@'; an empty suffix
        // means the default branch.
        let (location, branch) = match spec.rsplit_once('@') {
            Some((location, branch)) if !branch.is_empty() => {
                (location, Some(branch.to_string()))
            }
            Some((location, _)) => (location, None),
            None => (spec, None),
        };

        let parts: Vec<&str> = location.splitn(4, '/').collect();
        if parts.len() != 4 {
            return Err(Error::InvalidSpec(spec.to_string()));
        }
        let (host, owner, repo, path_in_repo) = (parts[0], parts[1], parts[2], parts[3]);
        if host != GITHUB_HOST || owner.is_empty() || repo.is_empty() {
            return Err(Error::InvalidSpec(spec.to_string()));
        }

        Ok(RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path_in_repo: path_in_repo.to_string(),
            branch,
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            GITHUB_HOST, self.owner, self.repo, self.path_in_repo
        )?;
        if let Some(branch) = &self.branch {
            write!(f, "@{}", branch)?;
        }
        Ok(())
    }
}
