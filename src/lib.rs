pub mod assemble;
pub mod cli;
pub mod clone;
pub mod config;
pub mod contract;
pub mod copy;
pub mod error;
pub mod github;
pub mod load_config;
pub mod repo_ref;
pub mod rewrite;
pub mod templates;

pub use cli::{run, Cli, Commands};
pub use error::{Error, Result};
