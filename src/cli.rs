use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::assemble::assemble;
use crate::load_config::{load_config, RawSources};
use crate::templates::GeneratorConfigs;

/// CLI for proto-gather: assemble one proto workspace from many sources.
#[derive(Parser)]
#[clap(
    name = "proto-gather",
    version,
    about = "Assemble local and GitHub proto trees into a single workspace for code generation"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Gather all configured proto sources into a fresh workspace
    Assemble {
        /// Path to a YAML config file (instead of the source flags)
        #[clap(long)]
        config: Option<PathBuf>,
        /// Local directory whose proto tree is mirrored into the workspace
        #[clap(long)]
        local: Option<PathBuf>,
        /// Public repository specifier `github.com/<owner>/<repo>/<path>[@branch]` (repeatable)
        #[clap(long = "public-repo")]
        public_repos: Vec<String>,
        /// Private repository specifier (repeatable)
        #[clap(long = "private-repo")]
        private_repos: Vec<String>,
        /// GitHub token for private sources (falls back to GITHUB_TOKEN)
        #[clap(long)]
        token: Option<String>,
        /// Directory where the workspace is assembled
        #[clap(long, default_value = "proto-workspace")]
        workspace: PathBuf,
        /// Output path written into the staged codegen configs
        #[clap(long = "codegen-out", default_value = "generated")]
        codegen_out: String,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Assemble {
            config,
            local,
            public_repos,
            private_repos,
            token,
            workspace,
            codegen_out,
        } => {
            let config = load_config(RawSources {
                config_file: config,
                local,
                public_repos,
                private_repos,
                token,
            })?;

            // Overrides are picked up from the invocation directory, like the
            // config file would be.
            let generator_configs = GeneratorConfigs::resolve(Path::new("."), &codegen_out)?;

            // The assembled tree must only ever contain this run's files.
            let proto_root = workspace.join("proto");
            if proto_root.exists() {
                info!(path = %proto_root.display(), "Removing assembled tree from previous run");
                std::fs::remove_dir_all(&proto_root)?;
            }
            std::fs::create_dir_all(&workspace)?;
            generator_configs.stage(&workspace)?;

            println!("Assembly starting...");
            let report = tokio::select! {
                result = assemble(&config, &proto_root) => result?,
                _ = tokio::signal::ctrl_c() => {
                    error!("[ASSEMBLE] Interrupted, cancelling in-flight fetches");
                    anyhow::bail!("assembly cancelled");
                }
            };

            println!("Assembly complete.\nReport:");
            println!("{:#?}", report);
            if !report.failures.is_empty() {
                eprintln!(
                    "[WARN] {} source(s) failed; the workspace contains the rest",
                    report.failures.len()
                );
            }
            Ok(())
        }
    }
}
