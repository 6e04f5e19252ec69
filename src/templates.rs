//! Generator configuration staging.
//!
//! The workspace root carries the buf module and codegen configs next to the
//! assembled `proto/` tree. Each file comes from an on-disk override when one
//! exists, falling back to an embedded default. Override `out:` lines are
//! normalised to a shared placeholder first, so the configured output path is
//! substituted uniformly no matter where the template came from.

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};

const BUF_YAML: &str = include_str!("../templates/buf.yaml");
const BUF_GEN_GO_YAML: &str = include_str!("../templates/buf.gen.go.yaml");
const BUF_GEN_JS_YAML: &str = include_str!("../templates/buf.gen.js.yaml");

/// Placeholder that `out:` lines are normalised to before substitution.
pub const OUTPUT_PLACEHOLDER: &str = "__output__";

/// The three resolved generator configs, ready to stage into a workspace.
/// Resolved once per run and passed down explicitly.
#[derive(Debug, Clone)]
pub struct GeneratorConfigs {
    buf_yaml: String,
    buf_gen_go: String,
    buf_gen_js: String,
}

impl GeneratorConfigs {
    /// Resolves each config from `override_dir`, falling back to the embedded
    /// default, and fixes the codegen output path in the `buf.gen.*` files.
    pub fn resolve(override_dir: &Path, codegen_out: &str) -> Result<Self> {
        let buf_yaml = load_with_default(override_dir, "buf.yaml", BUF_YAML)?;
        let buf_gen_go =
            normalize_out_lines(&load_with_default(override_dir, "buf.gen.go.yaml", BUF_GEN_GO_YAML)?)
                .replace(OUTPUT_PLACEHOLDER, codegen_out);
        let buf_gen_js =
            normalize_out_lines(&load_with_default(override_dir, "buf.gen.js.yaml", BUF_GEN_JS_YAML)?)
                .replace(OUTPUT_PLACEHOLDER, codegen_out);
        Ok(GeneratorConfigs {
            buf_yaml,
            buf_gen_go,
            buf_gen_js,
        })
    }

    /// Writes the three configs at the workspace root, overwriting previous
    /// runs.
    pub fn stage(&self, workspace: &Path) -> Result<()> {
        for (name, content) in [
            ("buf.yaml", &self.buf_yaml),
            ("buf.gen.go.yaml", &self.buf_gen_go),
            ("buf.gen.js.yaml", &self.buf_gen_js),
        ] {
            let path = workspace.join(name);
            fs::write(&path, content).map_err(|e| Error::fs(&path, e))?;
            debug!(path = %path.display(), "Staged generator config");
        }
        info!(workspace = %workspace.display(), "Staged generator configs");
        Ok(())
    }
}

fn load_with_default(dir: &Path, name: &str, default: &str) -> Result<String> {
    let candidate = dir.join(name);
    if candidate.is_file() {
        info!(path = %candidate.display(), "Using generator config override");
        return fs::read_to_string(&candidate).map_err(|e| Error::fs(&candidate, e));
    }
    Ok(default.to_string())
}

/// Rewrites every `out:` line to the placeholder, so overrides behave exactly
/// like the embedded defaults. Anchored to line starts; `timeout:` and
/// friends stay untouched.
fn normalize_out_lines(content: &str) -> String {
    let pattern = Regex::new(r"(?m)^(\s*)out:.*$").expect("out-line pattern must compile");
    pattern
        .replace_all(content, format!("${{1}}out: {}", OUTPUT_PLACEHOLDER))
        .into_owned()
}
