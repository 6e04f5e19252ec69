//! Local proto tree mirroring.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Mirrors every `.proto` file under `src` into `dest`, preserving relative
/// structure and carrying each directory's permission bits over. Contents are
/// copied verbatim; local trees already use workspace-relative imports.
///
/// Unlike remote fetches, any failure here aborts the copy with the offending
/// path, and the assembler treats that as fatal for the whole run.
pub fn mirror_proto_tree(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(Error::fs(
            src,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "local proto directory does not exist",
            ),
        ));
    }
    fs::create_dir_all(dest).map_err(|e| Error::fs(dest, e))?;

    let mut copied = 0usize;
    visit_dir(src, dest, &mut copied)?;
    info!(
        source = %src.display(),
        dest = %dest.display(),
        files = copied,
        "Mirrored local proto tree"
    );
    Ok(copied)
}

fn visit_dir(src_dir: &Path, dest_dir: &Path, copied: &mut usize) -> Result<()> {
    for entry_res in fs::read_dir(src_dir).map_err(|e| Error::fs(src_dir, e))? {
        let entry = entry_res.map_err(|e| Error::fs(src_dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            if entry.file_name() == ".git" {
                debug!(path = %path.display(), "Skipping directory");
                continue;
            }
            let target = dest_dir.join(entry.file_name());
            let metadata = fs::metadata(&path).map_err(|e| Error::fs(&path, e))?;
            fs::create_dir_all(&target).map_err(|e| Error::fs(&target, e))?;
            fs::set_permissions(&target, metadata.permissions())
                .map_err(|e| Error::fs(&target, e))?;
            visit_dir(&path, &target, copied)?;
        } else if path.is_file() && is_proto_file(&path) {
            let target = dest_dir.join(entry.file_name());
            fs::copy(&path, &target).map_err(|e| Error::fs(&target, e))?;
            *copied += 1;
            debug!(path = %target.display(), "Copied proto file");
        }
    }
    Ok(())
}

pub(crate) fn is_proto_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "proto")
}

/// Writes `content` at `path`, creating parent directories as needed.
/// Existing files are overwritten.
pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::fs(parent, e))?;
    }
    fs::write(path, content).map_err(|e| Error::fs(path, e))
}
