use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::WriteError;

/// Replace `path` with `contents`.
///
/// The data goes to a temporary file in the target directory first and is
/// then renamed over `path`, so readers see either the old file or the new
/// one. Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), WriteError> {
    let fail = |cause| WriteError {
        path: path.to_path_buf(),
        cause,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(fail)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(fail)?;
    temp.write_all(contents.as_bytes()).map_err(fail)?;
    temp.as_file().sync_all().map_err(fail)?;
    temp.persist(path).map_err(|e| fail(e.error))?;

    info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
