use std::io::Write;
use std::path::Path;

use anyhow::Result;
use atomicwrites::{AtomicFile, OverwriteBehavior};

/// Write `contents` to `path` via a temp file and rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(contents.as_bytes())?;
            f.flush()
        })
        .map_err(|err| anyhow::anyhow!("Failed to write {}: {err}", path.display()))?;
    Ok(())
}

/// Write to `path` when given, otherwise to stdout.
pub fn emit(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => write_atomic(path, contents),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
