use crate::error::{ExtractorError, Result};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Name prefix of the per-run scratch directory inside the system temp path.
pub const SCRATCH_PREFIX: &str = "ResourceExtractor";

/// Per-invocation scratch directory handed to the extraction tool.
///
/// Each run gets a uniquely suffixed directory, so concurrent runs never share
/// state. The directory and everything in it is removed when the value is
/// dropped, which covers every failure path; `close` does the same on the
/// success path and reports removal errors.
#[derive(Debug)]
pub struct ScratchDirectory {
    dir: TempDir,
}

impl ScratchDirectory {
    pub fn create() -> Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    pub fn create_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        let parent = parent.as_ref();
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-", SCRATCH_PREFIX))
            .tempdir_in(parent)
            .map_err(|_| ExtractorError::DirectoryInit {
                path: parent.join(SCRATCH_PREFIX),
            })?;

        if !dir.path().is_dir() {
            return Err(ExtractorError::DirectoryInit {
                path: dir.path().to_path_buf(),
            });
        }

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn close(self) -> Result<()> {
        self.dir.close().map_err(ExtractorError::Io)
    }
}

/// Create `path` (and parents) if missing, then confirm it is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        // Creation errors are reported through the check below.
        let _ = fs::create_dir_all(path);
    }

    if path.is_dir() {
        Ok(())
    } else {
        Err(ExtractorError::DirectoryInit {
            path: path.to_path_buf(),
        })
    }
}
