use crate::error::{ExtractorError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File the extraction tool leaves in its output directory (no extension).
pub const ARTIFACT_NAME: &str = "shrdres";

/// Name the artifact is published under.
pub const PUBLISHED_NAME: &str = "shrdres.xzp";

#[derive(Debug, Clone)]
pub struct PublishedArtifact {
    pub path: PathBuf,
    pub size: u64,
}

/// Moves the extracted artifact into the output directory.
pub struct ArtifactPublisher {
    output_dir: PathBuf,
}

impl ArtifactPublisher {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn destination(&self) -> PathBuf {
        self.output_dir.join(PUBLISHED_NAME)
    }

    /// Path of the artifact inside `extract_dir`, or `ExtractionFailed` when
    /// the tool did not produce it.
    pub fn locate_artifact(&self, extract_dir: &Path) -> Result<PathBuf> {
        let artifact = extract_dir.join(ARTIFACT_NAME);
        if artifact.is_file() {
            Ok(artifact)
        } else {
            Err(ExtractorError::ExtractionFailed {
                artifact: ARTIFACT_NAME.to_string(),
            })
        }
    }

    /// Replace any previously published file with `artifact`.
    pub fn publish(&self, artifact: &Path) -> Result<PublishedArtifact> {
        let destination = self.destination();

        // A rename does not replace an existing file on every platform.
        if destination.exists() {
            fs::remove_file(&destination)?;
        }

        move_file(artifact, &destination)?;

        let size = fs::metadata(&destination)?.len();
        Ok(PublishedArtifact {
            path: destination,
            size,
        })
    }
}

fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        // The temp directory usually lives on another volume than the output.
        Err(_) => copy_then_remove(source, dest),
    }
}

/// Copies into a temporary file beside `dest` and renames it into place, so a
/// failed copy never leaves a partial `dest` behind.
fn copy_then_remove(source: &Path, dest: &Path) -> io::Result<()> {
    let dest_dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(dest_dir)?;

    let mut reader = fs::File::open(source)?;
    io::copy(&mut reader, staged.as_file_mut())?;
    staged.as_file().sync_all()?;

    if let Ok(modified_time) = fs::metadata(source).and_then(|m| m.modified()) {
        let _ = filetime::set_file_mtime(
            staged.path(),
            filetime::FileTime::from_system_time(modified_time),
        );
    }

    staged.persist(dest).map_err(|e| e.error)?;
    fs::remove_file(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_missing_artifact() {
        let extract_dir = TempDir::new().unwrap();
        let publisher = ArtifactPublisher::new("unused");

        let err = publisher.locate_artifact(extract_dir.path()).unwrap_err();
        assert!(matches!(err, ExtractorError::ExtractionFailed { .. }));
    }

    #[test]
    fn test_locate_ignores_similar_names() {
        let extract_dir = TempDir::new().unwrap();
        fs::write(extract_dir.path().join("shrdres.xzp"), b"x").unwrap();
        fs::create_dir(extract_dir.path().join("dir")).unwrap();

        let publisher = ArtifactPublisher::new("unused");
        assert!(publisher.locate_artifact(extract_dir.path()).is_err());
    }

    #[test]
    fn test_publish_renames_artifact() {
        let extract_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        fs::write(extract_dir.path().join(ARTIFACT_NAME), b"resource bytes").unwrap();

        let publisher = ArtifactPublisher::new(output_dir.path());
        let artifact = publisher.locate_artifact(extract_dir.path()).unwrap();
        let published = publisher.publish(&artifact).unwrap();

        assert_eq!(published.path, output_dir.path().join("shrdres.xzp"));
        assert_eq!(published.size, 14);
        assert_eq!(fs::read(&published.path).unwrap(), b"resource bytes");
        assert!(!artifact.exists());
    }

    #[test]
    fn test_publish_replaces_existing() {
        let extract_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        fs::write(output_dir.path().join(PUBLISHED_NAME), b"old").unwrap();
        fs::write(extract_dir.path().join(ARTIFACT_NAME), b"new").unwrap();

        let publisher = ArtifactPublisher::new(output_dir.path());
        publisher
            .publish(&extract_dir.path().join(ARTIFACT_NAME))
            .unwrap();

        assert_eq!(fs::read(output_dir.path().join(PUBLISHED_NAME)).unwrap(), b"new");
        let entries = fs::read_dir(output_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_copy_fallback_preserves_content() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("shrdres");
        let dest = dest_dir.path().join("copy.xzp");
        fs::write(&source, b"payload").unwrap();

        copy_then_remove(&source, &dest).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn test_copy_fallback_preserves_mtime() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("shrdres");
        let dest = dest_dir.path().join("copy.xzp");
        fs::write(&source, b"payload").unwrap();
        let mtime = filetime::FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();

        copy_then_remove(&source, &dest).unwrap();

        let copied = filetime::FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(copied, mtime);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_leaves_no_partial_file() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        // Opening a directory succeeds on Unix but reading it fails.
        let source = source_dir.path().join("shrdres");
        fs::create_dir(&source).unwrap();
        let dest = dest_dir.path().join("copy.xzp");

        assert!(copy_then_remove(&source, &dest).is_err());

        assert!(!dest.exists());
        assert_eq!(fs::read_dir(dest_dir.path()).unwrap().count(), 0);
        assert!(source.exists());
    }
}
