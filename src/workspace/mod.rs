pub mod publisher;
pub mod report;
pub mod scratch;

pub use publisher::{ArtifactPublisher, PublishedArtifact, ARTIFACT_NAME, PUBLISHED_NAME};
pub use report::ExtractionReport;
pub use scratch::{ensure_directory, ScratchDirectory, SCRATCH_PREFIX};
