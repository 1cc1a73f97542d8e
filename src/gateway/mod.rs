//! Filesystem-backed artifact tracking: content-addressed blobs, versioned
//! manifests and run records.

pub mod artifact_store;
pub mod cas_fs;
pub mod reference;
pub mod run;

pub use artifact_store::{ArtifactEntry, ArtifactManifest, FsArtifactStore, NewArtifact};
pub use reference::{ArtifactRef, ArtifactVersion};
pub use run::{Run, RunRecord, RunState};
