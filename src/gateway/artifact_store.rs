use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::gateway::cas_fs::{read_cas, sha256_hex, write_cas};
use crate::gateway::reference::{validate_alias, validate_name, ArtifactRef, ArtifactVersion};
use crate::gateway::run::RunRecord;

const MANIFEST_FILE: &str = "manifest.json";
const ALIASES_FILE: &str = "aliases.json";

/// One file inside a logged artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactEntry {
    /// File name inside the artifact
    pub path: String,
    /// Content address of the bytes
    pub cas_ref: String,
    pub size: u64,
}

/// Immutable record of one artifact version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactManifest {
    pub name: String,
    pub version: u32,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Run that logged this version
    pub run_id: Option<String>,
    /// sha256 over the sorted entries; equal digests mean equal content
    pub digest: String,
    pub entries: Vec<ArtifactEntry>,
}

impl ArtifactManifest {
    pub fn reference(&self) -> String {
        format!("{}:v{}", self.name, self.version)
    }
}

/// An artifact being assembled before it is logged.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub name: String,
    pub artifact_type: String,
    pub description: String,
    pub files: Vec<PathBuf>,
    /// Aliases pointed at the logged version
    pub aliases: Vec<String>,
}

impl NewArtifact {
    pub fn new(name: &str, artifact_type: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            artifact_type: artifact_type.to_string(),
            description: description.to_string(),
            files: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn add_alias(&mut self, alias: &str) -> &mut Self {
        self.aliases.push(alias.to_string());
        self
    }
}

/// Versioned artifact store on the local filesystem.
///
/// Layout under `<root>/<project>`:
/// - `cas/sha256/..` file contents
/// - `artifacts/<name>/v<N>/manifest.json`
/// - `artifacts/<name>/aliases.json` alias to version map
/// - `runs/<run_id>.json`
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    project_root: PathBuf,
}

impl FsArtifactStore {
    pub fn open(root: &Path, project: &str) -> Result<Self> {
        validate_name(project)
            .map_err(|_| PipelineError::Config(format!("invalid project name '{}'", project)))?;
        let project_root = root.join(project);
        fs::create_dir_all(project_root.join("artifacts"))?;
        fs::create_dir_all(project_root.join("runs"))?;
        Ok(Self { project_root })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::open(&config.artifact_root, &config.project)
    }

    fn cas_root(&self) -> PathBuf {
        self.project_root.join("cas")
    }

    fn artifact_dir(&self, name: &str) -> PathBuf {
        self.project_root.join("artifacts").join(name)
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.project_root.join("runs").join(format!("{}.json", run_id))
    }

    /// Version numbers logged under `name`, ascending.
    pub fn versions(&self, name: &str) -> Result<Vec<u32>> {
        let dir = self.artifact_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut versions: Vec<u32> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|s| s.strip_prefix('v'))
                    .and_then(|n| n.parse().ok())
            })
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }

    /// Look up the manifest for `name`, `name:latest`, `name:vN` or `name:<alias>`.
    pub fn resolve(&self, reference: &str) -> Result<ArtifactManifest> {
        let parsed = ArtifactRef::parse(reference)?;
        let version = match &parsed.version {
            ArtifactVersion::Number(n) => *n,
            ArtifactVersion::Latest => *self
                .versions(&parsed.name)?
                .last()
                .ok_or_else(|| PipelineError::ArtifactNotFound(reference.to_string()))?,
            ArtifactVersion::Alias(alias) => *self
                .aliases(&parsed.name)?
                .get(alias)
                .ok_or_else(|| PipelineError::ArtifactNotFound(reference.to_string()))?,
        };
        let path = self
            .artifact_dir(&parsed.name)
            .join(format!("v{}", version))
            .join(MANIFEST_FILE);
        if !path.exists() {
            return Err(PipelineError::ArtifactNotFound(reference.to_string()));
        }
        let manifest: ArtifactManifest = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(manifest)
    }

    /// Alias to version map for `name`.
    pub fn aliases(&self, name: &str) -> Result<BTreeMap<String, u32>> {
        let path = self.artifact_dir(name).join(ALIASES_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Point `alias` at an existing version, moving it if already assigned.
    pub fn set_alias(&self, name: &str, version: u32, alias: &str) -> Result<()> {
        validate_alias(alias)?;
        if !self.versions(name)?.contains(&version) {
            return Err(PipelineError::ArtifactNotFound(format!("{}:v{}", name, version)));
        }
        let mut aliases = self.aliases(name)?;
        aliases.insert(alias.to_string(), version);
        fs::write(
            self.artifact_dir(name).join(ALIASES_FILE),
            serde_json::to_string_pretty(&aliases)?,
        )?;
        info!(artifact = %format!("{}:v{}", name, version), alias, "Alias assigned");
        Ok(())
    }

    /// Log a new artifact version. Content and type identical to the latest
    /// version return that version instead of creating another.
    pub fn log(&self, artifact: &NewArtifact, run_id: Option<&str>) -> Result<ArtifactManifest> {
        let manifest = self.log_version(artifact, run_id)?;
        for alias in &artifact.aliases {
            self.set_alias(&manifest.name, manifest.version, alias)?;
        }
        Ok(manifest)
    }

    fn log_version(&self, artifact: &NewArtifact, run_id: Option<&str>) -> Result<ArtifactManifest> {
        validate_name(&artifact.name)?;
        for alias in &artifact.aliases {
            validate_alias(alias)?;
        }

        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(artifact.files.len());
        for file in &artifact.files {
            if !file.is_file() {
                return Err(PipelineError::FileNotFound(file.display().to_string()));
            }
            let path = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| PipelineError::FileNotFound(file.display().to_string()))?
                .to_string();
            if !seen.insert(path.clone()) {
                return Err(PipelineError::Config(format!(
                    "artifact '{}' already contains a file named '{}'",
                    artifact.name, path
                )));
            }
            let bytes = fs::read(file)?;
            let cas_ref = write_cas(&self.cas_root(), &bytes)?;
            entries.push(ArtifactEntry {
                path,
                cas_ref,
                size: bytes.len() as u64,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        let digest = manifest_digest(&entries);

        let versions = self.versions(&artifact.name)?;
        if let Some(&latest) = versions.last() {
            let current = self.resolve(&format!("{}:v{}", artifact.name, latest))?;
            // Same bytes under a different type is a new version
            if current.digest == digest && current.artifact_type == artifact.artifact_type {
                if current.description != artifact.description {
                    warn!(
                        artifact = %current.reference(),
                        kept = %current.description,
                        ignored = %artifact.description,
                        "Content unchanged, keeping the existing description"
                    );
                }
                info!(artifact = %current.reference(), "Content unchanged, reusing existing version");
                return Ok(current);
            }
        }

        let version = versions.last().map_or(0, |v| v + 1);
        let manifest = ArtifactManifest {
            name: artifact.name.clone(),
            version,
            artifact_type: artifact.artifact_type.clone(),
            description: artifact.description.clone(),
            created_at: Utc::now(),
            run_id: run_id.map(str::to_string),
            digest,
            entries,
        };

        let version_dir = self.artifact_dir(&artifact.name).join(format!("v{}", version));
        fs::create_dir_all(self.artifact_dir(&artifact.name))?;
        // create_dir (not _all) so an existing version is never overwritten
        fs::create_dir(&version_dir)?;
        fs::write(
            version_dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;
        info!(artifact = %manifest.reference(), files = manifest.entries.len(), "Logged artifact");
        Ok(manifest)
    }

    /// Materialize every file of `manifest` under `dest`.
    pub fn download(&self, manifest: &ArtifactManifest, dest: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dest)?;
        for entry in &manifest.entries {
            let bytes = read_cas(&self.cas_root(), &entry.cas_ref)?;
            let target = dest.join(&entry.path);
            debug!(file = %target.display(), "Materializing artifact file");
            fs::write(&target, bytes)?;
        }
        Ok(dest.to_path_buf())
    }

    /// Materialize a single-file artifact and return the file path.
    pub fn file(&self, manifest: &ArtifactManifest, dest: &Path) -> Result<PathBuf> {
        match manifest.entries.as_slice() {
            [entry] => {
                self.download(manifest, dest)?;
                Ok(dest.join(&entry.path))
            }
            [] => Err(PipelineError::FileNotFound(format!(
                "artifact {} contains no files",
                manifest.reference()
            ))),
            entries => Err(PipelineError::Config(format!(
                "artifact {} contains {} files, expected exactly one",
                manifest.reference(),
                entries.len()
            ))),
        }
    }

    pub fn write_run(&self, record: &RunRecord) -> Result<()> {
        fs::write(self.run_path(&record.id), serde_json::to_string_pretty(record)?)?;
        Ok(())
    }

    pub fn read_run(&self, run_id: &str) -> Result<RunRecord> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.display().to_string()));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

fn manifest_digest(entries: &[ArtifactEntry]) -> String {
    let joined: String = entries
        .iter()
        .map(|e| format!("{}:{}\n", e.path, e.cas_ref))
        .collect();
    sha256_hex(joined.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn versions_increment_when_content_changes() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        let store = FsArtifactStore::open(root.path(), "nyc_airbnb").unwrap();

        let mut first = NewArtifact::new("sample.csv", "raw_data", "first");
        first.add_file(write(work.path(), "sample.csv", "id\n1\n"));
        assert_eq!(store.log(&first, None).unwrap().version, 0);

        let mut second = NewArtifact::new("sample.csv", "raw_data", "second");
        second.add_file(write(work.path(), "sample.csv", "id\n2\n"));
        let logged = store.log(&second, Some("run-1")).unwrap();
        assert_eq!(logged.version, 1);
        assert_eq!(logged.run_id.as_deref(), Some("run-1"));

        assert_eq!(store.resolve("sample.csv").unwrap().version, 1);
        assert_eq!(store.resolve("sample.csv:v0").unwrap().description, "first");
    }

    #[test]
    fn identical_content_is_not_versioned_again() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        let store = FsArtifactStore::open(root.path(), "nyc_airbnb").unwrap();
        let mut artifact = NewArtifact::new("sample.csv", "raw_data", "raw");
        artifact.add_file(write(work.path(), "sample.csv", "id\n1\n"));

        store.log(&artifact, None).unwrap();
        let again = store.log(&artifact, None).unwrap();
        assert_eq!(again.version, 0);
        assert_eq!(store.versions("sample.csv").unwrap(), vec![0]);
    }

    #[test]
    fn same_content_under_new_type_is_a_new_version() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        let store = FsArtifactStore::open(root.path(), "nyc_airbnb").unwrap();
        let file = write(work.path(), "sample.csv", "id\n1\n");

        let mut raw = NewArtifact::new("sample.csv", "raw_data", "raw");
        raw.add_file(&file);
        store.log(&raw, None).unwrap();

        let mut relabelled = NewArtifact::new("sample.csv", "raw_data", "relabelled");
        relabelled.add_file(&file);
        let reused = store.log(&relabelled, None).unwrap();
        assert_eq!(reused.version, 0);
        assert_eq!(reused.description, "raw");

        let mut clean = NewArtifact::new("sample.csv", "clean_sample", "raw");
        clean.add_file(&file);
        let logged = store.log(&clean, None).unwrap();
        assert_eq!(logged.version, 1);
        assert_eq!(logged.artifact_type, "clean_sample");
    }

    #[test]
    fn aliases_resolve_and_move() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        let store = FsArtifactStore::open(root.path(), "nyc_airbnb").unwrap();

        let mut first = NewArtifact::new("clean_sample.csv", "clean_sample", "");
        first
            .add_file(write(work.path(), "clean_sample.csv", "id\n1\n"))
            .add_alias("reference");
        store.log(&first, None).unwrap();

        let mut second = NewArtifact::new("clean_sample.csv", "clean_sample", "");
        second.add_file(write(work.path(), "clean_sample.csv", "id\n2\n"));
        store.log(&second, None).unwrap();

        assert_eq!(store.resolve("clean_sample.csv:reference").unwrap().version, 0);
        assert_eq!(store.resolve("clean_sample.csv:latest").unwrap().version, 1);

        store.set_alias("clean_sample.csv", 1, "reference").unwrap();
        assert_eq!(store.resolve("clean_sample.csv:reference").unwrap().version, 1);
        assert!(store.set_alias("clean_sample.csv", 7, "reference").is_err());
        assert!(matches!(
            store.resolve("clean_sample.csv:prod"),
            Err(PipelineError::ArtifactNotFound(_))
        ));
    }

    #[test]
    fn unknown_reference_is_not_found() {
        let root = tempdir().unwrap();
        let store = FsArtifactStore::open(root.path(), "nyc_airbnb").unwrap();
        assert!(matches!(
            store.resolve("nothing.csv"),
            Err(PipelineError::ArtifactNotFound(_))
        ));
        assert!(matches!(
            store.resolve("nothing.csv:v4"),
            Err(PipelineError::ArtifactNotFound(_))
        ));
    }

    #[test]
    fn missing_source_file_is_rejected() {
        let root = tempdir().unwrap();
        let store = FsArtifactStore::open(root.path(), "nyc_airbnb").unwrap();
        let mut artifact = NewArtifact::new("sample.csv", "raw_data", "raw");
        artifact.add_file(root.path().join("absent.csv"));
        assert!(matches!(
            store.log(&artifact, None),
            Err(PipelineError::FileNotFound(_))
        ));
    }

    #[test]
    fn file_materializes_single_entry() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        let store = FsArtifactStore::open(root.path(), "nyc_airbnb").unwrap();
        let mut artifact = NewArtifact::new("sample.csv", "raw_data", "raw");
        artifact.add_file(write(work.path(), "sample.csv", "id\n1\n"));
        let manifest = store.log(&artifact, None).unwrap();

        let out = tempdir().unwrap();
        let path = store.file(&manifest, out.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "id\n1\n");
    }

    #[test]
    fn file_rejects_multi_file_artifacts() {
        let root = tempdir().unwrap();
        let work = tempdir().unwrap();
        let store = FsArtifactStore::open(root.path(), "nyc_airbnb").unwrap();
        let mut artifact = NewArtifact::new("model_export", "model_export", "model");
        artifact
            .add_file(write(work.path(), "model.json", "{}"))
            .add_file(write(work.path(), "README", "linear"));
        let manifest = store.log(&artifact, None).unwrap();

        let out = tempdir().unwrap();
        assert!(store.file(&manifest, out.path()).is_err());
        let dir = store.download(&manifest, out.path()).unwrap();
        assert!(dir.join("model.json").exists());
        assert!(dir.join("README").exists());
    }
}
