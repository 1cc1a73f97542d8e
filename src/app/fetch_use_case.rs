use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

use crate::app::ports::{HttpClientPort, TrackingPort};
use crate::error::PipelineError;
use crate::gateway::artifact_store::{ArtifactManifest, NewArtifact};

#[derive(Debug, Clone)]
pub struct FetchParams {
    /// Artifact reference or http(s) URL of the sample to fetch
    pub sample: String,
    pub artifact_name: String,
    pub artifact_type: String,
    pub artifact_description: String,
    /// Parent of the per-fetch staging directories; never cleared
    pub download_dir: PathBuf,
    /// Directory the republished file is moved to
    pub output_dir: PathBuf,
}

/// Download a sample and republish it under a pipeline-local artifact name.
pub struct FetchUseCase<'a> {
    tracker: &'a mut dyn TrackingPort,
    http: &'a dyn HttpClientPort,
}

impl<'a> FetchUseCase<'a> {
    pub fn new(tracker: &'a mut dyn TrackingPort, http: &'a dyn HttpClientPort) -> Self {
        Self { tracker, http }
    }

    pub fn execute(&mut self, params: &FetchParams) -> Result<ArtifactManifest> {
        info!(sample = %params.sample, "Downloading artifact");
        let target = match self.download_and_move(params) {
            Ok(target) => target,
            Err(e) => {
                error!(error = %e, "Failed to download artifact");
                return Err(e);
            }
        };

        info!(artifact = %params.artifact_name, "Logging artifact");
        let mut artifact = NewArtifact::new(
            &params.artifact_name,
            &params.artifact_type,
            &params.artifact_description,
        );
        artifact.add_file(&target);
        let manifest = self.tracker.log_artifact(&artifact)?;
        info!("Download step finished");
        Ok(manifest)
    }

    fn download_and_move(&mut self, params: &FetchParams) -> Result<PathBuf> {
        // A fresh staging directory per fetch so files from earlier runs are never picked up
        let staging = params
            .download_dir
            .join(format!("fetch-{}", Uuid::new_v4()));
        fs::create_dir_all(&staging)
            .with_context(|| format!("Failed to create {}", staging.display()))?;

        let download_dir = if is_url(&params.sample) {
            self.download_url(&params.sample, &staging)?
        } else {
            self.tracker.download(&params.sample, &staging)?
        };

        let source = first_file(&download_dir)?.ok_or_else(|| {
            PipelineError::FileNotFound(format!(
                "No files found in downloaded artifact: {}",
                params.sample
            ))
        })?;

        fs::create_dir_all(&params.output_dir)?;
        let target = params.output_dir.join(&params.artifact_name);
        move_file(&source, &target)?;
        Ok(target)
    }

    fn download_url(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        let resp = self.http.get(url)?;
        if !(200..300).contains(&resp.status) {
            anyhow::bail!("GET {} returned status {}", url, resp.status);
        }
        let file_name = url
            .split(['?', '#'])
            .next()
            .and_then(|u| u.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("download");
        let path = dest.join(file_name);
        fs::write(&path, &resp.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(url, bytes = resp.bytes.len(), content_type = %resp.content_type, "Downloaded sample");
        Ok(dest.to_path_buf())
    }
}

fn is_url(sample: &str) -> bool {
    sample.starts_with("http://") || sample.starts_with("https://")
}

/// First regular file in `dir` by name.
fn first_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files.into_iter().next())
}

fn move_file(source: &Path, target: &Path) -> Result<()> {
    if fs::rename(source, target).is_err() {
        // rename fails across filesystems
        fs::copy(source, target).with_context(|| {
            format!("Failed to move {} to {}", source.display(), target.display())
        })?;
        fs::remove_file(source)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HttpGetResult;
    use serde_json::Value;
    use tempfile::tempdir;

    /// Tracker whose downloads produce a fixed set of files.
    struct MockTracker {
        files: Vec<(&'static str, &'static str)>,
        logged: Vec<NewArtifact>,
    }

    impl MockTracker {
        fn with_files(files: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                files,
                logged: Vec::new(),
            }
        }
    }

    impl TrackingPort for MockTracker {
        fn download(&mut self, _reference: &str, dest: &Path) -> crate::error::Result<PathBuf> {
            for (name, body) in &self.files {
                fs::write(dest.join(name), body)?;
            }
            Ok(dest.to_path_buf())
        }

        fn file(&mut self, reference: &str) -> crate::error::Result<PathBuf> {
            Err(PipelineError::ArtifactNotFound(reference.to_string()))
        }

        fn log_artifact(&mut self, artifact: &NewArtifact) -> crate::error::Result<ArtifactManifest> {
            self.logged.push(artifact.clone());
            Ok(ArtifactManifest {
                name: artifact.name.clone(),
                version: 0,
                artifact_type: artifact.artifact_type.clone(),
                description: artifact.description.clone(),
                created_at: chrono::Utc::now(),
                run_id: None,
                digest: String::new(),
                entries: Vec::new(),
            })
        }

        fn set_summary(&mut self, _key: &str, _value: Value) {}
    }

    struct MockHttp {
        status: u16,
    }

    impl HttpClientPort for MockHttp {
        fn get(&self, _url: &str) -> crate::error::Result<HttpGetResult> {
            Ok(HttpGetResult {
                status: self.status,
                bytes: b"id,price\n1,100\n".to_vec(),
                content_type: "text/csv".to_string(),
            })
        }
    }

    fn params(work: &Path, sample: &str) -> FetchParams {
        FetchParams {
            sample: sample.to_string(),
            artifact_name: "sample.csv".to_string(),
            artifact_type: "raw_data".to_string(),
            artifact_description: "Raw file as downloaded".to_string(),
            download_dir: work.join("artifact_download"),
            output_dir: work.to_path_buf(),
        }
    }

    #[test]
    fn empty_download_fails_before_upload() {
        let work = tempdir().unwrap();
        let mut tracker = MockTracker::with_files(Vec::new());
        let http = MockHttp { status: 200 };

        let err = FetchUseCase::new(&mut tracker, &http)
            .execute(&params(work.path(), "sample1.csv"))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::FileNotFound(_))
        ));
        assert!(tracker.logged.is_empty());
    }

    #[test]
    fn downloaded_file_is_moved_and_republished() {
        let work = tempdir().unwrap();
        let mut tracker =
            MockTracker::with_files(vec![("b.csv", "second"), ("a.csv", "id,price\n1,100\n")]);
        let http = MockHttp { status: 200 };

        let manifest = FetchUseCase::new(&mut tracker, &http)
            .execute(&params(work.path(), "sample1.csv"))
            .unwrap();

        assert_eq!(manifest.name, "sample.csv");
        let target = work.path().join("sample.csv");
        assert_eq!(fs::read_to_string(&target).unwrap(), "id,price\n1,100\n");
        assert!(!work.path().join("artifact_download").join("a.csv").exists());
        assert_eq!(tracker.logged[0].files, vec![target]);
        assert_eq!(tracker.logged[0].artifact_type, "raw_data");
    }

    #[test]
    fn existing_files_in_download_dir_are_left_alone() {
        let work = tempdir().unwrap();
        let download_dir = work.path().join("artifact_download");
        fs::create_dir_all(&download_dir).unwrap();
        fs::write(download_dir.join("keep.csv"), "mine").unwrap();
        fs::write(work.path().join("notes.txt"), "mine too").unwrap();

        let mut tracker = MockTracker::with_files(vec![("sample1.csv", "id,price\n1,100\n")]);
        let http = MockHttp { status: 200 };
        let mut p = params(work.path(), "sample1.csv");
        p.download_dir = work.path().to_path_buf();
        FetchUseCase::new(&mut tracker, &http).execute(&p).unwrap();

        assert_eq!(fs::read_to_string(download_dir.join("keep.csv")).unwrap(), "mine");
        assert_eq!(fs::read_to_string(work.path().join("notes.txt")).unwrap(), "mine too");
        assert_eq!(
            fs::read_to_string(work.path().join("sample.csv")).unwrap(),
            "id,price\n1,100\n"
        );
    }

    #[test]
    fn url_samples_are_fetched_over_http() {
        let work = tempdir().unwrap();
        let mut tracker = MockTracker::with_files(Vec::new());
        let http = MockHttp { status: 200 };

        FetchUseCase::new(&mut tracker, &http)
            .execute(&params(work.path(), "https://example.com/data/sample1.csv?raw=1"))
            .unwrap();
        assert_eq!(
            fs::read_to_string(work.path().join("sample.csv")).unwrap(),
            "id,price\n1,100\n"
        );
    }

    #[test]
    fn http_error_status_fails() {
        let work = tempdir().unwrap();
        let mut tracker = MockTracker::with_files(Vec::new());
        let http = MockHttp { status: 404 };

        let result = FetchUseCase::new(&mut tracker, &http)
            .execute(&params(work.path(), "https://example.com/missing.csv"));
        assert!(result.is_err());
        assert!(tracker.logged.is_empty());
    }
}
