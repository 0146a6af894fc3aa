//! Implements ArtifactStore on the local filesystem.
//! One file per invocation: {temp_dir}/{uuid}_{sanitized filename}. The uuid keeps concurrent
//! uploads of equally named files apart; sanitizing keeps every file inside `temp_dir`.

use crate::domain::{DomainError, TemporaryArtifact};
use crate::ports::ArtifactStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Longest sanitized filename kept in the temp path.
const MAX_NAME_LEN: usize = 100;

pub struct FsArtifactStore {
    base_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn unique_path(&self, filename: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}_{}", Uuid::new_v4(), sanitize_filename(filename)))
    }
}

/// Keep the last path component and replace anything outside `[A-Za-z0-9._-]`.
fn sanitize_filename(filename: &str) -> String {
    let last = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn acquire(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<TemporaryArtifact, DomainError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| DomainError::Io(format!("create temp dir: {}", e)))?;
        let path = self.unique_path(filename);
        if let Err(e) = fs::write(&path, bytes).await {
            // A partial write may have left a file behind.
            let _ = fs::remove_file(&path).await;
            return Err(DomainError::Io(format!(
                "write {}: {}",
                path.display(),
                e
            )));
        }
        debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(TemporaryArtifact {
            path,
            original_filename: filename.to_string(),
        })
    }

    async fn release(&self, artifact: &TemporaryArtifact) {
        log_removal(&artifact.path, fs::remove_file(&artifact.path).await);
    }

    fn discard(&self, artifact: &TemporaryArtifact) {
        log_removal(&artifact.path, std::fs::remove_file(&artifact.path));
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => debug!(path = %path.display(), "artifact removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove artifact"),
    }
}
