//! JSON file store for the MechCare dataset.
//!
//! The whole dataset lives in one pretty-printed document. Saves write a
//! sibling temp file and rename it over the target, so readers see either
//! the old document or the new one. There is no locking here; callers
//! serialize access (see [`crate::repository::Repository`]).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::model::Dataset;

/// Handle to the on-disk dataset document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Load the dataset. A missing or blank file is a fresh install and
    /// yields an empty dataset.
    pub async fn load(&self) -> Result<Dataset> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No dataset yet, starting empty");
                return Ok(Dataset::default());
            }
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            debug!(path = %self.path.display(), "Dataset file is empty, starting empty");
            return Ok(Dataset::default());
        }
        Ok(serde_json::from_str(&data)?)
    }

    /// Overwrite the persisted dataset.
    pub async fn save(&self, dataset: &Dataset) -> Result<()> {
        self.ensure_dir().await?;
        let json = serde_json::to_string_pretty(dataset)?;

        let tmp = self.tmp_path();
        {
            let mut f = tokio::fs::File::create(&tmp).await?;
            f.write_all(json.as_bytes()).await?;
            f.sync_all().await?;
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(tmp = %tmp.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(e.into());
        }

        info!(
            path = %self.path.display(),
            machines = dataset.machines.len(),
            logs = dataset.logs.len(),
            "Dataset saved"
        );
        Ok(())
    }

    /// Unique per call, so two stores on the same path never share a temp file.
    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset.json");
        self.path
            .with_file_name(format!(".{name}.tmp.{}", Uuid::new_v4().simple()))
    }
}
