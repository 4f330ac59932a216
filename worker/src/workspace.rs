use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::PipelineError;

/// Allocates and tears down the per-job local directory tree (§2, §3):
/// `<tmp>/<video_id>/{raw,transcoded,segments}/`. Exclusively owned by the
/// workflow for its lifetime; deleted unconditionally by Finalize, success
/// or failure (§3, §4.8, §9). Carried verbatim through every typed stage
/// payload so downstream stages never re-derive it from `Config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub root: PathBuf,
    pub transcoded_dir: PathBuf,
    pub segments_dir: PathBuf,
}

impl Workspace {
    /// Creates `<tmp_dir>/<video_id>/{transcoded,segments}/` on local disk.
    pub async fn allocate(tmp_dir: &Path, video_id: Uuid) -> Result<Self, PipelineError> {
        let root = tmp_dir.join(video_id.to_string());
        let transcoded_dir = root.join("transcoded");
        let segments_dir = root.join("segments");

        tokio::fs::create_dir_all(&transcoded_dir).await?;
        tokio::fs::create_dir_all(&segments_dir).await?;

        debug!(video_id = %video_id, root = %root.display(), "allocated workspace");

        Ok(Self {
            root,
            transcoded_dir,
            segments_dir,
        })
    }

    /// Path for the raw source file, preserving the original extension.
    pub fn raw_path(&self, extension: &str) -> PathBuf {
        self.root.join(format!("raw.{extension}"))
    }

    /// Path for one quality's segment subdirectory.
    pub fn segments_dir_for(&self, quality: &str) -> PathBuf {
        self.segments_dir.join(quality)
    }

    /// Path for one quality's transcoded rendition.
    pub fn transcoded_path_for(&self, quality: &str) -> PathBuf {
        self.transcoded_dir.join(format!("{quality}.mp4"))
    }

    /// Recursively deletes the workspace root. Failure here is logged but
    /// never fails the workflow (§4.8): the video is already processed, or
    /// already marked failed, by the time this runs.
    pub async fn teardown(&self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.root).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(root = %self.root.display(), error = %e, "failed to clean up workspace");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn allocate_creates_transcoded_and_segments_dirs() {
        let tmp = tempdir().unwrap();
        let video_id = Uuid::new_v4();
        let workspace = Workspace::allocate(tmp.path(), video_id).await.unwrap();

        assert!(workspace.transcoded_dir.is_dir());
        assert!(workspace.segments_dir.is_dir());
        assert_eq!(workspace.root, tmp.path().join(video_id.to_string()));
    }

    #[tokio::test]
    async fn teardown_removes_workspace_root() {
        let tmp = tempdir().unwrap();
        let video_id = Uuid::new_v4();
        let workspace = Workspace::allocate(tmp.path(), video_id).await.unwrap();

        workspace.teardown().await;
        assert!(!workspace.root.exists());
    }

    #[tokio::test]
    async fn teardown_is_idempotent_when_already_removed() {
        let tmp = tempdir().unwrap();
        let video_id = Uuid::new_v4();
        let workspace = Workspace::allocate(tmp.path(), video_id).await.unwrap();

        workspace.teardown().await;
        workspace.teardown().await;
    }

    #[test]
    fn path_helpers_derive_expected_layout() {
        let workspace = Workspace {
            root: PathBuf::from("/tmp/abc"),
            transcoded_dir: PathBuf::from("/tmp/abc/transcoded"),
            segments_dir: PathBuf::from("/tmp/abc/segments"),
        };

        assert_eq!(workspace.raw_path("mp4"), PathBuf::from("/tmp/abc/raw.mp4"));
        assert_eq!(
            workspace.segments_dir_for("720p"),
            PathBuf::from("/tmp/abc/segments/720p")
        );
        assert_eq!(
            workspace.transcoded_path_for("720p"),
            PathBuf::from("/tmp/abc/transcoded/720p.mp4")
        );
    }
}
