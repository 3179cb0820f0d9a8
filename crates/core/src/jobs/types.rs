//! Download job records and snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::transfer::TransferError;

pub type JobId = String;

/// Lifecycle state of a download job. Paused is not a state: it is an
/// orthogonal flag, so a paused job keeps counting as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Downloading,
    Completed,
    Error,
    Stopped,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Downloading => "downloading",
            JobState::Completed => "completed",
            JobState::Error => "error",
            JobState::Stopped => "stopped",
        }
    }

    /// Terminal states are never left.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Downloading)
    }
}

/// A download job record. Shared behind `Arc<RwLock<_>>`; readers take
/// copy-on-read snapshots instead of holding the lock.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub id: JobId,
    /// Catalog id of the descriptor file this job downloads.
    pub file_id: i64,
    /// Owner, from the descriptor file record.
    pub user_id: String,
    pub state: JobState,
    pub paused: bool,
    /// 0.0 - 100.0, one decimal.
    pub progress_percent: f64,
    /// KB/s, one decimal.
    pub download_speed_kbps: f64,
    /// "H:MM:SS" when a rate is known.
    pub eta: Option<String>,
    /// Human-readable downloaded amount ("1.50 KB").
    pub downloaded: String,
    /// Human-readable total size.
    pub total_size: String,
    pub error: Option<String>,
    /// Category of the first filed payload, set on completion.
    pub target_category: Option<String>,
    /// Stored name of the first filed payload.
    pub target_filename: Option<String>,
    pub work_dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl DownloadJob {
    pub fn new(id: JobId, file_id: i64, user_id: String, work_dir: PathBuf) -> Self {
        Self {
            id,
            file_id,
            user_id,
            state: JobState::Downloading,
            paused: false,
            progress_percent: 0.0,
            download_speed_kbps: 0.0,
            eta: None,
            downloaded: "0 B".to_string(),
            total_size: "0 B".to_string(),
            error: None,
            target_category: None,
            target_filename: None,
            work_dir,
            started_at: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            status: self.state.as_str().to_string(),
            progress: self.progress_percent,
            download_speed: self.download_speed_kbps,
            eta: self.eta.clone().unwrap_or_else(|| "--:--:--".to_string()),
            downloaded: self.downloaded.clone(),
            total_size: self.total_size.clone(),
            target_category: self.target_category.clone(),
            error: self.error.clone(),
        }
    }
}

/// Copy-on-read progress view pushed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub status: String,
    pub progress: f64,
    pub download_speed: f64,
    pub eta: String,
    pub downloaded: String,
    pub total_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressSnapshot {
    /// Synthetic error snapshot for streams that cannot resolve a job.
    pub fn stream_error(message: &str) -> Self {
        Self {
            status: "error".to_string(),
            progress: 0.0,
            download_speed: 0.0,
            eta: "--:--:--".to_string(),
            downloaded: "0 B".to_string(),
            total_size: "0 B".to_string(),
            target_category: None,
            error: Some(message.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != "downloading"
    }
}

/// Errors for job operations. Ownership failures map to `NotFound` so
/// responses never reveal other users' resources.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Download not found")]
    NotFound,

    #[error("Descriptor file not found on disk: {0}")]
    DescriptorMissing(String),

    #[error("A download for this file is already active")]
    AlreadyActive,

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_as_str() {
        assert_eq!(JobState::Downloading.as_str(), "downloading");
        assert_eq!(JobState::Completed.as_str(), "completed");
        assert_eq!(JobState::Error.as_str(), "error");
        assert_eq!(JobState::Stopped.as_str(), "stopped");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Downloading.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Error.is_terminal());
        assert!(JobState::Stopped.is_terminal());
    }

    #[test]
    fn test_new_job_snapshot() {
        let job = DownloadJob::new("j1".to_string(), 7, "alice".to_string(), PathBuf::new());
        let snap = job.snapshot();
        assert_eq!(snap.status, "downloading");
        assert_eq!(snap.progress, 0.0);
        assert_eq!(snap.eta, "--:--:--");
        assert!(!snap.is_terminal());
    }

    #[test]
    fn test_snapshot_serialization_skips_absent_fields() {
        let job = DownloadJob::new("j1".to_string(), 7, "alice".to_string(), PathBuf::new());
        let json = serde_json::to_string(&job.snapshot()).unwrap();
        assert!(!json.contains("target_category"));
        assert!(!json.contains("error"));
    }
}
