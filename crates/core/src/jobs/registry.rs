//! In-memory job registry.
//!
//! Jobs stay registered for the process lifetime; terminal records keep
//! serving their final snapshot to late progress subscribers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{DownloadJob, JobError, JobId, ProgressSnapshot};

type SharedJob = Arc<RwLock<DownloadJob>>;

#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, SharedJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job. At most one non-terminal job may exist per
    /// owning file id; a second registration is rejected up front
    /// instead of surfacing as undefined behavior mid-download.
    pub async fn insert(&self, job: DownloadJob) -> Result<SharedJob, JobError> {
        let mut jobs = self.jobs.write().await;

        for existing in jobs.values() {
            let existing = existing.read().await;
            if existing.file_id == job.file_id && !existing.state.is_terminal() {
                return Err(JobError::AlreadyActive);
            }
        }

        let id = job.id.clone();
        let shared = Arc::new(RwLock::new(job));
        jobs.insert(id, Arc::clone(&shared));
        Ok(shared)
    }

    pub async fn get(&self, id: &str) -> Option<SharedJob> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Find the non-terminal job downloading the given file, if any.
    pub async fn find_active_by_file(&self, file_id: i64) -> Option<SharedJob> {
        let jobs = self.jobs.read().await;
        for job in jobs.values() {
            let guard = job.read().await;
            if guard.file_id == file_id && !guard.state.is_terminal() {
                return Some(Arc::clone(job));
            }
        }
        None
    }

    /// Copy-on-read snapshot of a job's progress.
    pub async fn snapshot(&self, id: &str) -> Option<ProgressSnapshot> {
        let job = self.get(id).await?;
        let guard = job.read().await;
        Some(guard.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobState;
    use std::path::PathBuf;

    fn job(id: &str, file_id: i64) -> DownloadJob {
        DownloadJob::new(id.to_string(), file_id, "alice".to_string(), PathBuf::new())
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = JobRegistry::new();
        registry.insert(job("j1", 7)).await.unwrap();

        assert!(registry.get("j1").await.is_some());
        assert!(registry.get("j2").await.is_none());
    }

    #[tokio::test]
    async fn test_second_active_job_for_same_file_rejected() {
        let registry = JobRegistry::new();
        registry.insert(job("j1", 7)).await.unwrap();

        let result = registry.insert(job("j2", 7)).await;
        assert!(matches!(result, Err(JobError::AlreadyActive)));

        // Different file is fine
        assert!(registry.insert(job("j3", 8)).await.is_ok());
    }

    #[tokio::test]
    async fn test_terminal_job_frees_the_file() {
        let registry = JobRegistry::new();
        let shared = registry.insert(job("j1", 7)).await.unwrap();
        shared.write().await.state = JobState::Stopped;

        assert!(registry.insert(job("j2", 7)).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_active_by_file_skips_terminal() {
        let registry = JobRegistry::new();
        let shared = registry.insert(job("j1", 7)).await.unwrap();

        assert!(registry.find_active_by_file(7).await.is_some());

        shared.write().await.state = JobState::Completed;
        assert!(registry.find_active_by_file(7).await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let registry = JobRegistry::new();
        let shared = registry.insert(job("j1", 7)).await.unwrap();

        let snap = registry.snapshot("j1").await.unwrap();
        shared.write().await.progress_percent = 50.0;

        assert_eq!(snap.progress, 0.0);
        let snap2 = registry.snapshot("j1").await.unwrap();
        assert_eq!(snap2.progress, 50.0);
    }
}
