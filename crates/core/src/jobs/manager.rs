//! Job manager: creates download jobs and drives them to a terminal
//! state with a driver/poller task pair per job.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::catalog::FileCatalog;
use crate::transfer::{TransferClient, TransferError, TransferFactory};

use super::format::{eta_for, format_size};
use super::registry::JobRegistry;
use super::sink::file_payloads;
use super::{DownloadJob, JobError, JobId, JobState};

#[derive(Debug, Clone)]
pub struct JobManagerConfig {
    /// Root of the categorized storage tree (descriptor source and
    /// payload destination).
    pub upload_root: PathBuf,
    /// Root for per-job work directories.
    pub download_root: PathBuf,
    /// Status poll cadence.
    pub poll_interval: Duration,
    /// Message reported when the transfer backend becomes unavailable
    /// mid-download. Other transfer errors pass through verbatim.
    pub unavailable_message: String,
}

type TransferMap = Arc<RwLock<HashMap<JobId, Arc<dyn TransferClient>>>>;

pub struct JobManager {
    registry: Arc<JobRegistry>,
    transfers: TransferMap,
    factory: Arc<dyn TransferFactory>,
    catalog: Arc<dyn FileCatalog>,
    config: JobManagerConfig,
}

impl JobManager {
    pub fn new(
        factory: Arc<dyn TransferFactory>,
        catalog: Arc<dyn FileCatalog>,
        config: JobManagerConfig,
    ) -> Self {
        Self {
            registry: Arc::new(JobRegistry::new()),
            transfers: Arc::new(RwLock::new(HashMap::new())),
            factory,
            catalog,
            config,
        }
    }

    pub fn registry(&self) -> Arc<JobRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn catalog(&self) -> Arc<dyn FileCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Start a download job for a stored descriptor file.
    ///
    /// The descriptor must exist in the catalog, belong to the caller
    /// and be present on disk; ownership failures surface as
    /// [`JobError::NotFound`].
    pub async fn create_job(
        &self,
        user_id: &str,
        category: &str,
        filename: &str,
        file_id: i64,
    ) -> Result<JobId, JobError> {
        let record = self.catalog.file(file_id).map_err(|_| JobError::NotFound)?;
        if record.user_id != user_id {
            return Err(JobError::NotFound);
        }

        let descriptor_path = self.config.upload_root.join(category).join(filename);
        if !descriptor_path.exists() {
            return Err(JobError::DescriptorMissing(
                descriptor_path.display().to_string(),
            ));
        }

        let job_id = Uuid::new_v4().to_string();
        let work_dir = self
            .config
            .download_root
            .join("torrents")
            .join(&job_id);
        tokio::fs::create_dir_all(&work_dir).await?;

        let transfer = self.factory.create(&descriptor_path, &work_dir).await?;

        let job = DownloadJob::new(
            job_id.clone(),
            file_id,
            record.user_id.clone(),
            work_dir,
        );
        let shared = self.registry.insert(job).await?;
        self.transfers
            .write()
            .await
            .insert(job_id.clone(), Arc::clone(&transfer));

        info!(job_id = %job_id, file_id = file_id, "Download job started");

        // Driver: runs the transfer to completion. The poller owns all
        // progress bookkeeping; the driver only surfaces start failures.
        {
            let job = Arc::clone(&shared);
            let transfer = Arc::clone(&transfer);
            tokio::spawn(async move {
                if let Err(e) = transfer.start().await {
                    let mut guard = job.write().await;
                    if !guard.state.is_terminal() {
                        error!(job_id = %guard.id, error = %e, "Transfer failed");
                        guard.state = JobState::Error;
                        guard.error = Some(e.to_string());
                    }
                }
            });
        }

        // Poller: periodic status updates until terminal.
        {
            let job = Arc::clone(&shared);
            let transfers = Arc::clone(&self.transfers);
            let catalog = Arc::clone(&self.catalog);
            let config = self.config.clone();
            let job_id = job_id.clone();
            tokio::spawn(async move {
                poll_transfer(Arc::clone(&job), transfer, catalog, &config).await;
                transfers.write().await.remove(&job_id);
            });
        }

        Ok(job_id)
    }

    pub async fn pause(&self, user_id: &str, file_id: i64) -> Result<(), JobError> {
        let (job, transfer) = self.active_job(user_id, file_id).await?;
        transfer.pause().await?;
        job.write().await.paused = true;
        debug!(file_id = file_id, "Download paused");
        Ok(())
    }

    pub async fn resume(&self, user_id: &str, file_id: i64) -> Result<(), JobError> {
        let (job, transfer) = self.active_job(user_id, file_id).await?;
        transfer.resume().await?;
        job.write().await.paused = false;
        debug!(file_id = file_id, "Download resumed");
        Ok(())
    }

    /// Stop the active download for a file. Best-effort: the job is
    /// marked Stopped even if the transfer refuses the signal.
    pub async fn stop(&self, user_id: &str, file_id: i64) -> Result<(), JobError> {
        let (job, transfer) = self.active_job(user_id, file_id).await?;
        if let Err(e) = transfer.stop().await {
            warn!(file_id = file_id, error = %e, "Transfer stop failed");
        }
        {
            let mut guard = job.write().await;
            if !guard.state.is_terminal() {
                guard.state = JobState::Stopped;
                guard.paused = false;
            }
        }
        info!(file_id = file_id, "Download stopped");
        Ok(())
    }

    /// Resolve the active job for a file with the caller's ownership
    /// verified against the catalog record.
    async fn active_job(
        &self,
        user_id: &str,
        file_id: i64,
    ) -> Result<(Arc<RwLock<DownloadJob>>, Arc<dyn TransferClient>), JobError> {
        let job = self
            .registry
            .find_active_by_file(file_id)
            .await
            .ok_or(JobError::NotFound)?;

        let record = self.catalog.file(file_id).map_err(|_| JobError::NotFound)?;
        if record.user_id != user_id {
            return Err(JobError::NotFound);
        }

        let job_id = job.read().await.id.clone();
        let transfer = self
            .transfers
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or(JobError::NotFound)?;

        Ok((job, transfer))
    }
}

/// Poll the transfer until the job reaches a terminal state. Completion
/// runs the payload sink exactly once before marking Completed.
async fn poll_transfer(
    job: Arc<RwLock<DownloadJob>>,
    transfer: Arc<dyn TransferClient>,
    catalog: Arc<dyn FileCatalog>,
    config: &JobManagerConfig,
) {
    loop {
        tokio::time::sleep(config.poll_interval).await;

        let (paused, terminal) = {
            let guard = job.read().await;
            (guard.paused, guard.state.is_terminal())
        };
        if terminal {
            return;
        }
        if paused {
            continue;
        }

        let status = match transfer.try_status().await {
            Ok(status) => status,
            Err(e) => {
                let message = match e {
                    TransferError::Unavailable => config.unavailable_message.clone(),
                    other => other.to_string(),
                };
                let mut guard = job.write().await;
                if !guard.state.is_terminal() {
                    error!(job_id = %guard.id, error = %message, "Transfer status lost");
                    guard.state = JobState::Error;
                    guard.error = Some(message);
                }
                return;
            }
        };

        let finished = {
            let mut guard = job.write().await;
            if guard.state.is_terminal() {
                return;
            }
            guard.progress_percent = (status.progress * 1000.0).round() / 10.0;
            guard.download_speed_kbps =
                (status.download_rate_bps as f64 / 1024.0 * 10.0).round() / 10.0;
            guard.downloaded = format_size(status.downloaded_bytes);
            guard.total_size = format_size(status.total_bytes);
            guard.eta = eta_for(
                status.total_bytes.saturating_sub(status.downloaded_bytes),
                status.download_rate_bps,
            );
            guard.progress_percent >= 100.0
        };

        if finished {
            let (work_dir, file_id) = {
                let guard = job.read().await;
                (guard.work_dir.clone(), guard.file_id)
            };

            match file_payloads(&work_dir, &config.upload_root, file_id, &catalog).await {
                Ok(outcome) => {
                    let mut guard = job.write().await;
                    if guard.state.is_terminal() {
                        return;
                    }
                    guard.target_category = outcome.first_category;
                    guard.target_filename = outcome.first_filename;
                    guard.state = JobState::Completed;
                    info!(job_id = %guard.id, moved = outcome.moved, "Download completed");
                }
                Err(e) => {
                    let mut guard = job.write().await;
                    if !guard.state.is_terminal() {
                        error!(job_id = %guard.id, error = %e, "Payload filing failed");
                        guard.state = JobState::Error;
                        guard.error = Some(e.to_string());
                    }
                }
            }
            return;
        }
    }
}
