//! librqbit-backed transfer implementation.
//!
//! One embedded session per job, rooted at the job's work directory.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use librqbit::{
    AddTorrent as RqbitAddTorrent, AddTorrentResponse, ManagedTorrent, Session, SessionOptions,
    TorrentStatsState,
};
use tracing::{debug, info};

use super::{TransferClient, TransferError, TransferFactory, TransferStatus};

pub struct LibrqbitTransfer {
    session: Arc<Session>,
    handle: Arc<ManagedTorrent>,
}

#[async_trait]
impl TransferClient for LibrqbitTransfer {
    async fn start(&self) -> Result<(), TransferError> {
        self.handle
            .wait_until_completed()
            .await
            .map_err(|e| TransferError::Failed(e.to_string()))
    }

    async fn pause(&self) -> Result<(), TransferError> {
        self.session
            .pause(&self.handle)
            .await
            .map_err(|e| TransferError::Failed(e.to_string()))
    }

    async fn resume(&self) -> Result<(), TransferError> {
        self.session
            .unpause(&self.handle)
            .await
            .map_err(|e| TransferError::Failed(e.to_string()))
    }

    async fn stop(&self) -> Result<(), TransferError> {
        let id = self.handle.id();
        self.session
            .delete(id.into(), false)
            .await
            .map_err(|e| TransferError::Failed(e.to_string()))?;
        debug!(id = id, "Transfer stopped");
        Ok(())
    }

    async fn try_status(&self) -> Result<TransferStatus, TransferError> {
        let stats = self.handle.stats();

        if let TorrentStatsState::Error = stats.state {
            return Err(TransferError::Unavailable);
        }

        let progress = if stats.total_bytes > 0 {
            stats.progress_bytes as f64 / stats.total_bytes as f64
        } else {
            0.0
        };

        // librqbit stores MiB/s despite the field name "mbps"
        let download_rate_bps = stats
            .live
            .as_ref()
            .map(|live| (live.download_speed.mbps * 1024.0 * 1024.0) as u64)
            .unwrap_or(0);

        Ok(TransferStatus {
            progress,
            total_bytes: stats.total_bytes,
            downloaded_bytes: stats.progress_bytes,
            download_rate_bps,
        })
    }
}

/// Creates one librqbit session per transfer.
pub struct LibrqbitFactory;

impl LibrqbitFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LibrqbitFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferFactory for LibrqbitFactory {
    async fn create(
        &self,
        descriptor_path: &Path,
        work_dir: &Path,
    ) -> Result<Arc<dyn TransferClient>, TransferError> {
        let data = tokio::fs::read(descriptor_path)
            .await
            .map_err(|e| TransferError::InvalidDescriptor(e.to_string()))?;

        info!(
            descriptor = %descriptor_path.display(),
            work_dir = %work_dir.display(),
            "Initializing librqbit session"
        );

        let session = Session::new_with_opts(work_dir.to_path_buf(), SessionOptions::default())
            .await
            .map_err(|e| TransferError::Failed(format!("Failed to initialize session: {e}")))?;

        let response = session
            .add_torrent(RqbitAddTorrent::from_bytes(data), None)
            .await
            .map_err(|e| TransferError::InvalidDescriptor(e.to_string()))?;

        let handle = match response {
            AddTorrentResponse::Added(_, handle)
            | AddTorrentResponse::AlreadyManaged(_, handle) => handle,
            AddTorrentResponse::ListOnly(_) => {
                return Err(TransferError::Failed(
                    "Torrent was added in list-only mode".to_string(),
                ));
            }
        };

        Ok(Arc::new(LibrqbitTransfer { session, handle }))
    }
}
