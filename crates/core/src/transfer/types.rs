//! Types for descriptor transfer operations.
//!
//! The downloader is an opaque component consumed through a narrow,
//! capability-checked interface: status is requested via `try_status`
//! and a transfer that cannot answer reports [`TransferError::Unavailable`],
//! which callers treat as a fault rather than something to retry.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Point-in-time transfer status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferStatus {
    /// Download progress, 0.0 - 1.0.
    pub progress: f64,
    /// Total wanted bytes (0 while metadata is still resolving).
    pub total_bytes: u64,
    /// Downloaded bytes.
    pub downloaded_bytes: u64,
    /// Current download rate in bytes/second.
    pub download_rate_bps: u64,
}

/// Errors from the transfer backend.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The backend can no longer answer status or control calls.
    /// A fault, not a transient condition.
    #[error("Transfer backend unavailable")]
    Unavailable,

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Transfer failed: {0}")]
    Failed(String),
}

/// One in-flight descriptor download.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Run the transfer to completion. Resolves when the payload is
    /// fully downloaded or the transfer fails.
    async fn start(&self) -> Result<(), TransferError>;

    async fn pause(&self) -> Result<(), TransferError>;

    async fn resume(&self) -> Result<(), TransferError>;

    /// Stop and release the transfer. Downloaded data stays on disk.
    async fn stop(&self) -> Result<(), TransferError>;

    /// Current status, if the backend can still provide one.
    async fn try_status(&self) -> Result<TransferStatus, TransferError>;
}

/// Creates transfers for the job manager.
#[async_trait]
pub trait TransferFactory: Send + Sync {
    /// Create a transfer for the descriptor file, downloading into
    /// `work_dir`.
    async fn create(
        &self,
        descriptor_path: &Path,
        work_dir: &Path,
    ) -> Result<Arc<dyn TransferClient>, TransferError>;
}
