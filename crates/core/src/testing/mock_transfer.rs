//! Mock transfer backend for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use crate::transfer::{TransferClient, TransferError, TransferFactory, TransferStatus};

#[derive(Debug)]
struct Inner {
    status: TransferStatus,
    unavailable: bool,
    pause_calls: u32,
    resume_calls: u32,
    stop_calls: u32,
}

/// Scriptable [`TransferClient`].
///
/// Tests drive it by hand: [`set_progress`](Self::set_progress) moves
/// the reported status (reaching 1.0 also resolves a pending `start`),
/// [`set_unavailable`](Self::set_unavailable) makes every later status
/// call fail the way a dead backend would.
#[derive(Debug)]
pub struct MockTransferClient {
    inner: RwLock<Inner>,
    completed: watch::Sender<bool>,
}

impl MockTransferClient {
    pub fn new(total_bytes: u64) -> Self {
        let (completed, _) = watch::channel(false);
        Self {
            inner: RwLock::new(Inner {
                status: TransferStatus {
                    progress: 0.0,
                    total_bytes,
                    downloaded_bytes: 0,
                    download_rate_bps: 0,
                },
                unavailable: false,
                pause_calls: 0,
                resume_calls: 0,
                stop_calls: 0,
            }),
            completed,
        }
    }

    /// Move reported progress (0.0 to 1.0) at the given rate.
    pub async fn set_progress(&self, progress: f64, rate_bps: u64) {
        let mut inner = self.inner.write().await;
        let progress = progress.clamp(0.0, 1.0);
        inner.status.progress = progress;
        inner.status.downloaded_bytes = (inner.status.total_bytes as f64 * progress) as u64;
        inner.status.download_rate_bps = rate_bps;
        if progress >= 1.0 {
            let _ = self.completed.send(true);
        }
    }

    /// Make every later control and status call report a dead backend.
    pub async fn set_unavailable(&self) {
        self.inner.write().await.unavailable = true;
        let _ = self.completed.send(true);
    }

    pub async fn pause_calls(&self) -> u32 {
        self.inner.read().await.pause_calls
    }

    pub async fn resume_calls(&self) -> u32 {
        self.inner.read().await.resume_calls
    }

    pub async fn stop_calls(&self) -> u32 {
        self.inner.read().await.stop_calls
    }
}

#[async_trait]
impl TransferClient for MockTransferClient {
    async fn start(&self) -> Result<(), TransferError> {
        let mut rx = self.completed.subscribe();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
        Ok(())
    }

    async fn pause(&self) -> Result<(), TransferError> {
        let mut inner = self.inner.write().await;
        if inner.unavailable {
            return Err(TransferError::Unavailable);
        }
        inner.pause_calls += 1;
        Ok(())
    }

    async fn resume(&self) -> Result<(), TransferError> {
        let mut inner = self.inner.write().await;
        if inner.unavailable {
            return Err(TransferError::Unavailable);
        }
        inner.resume_calls += 1;
        Ok(())
    }

    async fn stop(&self) -> Result<(), TransferError> {
        let mut inner = self.inner.write().await;
        inner.stop_calls += 1;
        let _ = self.completed.send(true);
        Ok(())
    }

    async fn try_status(&self) -> Result<TransferStatus, TransferError> {
        let inner = self.inner.read().await;
        if inner.unavailable {
            return Err(TransferError::Unavailable);
        }
        Ok(inner.status)
    }
}

/// [`TransferFactory`] handing out pre-built mock clients, keyed by
/// descriptor file name, and recording every create call.
#[derive(Default)]
pub struct MockTransferFactory {
    clients: RwLock<HashMap<String, Arc<MockTransferClient>>>,
    created: RwLock<Vec<(PathBuf, PathBuf)>>,
    fail_next: RwLock<Option<TransferError>>,
}

impl MockTransferFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the client returned for a descriptor file name.
    pub async fn register(&self, filename: &str, client: Arc<MockTransferClient>) {
        self.clients
            .write()
            .await
            .insert(filename.to_string(), client);
    }

    /// Fail the next create call with this error.
    pub async fn fail_next(&self, error: TransferError) {
        *self.fail_next.write().await = Some(error);
    }

    /// Recorded (descriptor_path, work_dir) pairs.
    pub async fn created(&self) -> Vec<(PathBuf, PathBuf)> {
        self.created.read().await.clone()
    }
}

#[async_trait]
impl TransferFactory for MockTransferFactory {
    async fn create(
        &self,
        descriptor_path: &Path,
        work_dir: &Path,
    ) -> Result<Arc<dyn TransferClient>, TransferError> {
        if let Some(error) = self.fail_next.write().await.take() {
            return Err(error);
        }
        self.created
            .write()
            .await
            .push((descriptor_path.to_path_buf(), work_dir.to_path_buf()));

        let filename = descriptor_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let client = self
            .clients
            .read()
            .await
            .get(&filename)
            .cloned()
            .unwrap_or_else(|| Arc::new(MockTransferClient::new(1024)));
        Ok(client)
    }
}
