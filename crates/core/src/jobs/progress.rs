//! Push-style progress streams.
//!
//! A stream emits a snapshot whenever the job's progress percentage
//! changes, then one final terminal snapshot, then closes. A job that
//! cannot be resolved (unknown id, or not owned by the caller) yields a
//! single error snapshot; the message never distinguishes the two
//! cases.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::RwLock;

use crate::catalog::FileCatalog;

use super::registry::JobRegistry;
use super::{DownloadJob, ProgressSnapshot};

enum StreamState {
    /// One synthetic snapshot, then end.
    Failed(Option<ProgressSnapshot>),
    Watching {
        job: Arc<RwLock<DownloadJob>>,
        last_progress: Option<f64>,
        done: bool,
    },
}

pub async fn progress_stream(
    registry: Arc<JobRegistry>,
    catalog: Arc<dyn FileCatalog>,
    job_id: &str,
    user_id: &str,
    interval: Duration,
) -> impl Stream<Item = ProgressSnapshot> + Send {
    let failed = || StreamState::Failed(Some(ProgressSnapshot::stream_error("Download not found")));

    let state = match registry.get(job_id).await {
        None => failed(),
        Some(job) => {
            let file_id = job.read().await.file_id;
            match catalog.file(file_id) {
                Ok(record) if record.user_id == user_id => StreamState::Watching {
                    job,
                    last_progress: None,
                    done: false,
                },
                _ => failed(),
            }
        }
    };

    futures::stream::unfold(state, move |state| async move {
        match state {
            StreamState::Failed(mut snapshot) => snapshot
                .take()
                .map(|s| (s, StreamState::Failed(None))),
            StreamState::Watching {
                job,
                mut last_progress,
                done,
            } => {
                if done {
                    return None;
                }
                loop {
                    let snapshot = job.read().await.snapshot();
                    if snapshot.is_terminal() {
                        return Some((
                            snapshot,
                            StreamState::Watching {
                                job,
                                last_progress,
                                done: true,
                            },
                        ));
                    }
                    if last_progress != Some(snapshot.progress) {
                        last_progress = Some(snapshot.progress);
                        return Some((
                            snapshot,
                            StreamState::Watching {
                                job,
                                last_progress,
                                done: false,
                            },
                        ));
                    }
                    tokio::time::sleep(interval).await;
                }
            }
        }
    })
}
