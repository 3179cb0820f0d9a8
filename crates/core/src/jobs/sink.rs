//! Payload sink: files completed downloads into the categorized
//! storage tree and records them in the catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::fs;
use tracing::{debug, warn};

use crate::catalog::{FileCatalog, NewFileRecord};
use crate::category::classify;

use super::JobError;

/// What the sink filed, for recording on the job.
#[derive(Debug, Default)]
pub struct SinkOutcome {
    pub moved: usize,
    /// Category of the first filed payload.
    pub first_category: Option<String>,
    /// Stored name of the first filed payload.
    pub first_filename: Option<String>,
}

/// Move every regular file under `work_dir` into its category bucket
/// under `upload_root`, insert one catalog row per file (owned by the
/// descriptor file's owner), and report the first filed payload.
///
/// A vanished owner record skips the affected file and continues; I/O
/// failures abort.
pub async fn file_payloads(
    work_dir: &Path,
    upload_root: &Path,
    owner_file_id: i64,
    catalog: &Arc<dyn FileCatalog>,
) -> Result<SinkOutcome, JobError> {
    let mut files = collect_files(work_dir).await?;
    files.sort();

    let mut outcome = SinkOutcome::default();

    for path in files {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        let owner = match catalog.file(owner_file_id) {
            Ok(record) => record.user_id,
            Err(e) => {
                warn!(
                    file = %file_name,
                    owner_file_id = owner_file_id,
                    error = %e,
                    "Owning descriptor record missing, skipping payload"
                );
                continue;
            }
        };

        let category = classify(&file_name);
        let stored_name = format!("{}_{}", Utc::now().format("%Y%m%d%H%M%S"), file_name);

        let category_dir = upload_root.join(category);
        fs::create_dir_all(&category_dir).await?;
        let dest = category_dir.join(&stored_name);

        move_file(&path, &dest).await?;
        let size_bytes = fs::metadata(&dest).await?.len();

        if let Err(e) = catalog.insert_file(&NewFileRecord {
            stored_name: stored_name.clone(),
            original_name: file_name.clone(),
            category: category.to_string(),
            size_bytes,
            user_id: owner,
        }) {
            warn!(file = %stored_name, error = %e, "Failed to catalog filed payload");
            continue;
        }

        debug!(file = %stored_name, category = category, "Payload filed");

        if outcome.first_category.is_none() {
            outcome.first_category = Some(category.to_string());
            outcome.first_filename = Some(stored_name);
        }
        outcome.moved += 1;
    }

    Ok(outcome)
}

async fn collect_files(root: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }

    Ok(files)
}

/// Rename, falling back to copy+remove for cross-filesystem moves.
async fn move_file(source: &Path, destination: &Path) -> Result<(), std::io::Error> {
    match fs::rename(source, destination).await {
        Ok(()) => Ok(()),
        // Cross-filesystem moves fail with EXDEV (18 on Linux)
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(18) =>
        {
            fs::copy(source, destination).await?;
            fs::remove_file(source).await
        }
        Err(e) => Err(e),
    }
}
