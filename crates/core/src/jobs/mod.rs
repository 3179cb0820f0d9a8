//! Download job lifecycle: registry, manager, progress streams and the
//! payload sink that files completed downloads.

pub mod format;
mod manager;
mod progress;
mod registry;
mod sink;
mod types;

pub use manager::{JobManager, JobManagerConfig};
pub use progress::progress_stream;
pub use registry::JobRegistry;
pub use sink::{file_payloads, SinkOutcome};
pub use types::*;
