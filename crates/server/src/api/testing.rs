//! Shared test helpers for API handler tests.

use std::sync::Arc;
use std::time::Duration;

use magnetar_core::catalog::{FileCatalog, SqliteCatalog};
use magnetar_core::config::{
    AuthConfig, Config, DatabaseConfig, DownloadConfig, SearchConfig, ServerConfig, StorageConfig,
};
use magnetar_core::jobs::{JobManager, JobManagerConfig};
use magnetar_core::resolver::LinkResolver;
use magnetar_core::search::{Indexer, MultiSearcher};
use magnetar_core::testing::MockTransferFactory;
use magnetar_core::{create_authenticator, Authenticator};

use crate::state::AppState;

pub struct TestHarness {
    pub state: Arc<AppState>,
    pub catalog: Arc<dyn FileCatalog>,
    pub factory: Arc<MockTransferFactory>,
    /// Kept alive for the duration of the test.
    pub storage: tempfile::TempDir,
}

pub fn test_harness(auth: AuthConfig, indexers: Vec<Arc<dyn Indexer>>) -> TestHarness {
    let storage = tempfile::tempdir().expect("Failed to create temp storage");
    let upload_root = storage.path().join("storage");
    let download_root = storage.path().join("downloads");
    std::fs::create_dir_all(&upload_root).unwrap();
    std::fs::create_dir_all(&download_root).unwrap();

    let config = Config {
        auth,
        server: ServerConfig::default(),
        database: DatabaseConfig::default(),
        storage: StorageConfig {
            upload_root: upload_root.clone(),
            download_root: download_root.clone(),
        },
        search: SearchConfig::default(),
        download: DownloadConfig {
            poll_interval_ms: 20,
            stream_interval_ms: 20,
            ..DownloadConfig::default()
        },
    };

    let authenticator: Arc<dyn Authenticator> =
        Arc::from(create_authenticator(&config.auth).expect("Failed to create authenticator"));
    let catalog: Arc<dyn FileCatalog> =
        Arc::new(SqliteCatalog::in_memory().expect("Failed to create catalog"));
    let searcher = Arc::new(MultiSearcher::new(indexers, config.search.trackers.clone()));
    let resolver = Arc::new(LinkResolver::new(Duration::from_secs(1)));
    let factory = Arc::new(MockTransferFactory::new());

    let job_manager = Arc::new(JobManager::new(
        Arc::clone(&factory) as _,
        Arc::clone(&catalog),
        JobManagerConfig {
            upload_root,
            download_root,
            poll_interval: Duration::from_millis(config.download.poll_interval_ms),
            unavailable_message: config.download.unavailable_message.clone(),
        },
    ));

    let state = Arc::new(AppState::new(
        config,
        authenticator,
        Arc::clone(&catalog),
        searcher,
        resolver,
        reqwest::Client::new(),
        job_manager,
    ));

    TestHarness {
        state,
        catalog,
        factory,
        storage,
    }
}

pub fn test_state(auth: AuthConfig) -> Arc<AppState> {
    let harness = test_harness(auth, Vec::new());
    // Tests that only need the state keep the temp dir alive by leaking it
    std::mem::forget(harness.storage);
    harness.state
}
