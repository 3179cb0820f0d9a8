//! Common test utilities for E2E testing with mocks.
//!
//! Provides a test fixture that builds the full router in-process with
//! a mock transfer backend and scriptable indexers, so API flows can be
//! exercised without trackers or a real torrent client.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use magnetar_core::catalog::{FileCatalog, NewFileRecord, SqliteCatalog};
use magnetar_core::config::{
    AuthConfig, Config, DatabaseConfig, DownloadConfig, SearchConfig, ServerConfig, StorageConfig,
};
use magnetar_core::jobs::{JobManager, JobManagerConfig};
use magnetar_core::resolver::LinkResolver;
use magnetar_core::search::{Indexer, MultiSearcher};
use magnetar_core::testing::{MockTransferClient, MockTransferFactory};
use magnetar_core::{create_authenticator, AuthMethod, Authenticator};

use magnetar_server::api::create_router;
use magnetar_server::state::AppState;

/// Descriptor file name used by job tests.
pub const DESCRIPTOR: &str = "20250101000000_movie.torrent";

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub struct TestFixture {
    pub router: Router,
    pub catalog: Arc<dyn FileCatalog>,
    pub factory: Arc<MockTransferFactory>,
    pub client: Arc<MockTransferClient>,
    pub upload_root: PathBuf,
    _temp_dir: TempDir,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_indexers(Vec::new()).await
    }

    pub async fn with_indexers(indexers: Vec<Arc<dyn Indexer>>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let upload_root = temp_dir.path().join("storage");
        let download_root = temp_dir.path().join("downloads");
        std::fs::create_dir_all(upload_root.join("torrents")).unwrap();
        std::fs::create_dir_all(&download_root).unwrap();

        let config = Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
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
            Arc::from(create_authenticator(&config.auth).unwrap());
        let catalog: Arc<dyn FileCatalog> = Arc::new(SqliteCatalog::in_memory().unwrap());
        let searcher = Arc::new(MultiSearcher::new(indexers, config.search.trackers.clone()));
        let resolver = Arc::new(LinkResolver::new(Duration::from_secs(1)));

        let client = Arc::new(MockTransferClient::new(1024 * 1024));
        let factory = Arc::new(MockTransferFactory::new());
        factory.register(DESCRIPTOR, Arc::clone(&client)).await;

        let job_manager = Arc::new(JobManager::new(
            Arc::clone(&factory) as _,
            Arc::clone(&catalog),
            JobManagerConfig {
                upload_root: upload_root.clone(),
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
        let router = create_router(state);

        Self {
            router,
            catalog,
            factory,
            client,
            upload_root,
            _temp_dir: temp_dir,
        }
    }

    /// Insert a descriptor record owned by the anonymous identity and
    /// put the matching file on disk.
    pub fn seed_descriptor(&self) -> i64 {
        let record = self
            .catalog
            .insert_file(&NewFileRecord {
                stored_name: DESCRIPTOR.to_string(),
                original_name: "movie.torrent".to_string(),
                category: "torrents".to_string(),
                size_bytes: 512,
                user_id: "anonymous".to_string(),
            })
            .unwrap();
        std::fs::write(
            self.upload_root.join("torrents").join(DESCRIPTOR),
            b"d8:announce0:e",
        )
        .unwrap();
        record.id
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch a path and return the raw body text (for SSE responses).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }
}
