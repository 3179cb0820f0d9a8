use std::sync::Arc;

use magnetar_core::catalog::FileCatalog;
use magnetar_core::jobs::JobManager;
use magnetar_core::resolver::LinkResolver;
use magnetar_core::search::MultiSearcher;
use magnetar_core::{Authenticator, Config, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    catalog: Arc<dyn FileCatalog>,
    searcher: Arc<MultiSearcher>,
    resolver: Arc<LinkResolver>,
    /// Client for the descriptor download proxy.
    descriptor_client: reqwest::Client,
    job_manager: Arc<JobManager>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        catalog: Arc<dyn FileCatalog>,
        searcher: Arc<MultiSearcher>,
        resolver: Arc<LinkResolver>,
        descriptor_client: reqwest::Client,
        job_manager: Arc<JobManager>,
    ) -> Self {
        Self {
            config,
            authenticator,
            catalog,
            searcher,
            resolver,
            descriptor_client,
            job_manager,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn catalog(&self) -> &Arc<dyn FileCatalog> {
        &self.catalog
    }

    pub fn searcher(&self) -> &MultiSearcher {
        &self.searcher
    }

    pub fn resolver(&self) -> &LinkResolver {
        &self.resolver
    }

    pub fn descriptor_client(&self) -> &reqwest::Client {
        &self.descriptor_client
    }

    pub fn job_manager(&self) -> &Arc<JobManager> {
        &self.job_manager
    }
}
