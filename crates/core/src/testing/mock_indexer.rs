//! Mock indexer for testing.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::search::{CandidateResult, Indexer, SearchError};

type ErrorFactory = Box<dyn Fn() -> SearchError + Send + Sync>;

/// Scriptable [`Indexer`]: returns canned results or a manufactured
/// error, and records the query lists it was asked to search.
pub struct MockIndexer {
    name: String,
    results: Vec<CandidateResult>,
    error: Option<ErrorFactory>,
    searches: Mutex<Vec<Vec<String>>>,
}

impl MockIndexer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            results: Vec::new(),
            error: None,
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Return these results from every search.
    pub fn with_results(mut self, results: Vec<CandidateResult>) -> Self {
        self.results = results;
        self
    }

    /// Fail every search with an error built by `factory`.
    pub fn with_error<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> SearchError + Send + Sync + 'static,
    {
        self.error = Some(Box::new(factory));
        self
    }

    /// Query lists recorded so far, one entry per search call.
    pub fn searches(&self) -> Vec<Vec<String>> {
        match self.searches.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        queries: &[String],
        _year: Option<i32>,
    ) -> Result<Vec<CandidateResult>, SearchError> {
        if let Ok(mut guard) = self.searches.lock() {
            guard.push(queries.to_vec());
        }
        match &self.error {
            Some(factory) => Err(factory()),
            None => Ok(self.results.clone()),
        }
    }
}
