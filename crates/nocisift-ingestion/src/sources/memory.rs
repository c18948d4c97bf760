//! In-memory bioactivity source for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use nocisift_common::BioactivityRecord;

use super::{BioactivitySource, RetrievalError};

/// Canned failure, rebuilt on every call since `RetrievalError` is not `Clone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Network,
    RateLimited,
    Malformed,
}

/// Source serving fixed records per accession. Applies the potency ceiling
/// and limit the way a real service would.
#[derive(Debug, Default)]
pub struct MockBioactivitySource {
    records: HashMap<String, Vec<BioactivityRecord>>,
    failure: Option<MockFailure>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockBioactivitySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record under `accession`.
    pub fn with(mut self, accession: &str, record: BioactivityRecord) -> Self {
        self.records.entry(accession.to_string()).or_default().push(record);
        self
    }

    /// Fail every call.
    pub fn failing(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Sleep before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BioactivitySource for MockBioactivitySource {
    async fn fetch_bioactivities(
        &self,
        accession: &str,
        potency_ceiling_nm: f64,
        limit: usize,
    ) -> Result<Vec<BioactivityRecord>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure {
            Some(MockFailure::Network) => return Err(RetrievalError::Network("connection refused".into())),
            Some(MockFailure::RateLimited) => return Err(RetrievalError::RateLimited),
            Some(MockFailure::Malformed) => return Err(RetrievalError::Malformed("truncated body".into())),
            None => {}
        }

        Ok(self
            .records
            .get(accession)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.potency_nm <= potency_ceiling_nm)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
