//! Bioactivity source clients.

pub mod chembl;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use nocisift_common::{BioactivityRecord, NocisiftError};

/// Batch-level retrieval failure. A search that hits one of these returns no
/// candidates and reports the cause.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("rate limited by upstream service")]
    RateLimited,

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("request blocked: {0}")]
    Blocked(String),
}

impl From<NocisiftError> for RetrievalError {
    fn from(err: NocisiftError) -> Self {
        match err {
            NocisiftError::Security(msg) => RetrievalError::Blocked(msg),
            other => RetrievalError::Network(other.to_string()),
        }
    }
}

/// Common interface for bioactivity databases.
#[async_trait]
pub trait BioactivitySource: Send + Sync {
    /// Records for `accession` with potency at or below `potency_ceiling_nm`,
    /// at most `limit` of them. Order follows the upstream service.
    async fn fetch_bioactivities(
        &self,
        accession: &str,
        potency_ceiling_nm: f64,
        limit: usize,
    ) -> Result<Vec<BioactivityRecord>, RetrievalError>;
}
