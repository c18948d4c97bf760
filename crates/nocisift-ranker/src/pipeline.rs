//! Candidate search orchestration.
//!
//! One call runs the whole pipeline for one target:
//!
//! 1. Validate the request (target, potency ceiling, limit) before any I/O
//! 2. Fetch bioactivity records, bounded by the configured timeout
//! 3. Deduplicate by compound, keeping the most potent record
//! 4. Compute descriptors; drop compounds whose notation fails to parse
//! 5. Rule of Five and risk score per compound
//! 6. Optional Rule of Five filter
//! 7. Stable sort by unrounded drug score, descending
//!
//! The caller-side drug-score threshold is not applied here.

use std::sync::Arc;
use std::time::Duration;

use nocisift_common::sandbox::DEFAULT_TIMEOUT;
use nocisift_common::{BioactivityRecord, Candidate, InterpreterMode, NocisiftError, Target, TargetCatalog};
use nocisift_ingestion::{BioactivitySource, RetrievalError};
use nocisift_molecules::{evaluate, DescriptorCalculator};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::dedup::dedup_by_compound;
use crate::scorer::RiskScorer;

/// Batch-level search failure: the search returns no candidates.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid `{field}`: {message}")]
    Config { field: &'static str, message: String },

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl SearchError {
    fn config(field: &'static str, message: impl Into<String>) -> Self {
        SearchError::Config { field, message: message.into() }
    }
}

impl From<NocisiftError> for SearchError {
    fn from(err: NocisiftError) -> Self {
        match err {
            NocisiftError::Config { field, message } => SearchError::Config { field, message },
            NocisiftError::UnknownTarget(name) => SearchError::config("target", format!("unknown target '{name}'")),
            other => SearchError::config("search", other.to_string()),
        }
    }
}

/// Accepted ranges for request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub potency_min_nm: f64,
    pub potency_max_nm: f64,
    pub limit_min: usize,
    pub limit_max: usize,
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            potency_min_nm: 10.0,
            potency_max_nm: 10_000.0,
            limit_min: 10,
            limit_max: 500,
        }
    }
}

impl SearchBounds {
    pub fn check(&self, request: &SearchRequest) -> Result<(), SearchError> {
        let p = request.potency_ceiling_nm;
        if !p.is_finite() || p < self.potency_min_nm || p > self.potency_max_nm {
            return Err(SearchError::config(
                "potency_ceiling_nm",
                format!("{p} is outside {}..={} nM", self.potency_min_nm, self.potency_max_nm),
            ));
        }
        if request.limit < self.limit_min || request.limit > self.limit_max {
            return Err(SearchError::config(
                "limit",
                format!("{} is outside {}..={}", request.limit, self.limit_min, self.limit_max),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Display name or accession; resolved through the catalog.
    pub target: String,
    pub potency_ceiling_nm: f64,
    pub limit: usize,
    pub lipinski_only: bool,
}

impl SearchRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            potency_ceiling_nm: 1000.0,
            limit: 100,
            lipinski_only: true,
        }
    }
}

/// A compound left out of the results, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedCompound {
    pub compound_id: String,
    pub reason: String,
}

/// Ranked candidates plus what happened on the way.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub target: Target,
    /// Sorted by drug score, descending.
    pub candidates: Vec<Candidate>,
    /// Raw records returned by the source.
    pub retrieved: usize,
    /// Records collapsed into a more potent measurement of the same compound.
    pub duplicates_collapsed: usize,
    /// Compounds with unusable structure notation.
    pub dropped: Vec<DroppedCompound>,
    /// Candidates removed by the Rule of Five filter.
    pub lipinski_excluded: usize,
    pub mode: InterpreterMode,
}

/// The candidate search orchestrator. Holds no per-search state, so one
/// instance can serve concurrent searches.
pub struct CandidateSearch {
    source: Arc<dyn BioactivitySource>,
    calculator: Arc<DescriptorCalculator>,
    scorer: RiskScorer,
    catalog: TargetCatalog,
    bounds: SearchBounds,
    timeout: Duration,
}

impl CandidateSearch {
    pub fn new(source: Arc<dyn BioactivitySource>, calculator: Arc<DescriptorCalculator>) -> Self {
        Self {
            source,
            calculator,
            scorer: RiskScorer::default(),
            catalog: TargetCatalog::default(),
            bounds: SearchBounds::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_scorer(mut self, scorer: RiskScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_catalog(mut self, catalog: TargetCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_bounds(mut self, bounds: SearchBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Upper bound on the retrieval call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &TargetCatalog {
        &self.catalog
    }

    pub fn calculator(&self) -> &DescriptorCalculator {
        &self.calculator
    }

    #[instrument(skip(self), fields(target = %request.target))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchReport, SearchError> {
        let target = self.catalog.resolve(&request.target)?.clone();
        self.bounds.check(request)?;

        let fetch = self.source.fetch_bioactivities(
            &target.accession,
            request.potency_ceiling_nm,
            request.limit,
        );
        let records = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                warn!(accession = %target.accession, error = %e, "Bioactivity retrieval failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(accession = %target.accession, timeout = ?self.timeout, "Bioactivity retrieval timed out");
                return Err(RetrievalError::Timeout(self.timeout).into());
            }
        };
        let retrieved = records.len();

        let unique = dedup_by_compound(records);
        let mut candidates = Vec::with_capacity(unique.records.len());
        let mut dropped = Vec::new();
        for record in &unique.records {
            match self.assess(record, &target.name) {
                Ok(candidate) => candidates.push(candidate),
                Err(d) => dropped.push(d),
            }
        }

        let before_filter = candidates.len();
        if request.lipinski_only {
            candidates.retain(|c| c.lipinski.pass);
        }
        let lipinski_excluded = before_filter - candidates.len();

        // sort_by is stable: equal scores keep dedup order
        candidates.sort_by(|a, b| b.drug_score.total_cmp(&a.drug_score));

        info!(
            accession = %target.accession,
            retrieved,
            collapsed = unique.collapsed,
            dropped = dropped.len(),
            lipinski_excluded,
            returned = candidates.len(),
            "Candidate search complete"
        );

        Ok(SearchReport {
            target,
            candidates,
            retrieved,
            duplicates_collapsed: unique.collapsed,
            dropped,
            lipinski_excluded,
            mode: self.calculator.mode(),
        })
    }

    /// Descriptors, Rule of Five and risk for one record.
    pub fn assess(&self, record: &BioactivityRecord, target_name: &str) -> Result<Candidate, DroppedCompound> {
        let drop = |reason: String| {
            debug!(compound = %record.compound_id, %reason, "Dropping compound");
            DroppedCompound { compound_id: record.compound_id.clone(), reason }
        };

        let descriptors = self
            .calculator
            .compute(&record.smiles)
            .map_err(|e| drop(e.reason))?;
        let risk_score = self.scorer.score(&descriptors).map_err(|e| drop(e.to_string()))?;
        let lipinski = evaluate(&descriptors);

        Ok(Candidate {
            compound_id: record.compound_id.clone(),
            target: target_name.to_string(),
            smiles: record.smiles.clone(),
            potency_nm: record.potency_nm,
            descriptors,
            lipinski,
            risk_score,
            drug_score: 1.0 - risk_score,
        })
    }
}

impl std::fmt::Debug for CandidateSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateSearch")
            .field("calculator", &self.calculator)
            .field("bounds", &self.bounds)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_reject_out_of_range() {
        let bounds = SearchBounds::default();
        let mut req = SearchRequest::new("TRPV1");
        assert!(bounds.check(&req).is_ok());

        req.potency_ceiling_nm = 5.0;
        assert!(matches!(bounds.check(&req), Err(SearchError::Config { field: "potency_ceiling_nm", .. })));

        req.potency_ceiling_nm = f64::NAN;
        assert!(bounds.check(&req).is_err());

        req.potency_ceiling_nm = 1000.0;
        req.limit = 501;
        assert!(matches!(bounds.check(&req), Err(SearchError::Config { field: "limit", .. })));
    }

    #[test]
    fn test_unknown_target_maps_to_config_error() {
        let err: SearchError = NocisiftError::UnknownTarget("Mu-opioid".into()).into();
        assert!(matches!(err, SearchError::Config { field: "target", .. }));
        assert!(err.to_string().contains("Mu-opioid"));
    }
}
