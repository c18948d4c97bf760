//! End-to-end candidate search against an in-memory bioactivity source.
//!
//! ```bash
//! cargo test --package nocisift-ranker --test test_candidate_search
//! ```

use std::sync::Arc;
use std::time::Duration;

use nocisift_common::{BioactivityRecord, InterpreterMode};
use nocisift_common::entities::AssayMetadata;
use nocisift_ingestion::{MockBioactivitySource, MockFailure, RetrievalError};
use nocisift_molecules::DescriptorCalculator;
use nocisift_ranker::{read_candidates, write_candidates, CandidateSearch, SearchError, SearchRequest};

const TRPV1: &str = "CHEMBL4794";
const ACETAMINOPHEN: &str = "CC(=O)Nc1ccc(O)cc1";
const IBUPROFEN: &str = "CC(C)Cc1ccc(cc1)C(C)C(=O)O";

fn greasy() -> String {
    format!("c1ccccc1{}c1ccccc1", "C".repeat(30))
}

fn record(id: &str, smiles: &str, potency_nm: f64) -> BioactivityRecord {
    BioactivityRecord {
        target: TRPV1.to_string(),
        compound_id: id.to_string(),
        smiles: smiles.to_string(),
        potency_nm,
        assay: AssayMetadata::default(),
    }
}

fn search_over(source: Arc<MockBioactivitySource>) -> CandidateSearch {
    let calculator = Arc::new(DescriptorCalculator::new(InterpreterMode::Exact, 128));
    CandidateSearch::new(source, calculator)
}

fn request(lipinski_only: bool) -> SearchRequest {
    SearchRequest { lipinski_only, ..SearchRequest::new("TRPV1") }
}

#[tokio::test]
async fn test_duplicate_compound_keeps_most_potent() {
    let source = Arc::new(
        MockBioactivitySource::new()
            .with(TRPV1, record("CHEMBL112", ACETAMINOPHEN, 200.0))
            .with(TRPV1, record("CHEMBL112", ACETAMINOPHEN, 50.0))
            .with(TRPV1, record("CHEMBL521", IBUPROFEN, 300.0)),
    );
    let report = search_over(source).search(&request(true)).await.unwrap();

    assert_eq!(report.retrieved, 3);
    assert_eq!(report.duplicates_collapsed, 1);
    let acetaminophen: Vec<_> = report.candidates.iter().filter(|c| c.compound_id == "CHEMBL112").collect();
    assert_eq!(acetaminophen.len(), 1);
    assert_eq!(acetaminophen[0].potency_nm, 50.0);
}

#[tokio::test]
async fn test_candidates_sorted_by_drug_score() {
    let heavy = greasy();
    let source = Arc::new(
        MockBioactivitySource::new()
            .with(TRPV1, record("APAP", ACETAMINOPHEN, 30.0))
            .with(TRPV1, record("GREASY", &heavy, 10.0))
            .with(TRPV1, record("IBU", IBUPROFEN, 20.0)),
    );
    let report = search_over(source).search(&request(false)).await.unwrap();

    let ids: Vec<_> = report.candidates.iter().map(|c| c.compound_id.as_str()).collect();
    assert_eq!(ids, ["APAP", "IBU", "GREASY"]);
    assert!(report
        .candidates
        .windows(2)
        .all(|w| w[0].drug_score >= w[1].drug_score));
    for c in &report.candidates {
        assert!((0.0..=1.0).contains(&c.risk_score));
        assert!((c.drug_score + c.risk_score - 1.0).abs() < 1e-12);
    }
}

#[tokio::test]
async fn test_equal_scores_keep_retrieval_order() {
    let heavy = greasy();
    let source = Arc::new(
        MockBioactivitySource::new()
            .with(TRPV1, record("GREASY", &heavy, 20.0))
            .with(TRPV1, record("ZED", ACETAMINOPHEN, 40.0))
            .with(TRPV1, record("ALPHA", ACETAMINOPHEN, 30.0)),
    );
    let report = search_over(source).search(&request(false)).await.unwrap();

    let ids: Vec<_> = report.candidates.iter().map(|c| c.compound_id.as_str()).collect();
    assert_eq!(ids, ["ZED", "ALPHA", "GREASY"]);
    assert_eq!(report.candidates[0].drug_score, report.candidates[1].drug_score);
    assert!(report.candidates[1].drug_score > report.candidates[2].drug_score);
}

#[tokio::test]
async fn test_lipinski_filter_toggle() {
    let heavy = greasy();
    let source = Arc::new(
        MockBioactivitySource::new()
            .with(TRPV1, record("GREASY", &heavy, 10.0))
            .with(TRPV1, record("APAP", ACETAMINOPHEN, 30.0)),
    );
    let search = search_over(source);

    let strict = search.search(&request(true)).await.unwrap();
    assert_eq!(strict.candidates.len(), 1);
    assert_eq!(strict.lipinski_excluded, 1);
    assert!(strict.candidates.iter().all(|c| c.lipinski.pass));

    let relaxed = search.search(&request(false)).await.unwrap();
    assert_eq!(relaxed.candidates.len(), 2);
    let greasy = relaxed.candidates.iter().find(|c| c.compound_id == "GREASY").unwrap();
    assert!(!greasy.lipinski.pass);
    assert!(!greasy.lipinski.violations.is_empty());
}

#[tokio::test]
async fn test_unparseable_structure_is_dropped_not_fatal() {
    let source = Arc::new(
        MockBioactivitySource::new()
            .with(TRPV1, record("BROKEN", "C1CC(", 10.0))
            .with(TRPV1, record("APAP", ACETAMINOPHEN, 30.0)),
    );
    let report = search_over(source).search(&request(true)).await.unwrap();

    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].compound_id, "BROKEN");
    assert!(!report.dropped[0].reason.is_empty());
}

#[tokio::test]
async fn test_invalid_requests_never_reach_the_source() {
    let source = Arc::new(MockBioactivitySource::new().with(TRPV1, record("APAP", ACETAMINOPHEN, 30.0)));
    let search = search_over(source.clone());

    let unknown = SearchRequest::new("Mu-opioid receptor");
    assert!(matches!(search.search(&unknown).await, Err(SearchError::Config { field: "target", .. })));

    let too_potent = SearchRequest { potency_ceiling_nm: 1.0, ..SearchRequest::new("TRPV1") };
    assert!(matches!(search.search(&too_potent).await, Err(SearchError::Config { .. })));

    let too_many = SearchRequest { limit: 10_000, ..SearchRequest::new("TRPV1") };
    assert!(matches!(search.search(&too_many).await, Err(SearchError::Config { .. })));

    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_target_resolves_by_accession() {
    let source = Arc::new(MockBioactivitySource::new().with(TRPV1, record("APAP", ACETAMINOPHEN, 30.0)));
    let report = search_over(source).search(&SearchRequest::new(TRPV1)).await.unwrap();
    assert_eq!(report.target.name, "TRPV1");
    assert_eq!(report.candidates[0].target, "TRPV1");
}

#[tokio::test]
async fn test_retrieval_failure_yields_no_candidates() {
    let source = Arc::new(MockBioactivitySource::new().failing(MockFailure::RateLimited));
    let err = search_over(source).search(&request(true)).await.unwrap_err();
    assert!(matches!(err, SearchError::Retrieval(RetrievalError::RateLimited)), "got {err:?}");
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let source = Arc::new(
        MockBioactivitySource::new()
            .with(TRPV1, record("APAP", ACETAMINOPHEN, 30.0))
            .delayed(Duration::from_millis(500)),
    );
    let search = search_over(source).with_timeout(Duration::from_millis(20));
    let err = search.search(&request(true)).await.unwrap_err();
    assert!(matches!(err, SearchError::Retrieval(RetrievalError::Timeout(_))), "got {err:?}");
}

#[tokio::test]
async fn test_export_reimport_preserves_ranking() {
    let heavy = greasy();
    let source = Arc::new(
        MockBioactivitySource::new()
            .with(TRPV1, record("GREASY", &heavy, 10.0))
            .with(TRPV1, record("IBU", IBUPROFEN, 20.0))
            .with(TRPV1, record("APAP", ACETAMINOPHEN, 30.0)),
    );
    let report = search_over(source).search(&request(false)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trpv1.csv");
    let file = std::fs::File::create(&path).unwrap();
    write_candidates(file, &report.candidates).unwrap();

    let back = read_candidates(std::fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(back.len(), report.candidates.len());
    for (a, b) in report.candidates.iter().zip(&back) {
        assert_eq!(a.compound_id, b.compound_id);
        assert!((a.drug_score - b.drug_score).abs() < 1e-6);
        assert!((a.descriptors.molecular_weight - b.descriptors.molecular_weight).abs() < 1e-6);
        assert_eq!(a.lipinski, b.lipinski);
    }
}
