//! Repository behaviour against an in-memory SQLite database.
//!
//! ```bash
//! cargo test --package nocisift-db --test test_store
//! ```

use std::sync::Arc;

use nocisift_common::{Candidate, DescriptorBundle, InterpreterMode, LipinskiResult, LipinskiRule};
use nocisift_db::{CandidateRepository, Database, DbError, FavoriteRepository, SearchLogRepository};
use pretty_assertions::assert_eq;

async fn open() -> Arc<Database> {
    let db = Database::open("sqlite::memory:").await.unwrap();
    db.initialize().await.unwrap();
    Arc::new(db)
}

fn candidate(id: &str, target: &str, drug_score: f64) -> Candidate {
    Candidate {
        compound_id: id.to_string(),
        target: target.to_string(),
        smiles: "CC(=O)Nc1ccc(O)cc1".to_string(),
        potency_nm: 120.0,
        descriptors: DescriptorBundle {
            molecular_weight: 151.165,
            logp: 1.35,
            hbd: 2,
            hba: 3,
            tpsa: 49.33,
            rotatable_bonds: 1,
            aromatic_rings: 1,
            mode: InterpreterMode::Exact,
        },
        lipinski: LipinskiResult { pass: true, violations: vec![] },
        risk_score: 1.0 - drug_score,
        drug_score,
    }
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let db = open().await;
    let repo = CandidateRepository::new(db.clone());
    let batch = vec![candidate("CHEMBL1", "TRPV1", 0.9), candidate("CHEMBL2", "TRPV1", 0.7)];

    repo.upsert_candidates(&batch).await.unwrap();
    repo.upsert_candidates(&batch).await.unwrap();

    assert_eq!(db.stats().await.unwrap().compounds, 2);
    assert_eq!(repo.saved_compounds(None).await.unwrap(), batch);
}

#[tokio::test]
async fn test_upsert_overwrites_changed_values() {
    let repo = CandidateRepository::new(open().await);
    repo.upsert_candidates(&[candidate("CHEMBL1", "TRPV1", 0.9)]).await.unwrap();

    let mut updated = candidate("CHEMBL1", "CB2 (CNR2)", 0.4);
    updated.lipinski = LipinskiResult {
        pass: false,
        violations: vec![LipinskiRule::MolecularWeight, LipinskiRule::AcceptorCount],
    };
    updated.descriptors.mode = InterpreterMode::Heuristic;
    repo.upsert_candidates(&[updated.clone()]).await.unwrap();

    let stored = repo.find_by_id("CHEMBL1").await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_saved_compounds_filter_and_order() {
    let repo = CandidateRepository::new(open().await);
    repo.upsert_candidates(&[
        candidate("A", "TRPV1", 0.5),
        candidate("B", "COX-2 (PTGS2)", 0.99),
        candidate("C", "TRPV1", 0.8),
    ])
    .await
    .unwrap();

    let all: Vec<_> = repo.saved_compounds(None).await.unwrap().into_iter().map(|c| c.compound_id).collect();
    assert_eq!(all, ["B", "C", "A"]);

    let trpv1: Vec<_> = repo
        .saved_compounds(Some("TRPV1"))
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.compound_id)
        .collect();
    assert_eq!(trpv1, ["C", "A"]);
}

#[tokio::test]
async fn test_favorites_join_saved_data() {
    let db = open().await;
    let candidates = CandidateRepository::new(db.clone());
    let favorites = FavoriteRepository::new(db.clone());

    candidates.upsert_candidates(&[candidate("CHEMBL1", "TRPV1", 0.9)]).await.unwrap();
    favorites.add_favorite("CHEMBL1", Some("lead")).await.unwrap();
    favorites.add_favorite("CUSTOM_CCO", None).await.unwrap();

    let entries = favorites.favorites().await.unwrap();
    assert_eq!(entries.len(), 2);
    let saved = entries.iter().find(|e| e.compound_id == "CHEMBL1").unwrap();
    assert_eq!(saved.note.as_deref(), Some("lead"));
    assert_eq!(saved.compound.as_ref().map(|c| c.drug_score), Some(0.9));
    let bare = entries.iter().find(|e| e.compound_id == "CUSTOM_CCO").unwrap();
    assert!(bare.compound.is_none());

    // re-adding replaces the note instead of duplicating
    favorites.add_favorite("CHEMBL1", Some("backup")).await.unwrap();
    assert_eq!(db.stats().await.unwrap().favorites, 2);

    favorites.remove_favorite("CHEMBL1").await.unwrap();
    assert!(!favorites.is_favorite("CHEMBL1").await.unwrap());
    assert!(matches!(favorites.remove_favorite("CHEMBL1").await, Err(DbError::NotFound(_))));
}

#[tokio::test]
async fn test_search_history_newest_first() {
    let log = SearchLogRepository::new(open().await);
    log.append_search_log("TRPV1", 1000.0, 12).await.unwrap();
    log.append_search_log("Nav1.7 (SCN9A)", 500.0, 3).await.unwrap();
    log.append_search_log("CB2 (CNR2)", 100.0, 0).await.unwrap();

    let history = log.search_history(2).await.unwrap();
    let targets: Vec<_> = history.iter().map(|e| e.target.as_str()).collect();
    assert_eq!(targets, ["CB2 (CNR2)", "Nav1.7 (SCN9A)"]);
    assert_eq!(history[1].result_count, 3);
    assert_eq!(history[1].potency_ceiling_nm, 500.0);
}
