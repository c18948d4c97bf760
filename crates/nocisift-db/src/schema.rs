//! Table definitions and stored row types.

use chrono::{DateTime, Utc};
use nocisift_common::Candidate;
use serde::{Deserialize, Serialize};

pub const TABLE_COMPOUNDS: &str = "compounds";
pub const TABLE_FAVORITES: &str = "favorites";
pub const TABLE_SEARCH_HISTORY: &str = "search_history";

// =============================================================================
// DDL
// =============================================================================

/// Scored candidates, keyed by compound id. A compound screened against a
/// second target overwrites the first row.
pub(crate) const CREATE_COMPOUNDS: &str = r#"
CREATE TABLE IF NOT EXISTS compounds (
    compound_id         TEXT PRIMARY KEY,
    target              TEXT NOT NULL,
    smiles              TEXT NOT NULL,
    potency_nm          REAL NOT NULL,
    molecular_weight    REAL NOT NULL,
    logp                REAL NOT NULL,
    hbd                 INTEGER NOT NULL,
    hba                 INTEGER NOT NULL,
    tpsa                REAL NOT NULL,
    rotatable_bonds     INTEGER NOT NULL,
    aromatic_rings      INTEGER NOT NULL,
    descriptor_mode     TEXT NOT NULL,
    lipinski_pass       INTEGER NOT NULL,
    lipinski_violations TEXT NOT NULL,
    risk_score          REAL NOT NULL,
    drug_score          REAL NOT NULL,
    updated_at          TEXT NOT NULL
)
"#;

pub(crate) const CREATE_COMPOUNDS_TARGET_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_compounds_target ON compounds (target)";

pub(crate) const CREATE_FAVORITES: &str = r#"
CREATE TABLE IF NOT EXISTS favorites (
    compound_id TEXT PRIMARY KEY,
    note        TEXT,
    added_at    TEXT NOT NULL
)
"#;

pub(crate) const CREATE_SEARCH_HISTORY: &str = r#"
CREATE TABLE IF NOT EXISTS search_history (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    target             TEXT NOT NULL,
    potency_ceiling_nm REAL NOT NULL,
    result_count       INTEGER NOT NULL,
    searched_at        TEXT NOT NULL
)
"#;

// =============================================================================
// Row types
// =============================================================================

/// A favorited compound. `compound` is filled when the compound has also
/// been saved by a search or an ad-hoc analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub compound_id: String,
    pub note: Option<String>,
    pub added_at: DateTime<Utc>,
    pub compound: Option<Candidate>,
}

/// One executed search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLogEntry {
    pub id: i64,
    pub target: String,
    pub potency_ceiling_nm: f64,
    pub result_count: u32,
    pub searched_at: DateTime<Utc>,
}
