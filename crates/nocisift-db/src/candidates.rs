//! Saved candidate repository.

use std::sync::Arc;

use chrono::Utc;
use nocisift_common::{Candidate, DescriptorBundle, InterpreterMode, LipinskiResult, LipinskiRule};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, instrument};

use crate::database::Database;
use crate::error::{DbError, Result};

const UPSERT_COMPOUND: &str = r#"
INSERT INTO compounds (
    compound_id, target, smiles, potency_nm,
    molecular_weight, logp, hbd, hba, tpsa, rotatable_bonds, aromatic_rings,
    descriptor_mode, lipinski_pass, lipinski_violations,
    risk_score, drug_score, updated_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (compound_id) DO UPDATE SET
    target              = excluded.target,
    smiles              = excluded.smiles,
    potency_nm          = excluded.potency_nm,
    molecular_weight    = excluded.molecular_weight,
    logp                = excluded.logp,
    hbd                 = excluded.hbd,
    hba                 = excluded.hba,
    tpsa                = excluded.tpsa,
    rotatable_bonds     = excluded.rotatable_bonds,
    aromatic_rings      = excluded.aromatic_rings,
    descriptor_mode     = excluded.descriptor_mode,
    lipinski_pass       = excluded.lipinski_pass,
    lipinski_violations = excluded.lipinski_violations,
    risk_score          = excluded.risk_score,
    drug_score          = excluded.drug_score,
    updated_at          = excluded.updated_at
"#;

const SELECT_COMPOUND_COLUMNS: &str = r#"
SELECT compound_id, target, smiles, potency_nm,
       molecular_weight, logp, hbd, hba, tpsa, rotatable_bonds, aromatic_rings,
       descriptor_mode, lipinski_pass, lipinski_violations,
       risk_score, drug_score
FROM compounds
"#;

/// Repository for scored candidates.
#[derive(Debug, Clone)]
pub struct CandidateRepository {
    db: Arc<Database>,
}

impl CandidateRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or replace candidates by compound id, all in one transaction.
    /// Saving the same batch twice leaves one row per compound.
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    pub async fn upsert_candidates(&self, candidates: &[Candidate]) -> Result<u64> {
        if candidates.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        let mut written = 0;
        for c in candidates {
            let d = &c.descriptors;
            written += sqlx::query(UPSERT_COMPOUND)
                .bind(&c.compound_id)
                .bind(&c.target)
                .bind(&c.smiles)
                .bind(c.potency_nm)
                .bind(d.molecular_weight)
                .bind(d.logp)
                .bind(d.hbd)
                .bind(d.hba)
                .bind(d.tpsa)
                .bind(d.rotatable_bonds)
                .bind(d.aromatic_rings)
                .bind(d.mode.as_str())
                .bind(c.lipinski.pass)
                .bind(c.lipinski.violation_labels())
                .bind(c.risk_score)
                .bind(c.drug_score)
                .bind(now)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        debug!(written, "Saved candidates");
        Ok(written)
    }

    /// Saved candidates, best drug score first. `target` filters by the
    /// target display name.
    pub async fn saved_compounds(&self, target: Option<&str>) -> Result<Vec<Candidate>> {
        let rows = match target {
            Some(t) => {
                sqlx::query(&format!("{SELECT_COMPOUND_COLUMNS} WHERE target = ? ORDER BY drug_score DESC"))
                    .bind(t)
                    .fetch_all(self.db.pool())
                    .await?
            }
            None => {
                sqlx::query(&format!("{SELECT_COMPOUND_COLUMNS} ORDER BY drug_score DESC"))
                    .fetch_all(self.db.pool())
                    .await?
            }
        };
        rows.iter().map(candidate_from_row).collect()
    }

    pub async fn find_by_id(&self, compound_id: &str) -> Result<Option<Candidate>> {
        let row = sqlx::query(&format!("{SELECT_COMPOUND_COLUMNS} WHERE compound_id = ?"))
            .bind(compound_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(candidate_from_row).transpose()
    }

    pub async fn delete(&self, compound_id: &str) -> Result<()> {
        let affected = sqlx::query("DELETE FROM compounds WHERE compound_id = ?")
            .bind(compound_id)
            .execute(self.db.pool())
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(DbError::NotFound(compound_id.to_string()));
        }
        Ok(())
    }
}

/// Map a row carrying the `compounds` columns back to a candidate.
pub(crate) fn candidate_from_row(row: &SqliteRow) -> Result<Candidate> {
    let mode: String = row.try_get("descriptor_mode")?;
    let mode = mode
        .parse::<InterpreterMode>()
        .map_err(|message| DbError::InvalidRecord { column: "descriptor_mode", message })?;

    let labels: String = row.try_get("lipinski_violations")?;
    let violations = labels
        .split('|')
        .filter(|s| !s.is_empty())
        .map(str::parse::<LipinskiRule>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|message| DbError::InvalidRecord { column: "lipinski_violations", message })?;

    Ok(Candidate {
        compound_id: row.try_get("compound_id")?,
        target: row.try_get("target")?,
        smiles: row.try_get("smiles")?,
        potency_nm: row.try_get("potency_nm")?,
        descriptors: DescriptorBundle {
            molecular_weight: row.try_get("molecular_weight")?,
            logp: row.try_get("logp")?,
            hbd: row.try_get("hbd")?,
            hba: row.try_get("hba")?,
            tpsa: row.try_get("tpsa")?,
            rotatable_bonds: row.try_get("rotatable_bonds")?,
            aromatic_rings: row.try_get("aromatic_rings")?,
            mode,
        },
        lipinski: LipinskiResult { pass: row.try_get("lipinski_pass")?, violations },
        risk_score: row.try_get("risk_score")?,
        drug_score: row.try_get("drug_score")?,
    })
}
