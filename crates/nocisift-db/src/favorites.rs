//! Favorites repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::debug;

use crate::candidates::candidate_from_row;
use crate::database::Database;
use crate::error::{DbError, Result};
use crate::schema::FavoriteEntry;

#[derive(Debug, Clone)]
pub struct FavoriteRepository {
    db: Arc<Database>,
}

impl FavoriteRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Mark a compound as favorite. Adding it again replaces the note and
    /// refreshes the timestamp.
    pub async fn add_favorite(&self, compound_id: &str, note: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (compound_id, note, added_at) VALUES (?, ?, ?)
            ON CONFLICT (compound_id) DO UPDATE SET
                note = excluded.note,
                added_at = excluded.added_at
            "#,
        )
        .bind(compound_id)
        .bind(note)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;
        debug!(compound = compound_id, "Added favorite");
        Ok(())
    }

    /// Errors with `NotFound` if the compound was not a favorite.
    pub async fn remove_favorite(&self, compound_id: &str) -> Result<()> {
        let affected = sqlx::query("DELETE FROM favorites WHERE compound_id = ?")
            .bind(compound_id)
            .execute(self.db.pool())
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(DbError::NotFound(compound_id.to_string()));
        }
        Ok(())
    }

    pub async fn is_favorite(&self, compound_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM favorites WHERE compound_id = ?")
            .bind(compound_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    /// All favorites, newest first, with saved compound data where present.
    pub async fn favorites(&self) -> Result<Vec<FavoriteEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT f.compound_id AS favorite_id, f.note, f.added_at,
                   c.compound_id, c.target, c.smiles, c.potency_nm,
                   c.molecular_weight, c.logp, c.hbd, c.hba, c.tpsa,
                   c.rotatable_bonds, c.aromatic_rings, c.descriptor_mode,
                   c.lipinski_pass, c.lipinski_violations, c.risk_score, c.drug_score
            FROM favorites f
            LEFT JOIN compounds c ON c.compound_id = f.compound_id
            ORDER BY f.added_at DESC, f.compound_id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| -> Result<FavoriteEntry> {
                let saved: Option<String> = row.try_get("compound_id")?;
                let compound = match saved {
                    Some(_) => Some(candidate_from_row(row)?),
                    None => None,
                };
                let added_at: DateTime<Utc> = row.try_get("added_at")?;
                Ok(FavoriteEntry {
                    compound_id: row.try_get("favorite_id")?,
                    note: row.try_get("note")?,
                    added_at,
                    compound,
                })
            })
            .collect()
    }
}
