//! Search history repository.

use std::sync::Arc;

use chrono::Utc;
use sqlx::Row;

use crate::database::Database;
use crate::error::Result;
use crate::schema::SearchLogEntry;

#[derive(Debug, Clone)]
pub struct SearchLogRepository {
    db: Arc<Database>,
}

impl SearchLogRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record an executed search. Returns the new entry id.
    pub async fn append_search_log(
        &self,
        target: &str,
        potency_ceiling_nm: f64,
        result_count: u32,
    ) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO search_history (target, potency_ceiling_nm, result_count, searched_at) VALUES (?, ?, ?, ?)",
        )
        .bind(target)
        .bind(potency_ceiling_nm)
        .bind(result_count)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Most recent searches first.
    pub async fn search_history(&self, limit: u32) -> Result<Vec<SearchLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, target, potency_ceiling_nm, result_count, searched_at
            FROM search_history
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| -> Result<SearchLogEntry> {
                Ok(SearchLogEntry {
                    id: row.try_get("id")?,
                    target: row.try_get("target")?,
                    potency_ceiling_nm: row.try_get("potency_ceiling_nm")?,
                    result_count: row.try_get("result_count")?,
                    searched_at: row.try_get("searched_at")?,
                })
            })
            .collect()
    }
}
