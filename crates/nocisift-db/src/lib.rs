//! nocisift database layer
//!
//! Embedded SQLite storage for scored candidates, favorites and the search
//! log. One file, no server.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nocisift_db::{CandidateRepository, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(Database::open("sqlite://nocisift.db").await?);
//!     db.initialize().await?;
//!
//!     let candidates = CandidateRepository::new(db);
//!     for c in candidates.saved_compounds(Some("TRPV1")).await? {
//!         println!("{} {:.3}", c.compound_id, c.drug_score_display());
//!     }
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod schema;
pub mod candidates;
pub mod favorites;
pub mod search_log;

pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use schema::{FavoriteEntry, SearchLogEntry, TABLE_COMPOUNDS, TABLE_FAVORITES, TABLE_SEARCH_HISTORY};
pub use candidates::CandidateRepository;
pub use favorites::FavoriteRepository;
pub use search_log::SearchLogRepository;
