//! nocisift-ranker: candidate scoring and ranking.
//!
//! Turns raw bioactivity records into a ranked candidate table:
//! deduplicate by compound, compute descriptors, apply the Rule of Five,
//! score side-effect risk, sort by drug score.

pub mod weights;
pub mod normalise;
pub mod scorer;
pub mod dedup;
pub mod pipeline;
pub mod export;

pub use pipeline::{CandidateSearch, DroppedCompound, SearchBounds, SearchError, SearchReport, SearchRequest};
pub use scorer::{RiskScorer, ScoreError};
pub use weights::RiskWeights;
pub use export::{export_candidates, read_candidates, write_candidates, ExportError};
