//! nocisift-common: Shared types, errors, and the target catalog used across all nocisift crates.

pub mod error;
pub mod entities;
pub mod target_catalog;
pub mod sandbox;

// Re-export commonly used types
pub use entities::{
    BioactivityRecord, Candidate, DescriptorBundle, InterpreterMode, LipinskiResult,
    LipinskiRule,
};
pub use error::{NocisiftError, Result};
pub use target_catalog::{Target, TargetCatalog};
