//! nocisift-ingestion: bioactivity retrieval.
//!
//! The screening pipeline talks to one collaborator, a [`BioactivitySource`],
//! which returns raw potency measurements for a target accession. ChEMBL is
//! the production implementation.

pub mod sources;

pub use sources::chembl::{ChemblClient, ChemblSettings};
pub use sources::memory::{MockBioactivitySource, MockFailure};
pub use sources::{BioactivitySource, RetrievalError};
