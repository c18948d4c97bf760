//! Candidate table export.
//!
//! Column names and order are stable; downstream spreadsheets depend on them.
//! Score columns carry unrounded values so a re-import ranks identically.

use std::io::{Read, Write};
use std::path::Path;

use nocisift_common::{Candidate, DescriptorBundle, InterpreterMode, LipinskiResult, LipinskiRule};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

/// One exported row, in column order.
#[derive(Debug, Serialize, Deserialize)]
struct CandidateRow {
    chembl_id: String,
    target: String,
    smiles: String,
    #[serde(rename = "ic50_nM")]
    ic50_nm: f64,
    #[serde(rename = "MW")]
    mw: f64,
    #[serde(rename = "LogP")]
    logp: f64,
    #[serde(rename = "HBD")]
    hbd: u32,
    #[serde(rename = "HBA")]
    hba: u32,
    #[serde(rename = "TPSA")]
    tpsa: f64,
    #[serde(rename = "RotBonds")]
    rot_bonds: u32,
    #[serde(rename = "ArRings")]
    ar_rings: u32,
    descriptor_mode: String,
    lipinski_pass: bool,
    lipinski_violations: String,
    side_effect_score: f64,
    drug_score: f64,
}

impl From<&Candidate> for CandidateRow {
    fn from(c: &Candidate) -> Self {
        let d = &c.descriptors;
        Self {
            chembl_id: c.compound_id.clone(),
            target: c.target.clone(),
            smiles: c.smiles.clone(),
            ic50_nm: c.potency_nm,
            mw: d.molecular_weight,
            logp: d.logp,
            hbd: d.hbd,
            hba: d.hba,
            tpsa: d.tpsa,
            rot_bonds: d.rotatable_bonds,
            ar_rings: d.aromatic_rings,
            descriptor_mode: d.mode.to_string(),
            lipinski_pass: c.lipinski.pass,
            lipinski_violations: c.lipinski.violation_labels(),
            side_effect_score: c.risk_score,
            drug_score: c.drug_score,
        }
    }
}

impl CandidateRow {
    fn into_candidate(self, row: usize) -> Result<Candidate, ExportError> {
        let invalid = |message: String| ExportError::InvalidRow { row, message };

        let mode: InterpreterMode = self.descriptor_mode.parse().map_err(invalid)?;
        let violations = self
            .lipinski_violations
            .split('|')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<LipinskiRule>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        Ok(Candidate {
            compound_id: self.chembl_id,
            target: self.target,
            smiles: self.smiles,
            potency_nm: self.ic50_nm,
            descriptors: DescriptorBundle {
                molecular_weight: self.mw,
                logp: self.logp,
                hbd: self.hbd,
                hba: self.hba,
                tpsa: self.tpsa,
                rotatable_bonds: self.rot_bonds,
                aromatic_rings: self.ar_rings,
                mode,
            },
            lipinski: LipinskiResult { pass: self.lipinski_pass, violations },
            risk_score: self.side_effect_score,
            drug_score: self.drug_score,
        })
    }
}

/// Write candidates, header first, in the order given.
pub fn write_candidates<W: Write>(writer: W, candidates: &[Candidate]) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    for c in candidates {
        out.serialize(CandidateRow::from(c))?;
    }
    if candidates.is_empty() {
        // serialize() emits the header lazily; an empty table still needs it
        out.write_record(HEADER)?;
    }
    out.flush()?;
    Ok(())
}

/// Write candidates to a file, replacing it.
pub fn export_candidates(path: impl AsRef<Path>, candidates: &[Candidate]) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_candidates(file, candidates)?;
    info!(path = %path.display(), rows = candidates.len(), "Exported candidates");
    Ok(())
}

/// Read a table written by [`write_candidates`].
pub fn read_candidates<R: Read>(reader: R) -> Result<Vec<Candidate>, ExportError> {
    let mut input = csv::Reader::from_reader(reader);
    input
        .deserialize::<CandidateRow>()
        .enumerate()
        .map(|(i, row)| row?.into_candidate(i + 1))
        .collect()
}

pub const HEADER: [&str; 16] = [
    "chembl_id",
    "target",
    "smiles",
    "ic50_nM",
    "MW",
    "LogP",
    "HBD",
    "HBA",
    "TPSA",
    "RotBonds",
    "ArRings",
    "descriptor_mode",
    "lipinski_pass",
    "lipinski_violations",
    "side_effect_score",
    "drug_score",
];
