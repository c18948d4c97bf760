/// Core entity types flowing through the screening pipeline.
/// Raw records come in from retrieval, candidates go out to storage and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Bioactivity record (retrieval output)
// ---------------------------------------------------------------------------

/// One potency measurement of a compound against a target.
/// Transient: lives for a single search invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioactivityRecord {
    pub target: String,
    pub compound_id: String,
    pub smiles: String,
    /// Potency in nanomolar (IC50 or the configured standard type).
    pub potency_nm: f64,
    pub assay: AssayMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssayMetadata {
    pub assay_id: Option<String>,
    pub assay_type: Option<String>,   // B (binding), F (functional), ...
    pub standard_type: Option<String>, // IC50, Ki, ...
    pub description: Option<String>,
    pub pchembl_value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Descriptor bundle
// ---------------------------------------------------------------------------

/// Which structure interpreter produced a descriptor bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterpreterMode {
    /// Full graph parse of the notation.
    #[default]
    Exact,
    /// Character-scan estimate; values are approximate.
    Heuristic,
}

impl InterpreterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpreterMode::Exact => "exact",
            InterpreterMode::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for InterpreterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterpreterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(InterpreterMode::Exact),
            "heuristic" => Ok(InterpreterMode::Heuristic),
            other => Err(format!("unknown interpreter mode '{other}' (expected exact or heuristic)")),
        }
    }
}

/// The seven molecular descriptors computed per structure notation.
/// Either all fields exist or the bundle does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorBundle {
    /// Daltons, including implicit hydrogens.
    pub molecular_weight: f64,
    pub logp: f64,
    pub hbd: u32,
    pub hba: u32,
    /// Topological polar surface area in Å².
    pub tpsa: f64,
    pub rotatable_bonds: u32,
    pub aromatic_rings: u32,
    pub mode: InterpreterMode,
}

// ---------------------------------------------------------------------------
// Lipinski Rule of Five
// ---------------------------------------------------------------------------

/// Rule of Five thresholds, in evaluation and display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LipinskiRule {
    MolecularWeight,
    Lipophilicity,
    DonorCount,
    AcceptorCount,
}

impl LipinskiRule {
    pub const ALL: [LipinskiRule; 4] = [
        LipinskiRule::MolecularWeight,
        LipinskiRule::Lipophilicity,
        LipinskiRule::DonorCount,
        LipinskiRule::AcceptorCount,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LipinskiRule::MolecularWeight => "MW>500",
            LipinskiRule::Lipophilicity => "LogP>5",
            LipinskiRule::DonorCount => "HBD>5",
            LipinskiRule::AcceptorCount => "HBA>10",
        }
    }
}

impl fmt::Display for LipinskiRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LipinskiRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LipinskiRule::ALL
            .iter()
            .copied()
            .find(|r| r.label() == s.trim())
            .ok_or_else(|| format!("unknown Lipinski rule label '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LipinskiResult {
    pub pass: bool,
    /// Violated rules in `LipinskiRule::ALL` order.
    pub violations: Vec<LipinskiRule>,
}

impl LipinskiResult {
    /// Violation labels joined for single-cell display, e.g. `MW>500|LogP>5`.
    pub fn violation_labels(&self) -> String {
        self.violations
            .iter()
            .map(|v| v.label())
            .collect::<Vec<_>>()
            .join("|")
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A scored compound: the unit persisted and displayed.
/// `compound_id` is the natural key for upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub compound_id: String,
    pub target: String,
    pub smiles: String,
    pub potency_nm: f64,
    pub descriptors: DescriptorBundle,
    pub lipinski: LipinskiResult,
    /// Unrounded side-effect risk in [0, 1]; used for ranking and filtering.
    pub risk_score: f64,
    /// Unrounded `1 - risk_score`.
    pub drug_score: f64,
}

impl Candidate {
    /// Drug score rounded for display. Never feed this back into ranking.
    pub fn drug_score_display(&self) -> f64 {
        round_display(self.drug_score)
    }

    pub fn risk_score_display(&self) -> f64 {
        round_display(self.risk_score)
    }
}

/// Round to three decimal places.
pub fn round_display(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_labels_roundtrip() {
        for rule in LipinskiRule::ALL {
            assert_eq!(rule.label().parse::<LipinskiRule>().unwrap(), rule);
        }
        assert!("MW>600".parse::<LipinskiRule>().is_err());
    }

    #[test]
    fn test_violation_labels_join() {
        let result = LipinskiResult {
            pass: false,
            violations: vec![LipinskiRule::MolecularWeight, LipinskiRule::AcceptorCount],
        };
        assert_eq!(result.violation_labels(), "MW>500|HBA>10");
    }

    #[test]
    fn test_interpreter_mode_parse() {
        assert_eq!("Exact".parse::<InterpreterMode>().unwrap(), InterpreterMode::Exact);
        assert_eq!(" heuristic ".parse::<InterpreterMode>().unwrap(), InterpreterMode::Heuristic);
        assert!("rdkit".parse::<InterpreterMode>().is_err());
    }

    #[test]
    fn test_round_display_keeps_three_decimals() {
        assert!((round_display(0.87654) - 0.877).abs() < 1e-12);
        assert!((round_display(0.5) - 0.5).abs() < 1e-12);
    }
}
