//! Weight vector for the side-effect risk score.

use serde::{Deserialize, Serialize};

/// Per-descriptor weights of the risk penalty terms.
/// Weights sum to 1.0 so a compound saturating every band scores risk 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    /// Excess molecular weight (poor absorption, off-target accumulation)
    pub molecular_weight: f64,
    /// Excess lipophilicity (promiscuous binding, hepatotoxicity)
    pub logp: f64,
    /// Excess polar surface area (poor permeability)
    pub tpsa: f64,
    /// Excess flexibility (entropic cost, poor oral bioavailability)
    pub rotatable_bonds: f64,
    /// Many aromatic rings (solubility, CYP inhibition)
    pub aromatic_rings: f64,
    pub hbd: f64,
    pub hba: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            molecular_weight: 0.25,
            logp:             0.25,
            tpsa:             0.15,
            rotatable_bonds:  0.10,
            aromatic_rings:   0.10,
            hbd:              0.075,
            hba:              0.075,
        }
    }
}

impl RiskWeights {
    /// Validate that all weights sum to ~1.0
    pub fn validate(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-6
    }

    /// Every weight finite and non-negative, and at least one positive.
    pub fn is_usable(&self) -> bool {
        let arr = self.as_array();
        arr.iter().all(|w| w.is_finite() && *w >= 0.0) && self.sum() > 0.0
    }

    /// Renormalise weights so they sum to 1.0
    pub fn normalise(&mut self) {
        let sum = self.sum();
        if sum > 0.0 {
            self.molecular_weight /= sum;
            self.logp             /= sum;
            self.tpsa             /= sum;
            self.rotatable_bonds  /= sum;
            self.aromatic_rings   /= sum;
            self.hbd              /= sum;
            self.hba              /= sum;
        }
    }

    /// Weights in [`crate::scorer::BANDS`] order.
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.molecular_weight,
            self.logp,
            self.tpsa,
            self.rotatable_bonds,
            self.aromatic_rings,
            self.hbd,
            self.hba,
        ]
    }

    fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = RiskWeights::default();
        assert!(w.validate(), "Default weights must sum to 1.0");
        assert!(w.is_usable());
    }

    #[test]
    fn test_normalise_restores_sum() {
        let mut w = RiskWeights::default();
        w.logp += 0.5;
        assert!(!w.validate());
        w.normalise();
        assert!(w.validate());
    }

    #[test]
    fn test_negative_or_zero_weights_unusable() {
        let negative = RiskWeights { tpsa: -0.1, ..RiskWeights::default() };
        assert!(!negative.is_usable());

        let zero = RiskWeights {
            molecular_weight: 0.0,
            logp: 0.0,
            tpsa: 0.0,
            rotatable_bonds: 0.0,
            aromatic_rings: 0.0,
            hbd: 0.0,
            hba: 0.0,
        };
        assert!(!zero.is_usable());
    }
}
