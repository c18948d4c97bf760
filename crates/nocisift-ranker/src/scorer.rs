//! Side-effect risk score.
//!
//! risk = Σ wᵢ · excessᵢ, clamped to [0, 1]
//! drug score = 1 − risk
//!
//! Each excess term is zero inside the descriptor's favourable band and
//! rises linearly to 1 at the band's saturation point. Terms are independent,
//! so the score is monotone in every descriptor's unfavourable direction.

use nocisift_common::DescriptorBundle;
use thiserror::Error;

use crate::normalise::excess;
use crate::weights::RiskWeights;

/// Rounding slack of the weighted sum. A bundle saturating every band scores
/// exactly 1.
const SUM_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("invalid descriptor input: {field} = {value}")]
    InvalidInput { field: &'static str, value: f64 },
}

/// Favourable band for one descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyBand {
    pub descriptor: &'static str,
    /// Upper edge of the favourable range; no penalty at or below.
    pub ideal_max: f64,
    /// Value at which the penalty term saturates at 1.
    pub saturation: f64,
}

/// Bands in [`RiskWeights::as_array`] order.
pub const BANDS: [PenaltyBand; 7] = [
    PenaltyBand { descriptor: "MW",       ideal_max: 400.0, saturation: 700.0 },
    PenaltyBand { descriptor: "LogP",     ideal_max: 3.0,   saturation: 7.0 },
    PenaltyBand { descriptor: "TPSA",     ideal_max: 120.0, saturation: 200.0 },
    PenaltyBand { descriptor: "RotBonds", ideal_max: 7.0,   saturation: 15.0 },
    PenaltyBand { descriptor: "ArRings",  ideal_max: 3.0,   saturation: 6.0 },
    PenaltyBand { descriptor: "HBD",      ideal_max: 3.0,   saturation: 7.0 },
    PenaltyBand { descriptor: "HBA",      ideal_max: 7.0,   saturation: 13.0 },
];

/// Weighted-penalty risk scorer.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    weights: RiskWeights,
}

impl RiskScorer {
    /// Weights not summing to 1 are renormalised.
    pub fn new(mut weights: RiskWeights) -> Self {
        if !weights.validate() {
            weights.normalise();
        }
        Self { weights }
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    /// Unweighted excess terms in [`BANDS`] order.
    pub fn penalties(&self, bundle: &DescriptorBundle) -> Result<[f64; 7], ScoreError> {
        check(bundle)?;
        let values = [
            bundle.molecular_weight,
            bundle.logp,
            bundle.tpsa,
            bundle.rotatable_bonds as f64,
            bundle.aromatic_rings as f64,
            bundle.hbd as f64,
            bundle.hba as f64,
        ];
        let mut out = [0.0; 7];
        for ((slot, value), band) in out.iter_mut().zip(values).zip(BANDS.iter()) {
            *slot = excess(value, band.ideal_max, band.saturation);
        }
        Ok(out)
    }

    /// Unrounded risk in [0, 1].
    pub fn score(&self, bundle: &DescriptorBundle) -> Result<f64, ScoreError> {
        let penalties = self.penalties(bundle)?;
        let risk: f64 = penalties
            .iter()
            .zip(self.weights.as_array().iter())
            .map(|(p, w)| p * w)
            .sum();
        if risk > 1.0 - SUM_EPSILON {
            return Ok(1.0);
        }
        Ok(risk.clamp(0.0, 1.0))
    }

    /// Unrounded `1 − risk`.
    pub fn drug_score(&self, bundle: &DescriptorBundle) -> Result<f64, ScoreError> {
        Ok(1.0 - self.score(bundle)?)
    }
}

fn check(bundle: &DescriptorBundle) -> Result<(), ScoreError> {
    let non_negative = [("molecular_weight", bundle.molecular_weight), ("tpsa", bundle.tpsa)];
    for (field, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(ScoreError::InvalidInput { field, value });
        }
    }
    if !bundle.logp.is_finite() {
        return Err(ScoreError::InvalidInput { field: "logp", value: bundle.logp });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocisift_common::InterpreterMode;

    fn bundle(mw: f64, logp: f64, tpsa: f64, rot: u32, ar: u32, hbd: u32, hba: u32) -> DescriptorBundle {
        DescriptorBundle {
            molecular_weight: mw,
            logp,
            hbd,
            hba,
            tpsa,
            rotatable_bonds: rot,
            aromatic_rings: ar,
            mode: InterpreterMode::Exact,
        }
    }

    fn acetaminophen() -> DescriptorBundle {
        bundle(151.16, 1.35, 49.33, 1, 1, 2, 3)
    }

    #[test]
    fn test_acetaminophen_is_low_risk() {
        let scorer = RiskScorer::default();
        let risk = scorer.score(&acetaminophen()).unwrap();
        assert!(risk <= 0.5);
        assert!(scorer.drug_score(&acetaminophen()).unwrap() >= 0.5);
    }

    #[test]
    fn test_score_bounded() {
        let scorer = RiskScorer::default();
        let worst = bundle(5000.0, 30.0, 900.0, 80, 20, 40, 60);
        assert_eq!(scorer.score(&worst).unwrap(), 1.0);
        assert_eq!(scorer.drug_score(&worst).unwrap(), 0.0);
        let best = bundle(0.0, -10.0, 0.0, 0, 0, 0, 0);
        assert_eq!(scorer.score(&best).unwrap(), 0.0);
    }

    #[test]
    fn test_monotone_in_molecular_weight() {
        let scorer = RiskScorer::default();
        let mut last = 0.0;
        for mw in [401.0, 450.0, 500.0, 650.0, 700.0, 900.0] {
            let risk = scorer.score(&bundle(mw, 2.0, 60.0, 3, 1, 1, 4)).unwrap();
            assert!(risk >= last, "risk fell at MW {mw}");
            last = risk;
        }
    }

    #[test]
    fn test_invalid_input_rejected() {
        let scorer = RiskScorer::default();
        let nan = bundle(f64::NAN, 1.0, 40.0, 1, 1, 1, 1);
        assert!(matches!(
            scorer.score(&nan),
            Err(ScoreError::InvalidInput { field: "molecular_weight", .. })
        ));
        let negative_tpsa = bundle(200.0, 1.0, -1.0, 1, 1, 1, 1);
        assert!(scorer.score(&negative_tpsa).is_err());
        let inf_logp = bundle(200.0, f64::INFINITY, 40.0, 1, 1, 1, 1);
        assert!(scorer.score(&inf_logp).is_err());
    }

    #[test]
    fn test_saturated_bands_reach_full_risk_for_rescaled_weights() {
        let weights = RiskWeights { molecular_weight: 0.3, logp: 0.3, hbd: 0.1, ..RiskWeights::default() };
        let scorer = RiskScorer::new(weights);
        let worst = bundle(5000.0, 30.0, 900.0, 80, 20, 40, 60);
        assert_eq!(scorer.score(&worst).unwrap(), 1.0);
    }

    #[test]
    fn test_unnormalised_weights_are_rescaled() {
        let weights = RiskWeights { molecular_weight: 2.0, ..RiskWeights::default() };
        let scorer = RiskScorer::new(weights);
        assert!(scorer.weights().validate());
    }
}
