//! Lipinski Rule of Five.

use nocisift_common::{DescriptorBundle, LipinskiResult, LipinskiRule};

/// Evaluate every rule independently. Violations come back in
/// [`LipinskiRule::ALL`] order; the bundle passes only with none.
pub fn evaluate(bundle: &DescriptorBundle) -> LipinskiResult {
    let violations: Vec<LipinskiRule> = LipinskiRule::ALL
        .iter()
        .copied()
        .filter(|rule| violates(*rule, bundle))
        .collect();

    LipinskiResult { pass: violations.is_empty(), violations }
}

fn violates(rule: LipinskiRule, d: &DescriptorBundle) -> bool {
    match rule {
        LipinskiRule::MolecularWeight => d.molecular_weight > 500.0,
        LipinskiRule::Lipophilicity => d.logp > 5.0,
        LipinskiRule::DonorCount => d.hbd > 5,
        LipinskiRule::AcceptorCount => d.hba > 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocisift_common::InterpreterMode;
    use pretty_assertions::assert_eq;

    fn bundle(mw: f64, logp: f64, hbd: u32, hba: u32) -> DescriptorBundle {
        DescriptorBundle {
            molecular_weight: mw,
            logp,
            hbd,
            hba,
            tpsa: 40.0,
            rotatable_bonds: 2,
            aromatic_rings: 1,
            mode: InterpreterMode::Exact,
        }
    }

    #[test]
    fn heavy_molecule_fails_only_on_weight() {
        let result = evaluate(&bundle(600.0, 1.0, 1, 1));
        assert!(!result.pass);
        assert_eq!(result.violations, vec![LipinskiRule::MolecularWeight]);
    }

    #[test]
    fn thresholds_are_strict() {
        let result = evaluate(&bundle(500.0, 5.0, 5, 10));
        assert!(result.pass);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn all_violations_collected_in_rule_order() {
        let result = evaluate(&bundle(812.3, 6.2, 7, 14));
        assert_eq!(result.violations, LipinskiRule::ALL.to_vec());
        assert_eq!(result.violation_labels(), "MW>500|LogP>5|HBD>5|HBA>10");
    }
}
