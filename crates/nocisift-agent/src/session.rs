//! Interactive search state owned by the binary.

use nocisift_common::Candidate;
use nocisift_ranker::SearchReport;

/// Aggregates shown above a result table.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub count: usize,
    pub mean_potency_nm: f64,
    pub mean_drug_score: f64,
    pub lipinski_passing: usize,
    pub mean_molecular_weight: f64,
}

/// Results of the most recent search, after the drug-score threshold.
/// Each new search replaces the previous one.
#[derive(Debug, Default)]
pub struct SearchSession {
    last_target: Option<String>,
    results: Vec<Candidate>,
    below_threshold: usize,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the candidates scoring at least `drug_score_min`. The report's
    /// order is preserved.
    pub fn record(&mut self, report: SearchReport, drug_score_min: f64) -> &[Candidate] {
        let total = report.candidates.len();
        self.results = report
            .candidates
            .into_iter()
            .filter(|c| c.drug_score >= drug_score_min)
            .collect();
        self.below_threshold = total - self.results.len();
        self.last_target = Some(report.target.name);
        &self.results
    }

    pub fn last_target(&self) -> Option<&str> {
        self.last_target.as_deref()
    }

    pub fn results(&self) -> &[Candidate] {
        &self.results
    }

    pub fn below_threshold(&self) -> usize {
        self.below_threshold
    }

    /// Best `n` candidates.
    pub fn top(&self, n: usize) -> &[Candidate] {
        &self.results[..n.min(self.results.len())]
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        if self.results.is_empty() {
            return None;
        }
        let n = self.results.len() as f64;
        let mean = |f: fn(&Candidate) -> f64| self.results.iter().map(f).sum::<f64>() / n;
        Some(SessionSummary {
            count: self.results.len(),
            mean_potency_nm: mean(|c| c.potency_nm),
            mean_drug_score: mean(|c| c.drug_score),
            lipinski_passing: self.results.iter().filter(|c| c.lipinski.pass).count(),
            mean_molecular_weight: mean(|c| c.descriptors.molecular_weight),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocisift_common::{DescriptorBundle, InterpreterMode, LipinskiResult, TargetCatalog};

    fn candidate(id: &str, drug_score: f64, pass: bool) -> Candidate {
        Candidate {
            compound_id: id.to_string(),
            target: "TRPV1".to_string(),
            smiles: "CCO".to_string(),
            potency_nm: 100.0,
            descriptors: DescriptorBundle {
                molecular_weight: 300.0,
                logp: 2.0,
                hbd: 1,
                hba: 2,
                tpsa: 40.0,
                rotatable_bonds: 2,
                aromatic_rings: 1,
                mode: InterpreterMode::Exact,
            },
            lipinski: LipinskiResult { pass, violations: vec![] },
            risk_score: 1.0 - drug_score,
            drug_score,
        }
    }

    fn report(candidates: Vec<Candidate>) -> SearchReport {
        SearchReport {
            target: TargetCatalog::default().resolve("TRPV1").unwrap().clone(),
            candidates,
            retrieved: 3,
            duplicates_collapsed: 0,
            dropped: vec![],
            lipinski_excluded: 0,
            mode: InterpreterMode::Exact,
        }
    }

    #[test]
    fn test_threshold_keeps_order() {
        let mut session = SearchSession::new();
        let kept = session.record(
            report(vec![candidate("A", 0.9, true), candidate("B", 0.5, true), candidate("C", 0.49, false)]),
            0.5,
        );
        let ids: Vec<_> = kept.iter().map(|c| c.compound_id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
        assert_eq!(session.below_threshold(), 1);
        assert_eq!(session.last_target(), Some("TRPV1"));
    }

    #[test]
    fn test_summary_and_top() {
        let mut session = SearchSession::new();
        assert!(session.summary().is_none());

        session.record(report(vec![candidate("A", 0.8, true), candidate("B", 0.6, false)]), 0.0);
        let summary = session.summary().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.lipinski_passing, 1);
        assert!((summary.mean_drug_score - 0.7).abs() < 1e-12);
        assert_eq!(session.top(6).len(), 2);
        assert_eq!(session.top(1)[0].compound_id, "A");
    }
}
