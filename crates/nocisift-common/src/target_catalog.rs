//! Catalog of non-opioid cancer-pain targets.
//!
//! The built-in entries cover the receptors and channels the screen was
//! designed around. Deployments may append entries via `[[targets]]` in
//! nocisift.toml; the catalog itself is read-only once built.

use serde::{Deserialize, Serialize};

use crate::error::{NocisiftError, Result};

/// A selectable protein target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Display name shown to the user (e.g., "Nav1.7 (SCN9A)")
    pub name: String,

    /// ChEMBL target accession (e.g., "CHEMBL4296")
    pub accession: String,

    /// Human-readable summary of the target's role in cancer pain
    #[serde(default)]
    pub description: String,
}

impl Target {
    fn new(name: &str, accession: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            accession: accession.to_string(),
            description: description.to_string(),
        }
    }
}

/// Ordered, immutable list of targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCatalog {
    targets: Vec<Target>,
}

impl Default for TargetCatalog {
    fn default() -> Self {
        Self { targets: builtin_targets() }
    }
}

// ── Built-in targets ──────────────────────────────────────────────────────────

fn builtin_targets() -> Vec<Target> {
    vec![
        Target::new(
            "COX-2 (PTGS2)",
            "CHEMBL230",
            "Cyclooxygenase-2. Drives prostaglandin-mediated inflammatory and bone-metastasis pain.",
        ),
        Target::new(
            "TRPV1",
            "CHEMBL4794",
            "Capsaicin receptor. Tumour acidosis sensitises TRPV1 on nociceptors innervating the tumour bed.",
        ),
        Target::new(
            "Nav1.7 (SCN9A)",
            "CHEMBL4296",
            "Peripheral sodium channel gating nociceptor firing; loss-of-function causes congenital insensitivity to pain.",
        ),
        Target::new(
            "Nav1.8 (SCN10A)",
            "CHEMBL5451",
            "TTX-resistant sodium channel carrying most of the action-potential upstroke in sensory neurons.",
        ),
        Target::new(
            "CB2 (CNR2)",
            "CHEMBL253",
            "Peripheral cannabinoid receptor. Analgesic in bone-cancer models without CB1 psychoactivity.",
        ),
        Target::new(
            "TrkA (NTRK1)",
            "CHEMBL2815",
            "NGF receptor. Tumour-derived NGF sprouts sensory fibres and sustains cancer-induced bone pain.",
        ),
        Target::new(
            "P2X3 (P2RX3)",
            "CHEMBL2998",
            "ATP-gated channel on nociceptors activated by ATP released from necrotic tumour tissue.",
        ),
    ]
}

// ── Lookup ────────────────────────────────────────────────────────────────────

impl TargetCatalog {
    /// Built-in targets followed by `extra`, rejecting duplicates by name or accession.
    pub fn with_extra(extra: Vec<Target>) -> Result<Self> {
        let mut catalog = Self::default();
        for target in extra {
            if target.name.trim().is_empty() {
                return Err(NocisiftError::config("targets.name", "target name must not be empty"));
            }
            if !target.accession.starts_with("CHEMBL") {
                return Err(NocisiftError::config(
                    "targets.accession",
                    format!("'{}' is not a ChEMBL target accession", target.accession),
                ));
            }
            if catalog.targets.iter().any(|t| t.name == target.name || t.accession == target.accession) {
                return Err(NocisiftError::config(
                    "targets",
                    format!("duplicate target '{}' ({})", target.name, target.accession),
                ));
            }
            catalog.targets.push(target);
        }
        Ok(catalog)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Display names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    /// Resolve a user-supplied target: exact name, then case-insensitive
    /// name, then accession.
    pub fn resolve(&self, query: &str) -> Result<&Target> {
        let query = query.trim();
        self.targets
            .iter()
            .find(|t| t.name == query)
            .or_else(|| self.targets.iter().find(|t| t.name.eq_ignore_ascii_case(query)))
            .or_else(|| self.targets.iter().find(|t| t.accession.eq_ignore_ascii_case(query)))
            .ok_or_else(|| NocisiftError::UnknownTarget(query.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = TargetCatalog::default();
        assert_eq!(catalog.len(), 7);
        assert!(catalog.names().contains(&"TRPV1"));
        assert!(catalog.iter().all(|t| t.accession.starts_with("CHEMBL")));
    }

    #[test]
    fn test_resolve_by_name_case_and_accession() {
        let catalog = TargetCatalog::default();
        assert_eq!(catalog.resolve("TRPV1").unwrap().accession, "CHEMBL4794");
        assert_eq!(catalog.resolve("nav1.7 (scn9a)").unwrap().accession, "CHEMBL4296");
        assert_eq!(catalog.resolve("chembl230").unwrap().name, "COX-2 (PTGS2)");
    }

    #[test]
    fn test_resolve_unknown_target() {
        let catalog = TargetCatalog::default();
        let err = catalog.resolve("mu-opioid receptor").unwrap_err();
        assert!(matches!(err, NocisiftError::UnknownTarget(_)));
    }

    #[test]
    fn test_with_extra_rejects_duplicates() {
        let dup = Target::new("TRPV1 again", "CHEMBL4794", "");
        let err = TargetCatalog::with_extra(vec![dup]).unwrap_err();
        assert!(err.to_string().contains("duplicate target"));

        let ok = Target::new("TRPA1", "CHEMBL6007", "Irritant receptor");
        let catalog = TargetCatalog::with_extra(vec![ok]).unwrap();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.resolve("TRPA1").unwrap().accession, "CHEMBL6007");
    }

    #[test]
    fn test_toml_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            targets: Vec<Target>,
        }
        let wrapper = Wrapper { targets: builtin_targets() };
        let text = toml::to_string(&wrapper).unwrap();
        let parsed: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(parsed.targets, wrapper.targets);
    }
}
