//! Configuration loading for nocisift.
//! Reads nocisift.toml from the current directory or the path in NOCISIFT_CONFIG.

use std::path::Path;
use std::time::Duration;

use nocisift_common::{InterpreterMode, NocisiftError, Target, TargetCatalog};
use nocisift_ingestion::sources::chembl::{ChemblSettings, CHEMBL_API_URL, MAX_PAGE_SIZE};
use nocisift_ranker::{RiskWeights, SearchBounds};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub descriptors: DescriptorConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Risk weight override; built-in weights when absent.
    pub scoring: Option<RiskWeights>,
    /// Extra catalog entries appended to the built-in targets.
    #[serde(default)]
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: default_database_url() }
    }
}

fn default_database_url() -> String { "sqlite://nocisift.db".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_standard_type")]
    pub standard_type: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            standard_type: default_standard_type(),
        }
    }
}

fn default_base_url()      -> String { CHEMBL_API_URL.to_string() }
fn default_timeout_secs()  -> u64    { 30 }
fn default_page_size()     -> usize  { 200 }
fn default_standard_type() -> String { "IC50".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    #[serde(default)]
    pub mode: InterpreterMode,
    /// LRU entries; 0 disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self { mode: InterpreterMode::default(), cache_capacity: default_cache_capacity() }
    }
}

fn default_cache_capacity() -> usize { 4096 }

/// Request defaults and the ranges the command line accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_potency_ceiling")]
    pub potency_ceiling_nm: f64,
    #[serde(default = "default_potency_min")]
    pub potency_min_nm: f64,
    #[serde(default = "default_potency_max")]
    pub potency_max_nm: f64,

    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_limit_min")]
    pub limit_min: usize,
    #[serde(default = "default_limit_max")]
    pub limit_max: usize,

    /// Caller-side threshold on the drug score, applied after ranking.
    #[serde(default = "default_drug_score_min")]
    pub drug_score_min: f64,

    #[serde(default = "bool_true")]
    pub lipinski_only: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            potency_ceiling_nm: default_potency_ceiling(),
            potency_min_nm: default_potency_min(),
            potency_max_nm: default_potency_max(),
            limit: default_limit(),
            limit_min: default_limit_min(),
            limit_max: default_limit_max(),
            drug_score_min: default_drug_score_min(),
            lipinski_only: bool_true(),
        }
    }
}

fn default_potency_ceiling() -> f64   { 1000.0 }
fn default_potency_min()     -> f64   { 10.0 }
fn default_potency_max()     -> f64   { 10_000.0 }
fn default_limit()           -> usize { 100 }
fn default_limit_min()       -> usize { 10 }
fn default_limit_max()       -> usize { 500 }
fn default_drug_score_min()  -> f64   { 0.5 }
fn bool_true()               -> bool  { true }


impl Config {
    /// Load configuration from nocisift.toml.
    /// Checks NOCISIFT_CONFIG first, then the current directory. A missing
    /// file yields the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("NOCISIFT_CONFIG").unwrap_or_else(|_| "nocisift.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Config file not found: {}. Using defaults; copy nocisift.example.toml to nocisift.toml to customise.",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, NocisiftError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NocisiftError> {
        let r = &self.retrieval;
        if r.timeout_secs == 0 {
            return Err(NocisiftError::config("retrieval.timeout_secs", "must be at least 1"));
        }
        if r.page_size == 0 || r.page_size > MAX_PAGE_SIZE {
            return Err(NocisiftError::config(
                "retrieval.page_size",
                format!("{} is outside 1..={MAX_PAGE_SIZE}", r.page_size),
            ));
        }

        let s = &self.search;
        if !(s.potency_min_nm > 0.0 && s.potency_min_nm <= s.potency_max_nm) {
            return Err(NocisiftError::config(
                "search.potency_min_nm",
                format!("{} must be positive and at most potency_max_nm ({})", s.potency_min_nm, s.potency_max_nm),
            ));
        }
        if !(s.potency_min_nm..=s.potency_max_nm).contains(&s.potency_ceiling_nm) {
            return Err(NocisiftError::config(
                "search.potency_ceiling_nm",
                format!("{} is outside {}..={}", s.potency_ceiling_nm, s.potency_min_nm, s.potency_max_nm),
            ));
        }
        if s.limit_min == 0 || s.limit_min > s.limit_max {
            return Err(NocisiftError::config(
                "search.limit_min",
                format!("{} must be at least 1 and at most limit_max ({})", s.limit_min, s.limit_max),
            ));
        }
        if !(s.limit_min..=s.limit_max).contains(&s.limit) {
            return Err(NocisiftError::config(
                "search.limit",
                format!("{} is outside {}..={}", s.limit, s.limit_min, s.limit_max),
            ));
        }
        if !(0.0..=1.0).contains(&s.drug_score_min) {
            return Err(NocisiftError::config(
                "search.drug_score_min",
                format!("{} is outside 0..=1", s.drug_score_min),
            ));
        }

        if let Some(weights) = &self.scoring {
            if !weights.is_usable() {
                return Err(NocisiftError::config(
                    "scoring",
                    "weights must be finite, non-negative and not all zero",
                ));
            }
        }

        self.catalog()?;
        Ok(())
    }

    pub fn chembl_settings(&self) -> ChemblSettings {
        ChemblSettings {
            base_url: self.retrieval.base_url.clone(),
            timeout: self.retrieval_timeout(),
            page_size: self.retrieval.page_size,
            standard_type: self.retrieval.standard_type.clone(),
        }
    }

    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_secs(self.retrieval.timeout_secs)
    }

    pub fn search_bounds(&self) -> SearchBounds {
        SearchBounds {
            potency_min_nm: self.search.potency_min_nm,
            potency_max_nm: self.search.potency_max_nm,
            limit_min: self.search.limit_min,
            limit_max: self.search.limit_max,
        }
    }

    pub fn catalog(&self) -> Result<TargetCatalog, NocisiftError> {
        TargetCatalog::with_extra(self.targets.clone())
    }
}
