//! ChEMBL activity client.
//!
//! ChEMBL is EMBL-EBI's database of bioactive molecules. The screening
//! pipeline only needs one resource from it: `activity`, filtered by target,
//! measurement type and potency.
//!
//! API docs: https://chembl.gitbook.io/chembl-interface-documentation/web-resources/chembl-api
//! Endpoint: https://www.ebi.ac.uk/chembl/api/data
//!
//! Activity rows carry `molecule_chembl_id`, `canonical_smiles` and a
//! `standard_value` that ChEMBL serialises as a decimal string.

use std::time::Duration;

use async_trait::async_trait;
use nocisift_common::sandbox::{SandboxClient, DEFAULT_TIMEOUT};
use nocisift_common::entities::AssayMetadata;
use nocisift_common::{BioactivityRecord, NocisiftError};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{BioactivitySource, RetrievalError};

pub const CHEMBL_API_URL: &str = "https://www.ebi.ac.uk/chembl/api/data";

/// ChEMBL rejects larger pages.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Connection settings for [`ChemblClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChemblSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: usize,
    pub standard_type: String,
}

impl Default for ChemblSettings {
    fn default() -> Self {
        Self {
            base_url: CHEMBL_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            page_size: 200,
            standard_type: "IC50".to_string(),
        }
    }
}

/// ChEMBL client for target activity data.
#[derive(Debug, Clone)]
pub struct ChemblClient {
    client: SandboxClient,
    base_url: Url,
    page_size: usize,
    standard_type: String,
}

impl ChemblClient {
    pub fn new() -> Result<Self, NocisiftError> {
        Self::with_settings(ChemblSettings::default())
    }

    pub fn with_settings(settings: ChemblSettings) -> Result<Self, NocisiftError> {
        if settings.page_size == 0 || settings.page_size > MAX_PAGE_SIZE {
            return Err(NocisiftError::config(
                "retrieval.page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", settings.page_size),
            ));
        }
        if settings.standard_type.trim().is_empty() {
            return Err(NocisiftError::config("retrieval.standard_type", "must not be empty"));
        }

        // Url::join drops the last segment unless the base ends in '/'
        let mut base = settings.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| NocisiftError::config("retrieval.base_url", format!("'{}': {e}", settings.base_url)))?;

        let mut client = SandboxClient::with_timeout(settings.timeout)?;
        client.allow_url(base_url.as_str())?;

        Ok(Self {
            client,
            base_url,
            page_size: settings.page_size,
            standard_type: settings.standard_type,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.client.timeout()
    }

    fn activity_url(&self) -> Result<Url, RetrievalError> {
        self.base_url
            .join("activity.json")
            .map_err(|e| RetrievalError::Malformed(format!("activity URL: {e}")))
    }

    /// Resolve `page_meta.next`, which ChEMBL returns as a host-relative path.
    fn next_url(&self, next: &str) -> Result<Url, RetrievalError> {
        self.base_url
            .join(next)
            .map_err(|e| RetrievalError::Malformed(format!("page_meta.next '{next}': {e}")))
    }

    async fn get_json(&self, url: &Url, query: &[(&str, String)]) -> Result<Value, RetrievalError> {
        let mut request = self.client.get(url.as_str())?;
        if !query.is_empty() {
            request = request.query(query);
        }
        let resp = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RetrievalError::RateLimited);
        }
        if !status.is_success() {
            return Err(RetrievalError::Http { status: status.as_u16(), url: url.to_string() });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| RetrievalError::Malformed(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> RetrievalError {
        if e.is_timeout() {
            RetrievalError::Timeout(self.client.timeout())
        } else {
            RetrievalError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl BioactivitySource for ChemblClient {
    #[instrument(skip(self))]
    async fn fetch_bioactivities(
        &self,
        accession: &str,
        potency_ceiling_nm: f64,
        limit: usize,
    ) -> Result<Vec<BioactivityRecord>, RetrievalError> {
        let mut records = Vec::new();
        let mut url = self.activity_url()?;
        let mut first = true;
        let mut skipped = 0usize;

        while records.len() < limit {
            let query = if first {
                let page = self.page_size.min(limit - records.len());
                vec![
                    ("target_chembl_id", accession.to_string()),
                    ("standard_type", self.standard_type.clone()),
                    ("standard_units", "nM".to_string()),
                    ("standard_value__lte", potency_ceiling_nm.to_string()),
                    ("limit", page.to_string()),
                    ("offset", "0".to_string()),
                ]
            } else {
                Vec::new()
            };
            first = false;

            debug!(url = %url, collected = records.len(), "Fetching ChEMBL activity page");
            let json = self.get_json(&url, &query).await?;
            let page = parse_activity_page(&json, accession, potency_ceiling_nm)?;
            skipped += page.skipped;

            if page.records.is_empty() && page.skipped == 0 {
                break;
            }
            records.extend(page.records);

            match page.next {
                Some(next) => url = self.next_url(&next)?,
                None => break,
            }
        }

        records.truncate(limit);
        if skipped > 0 {
            warn!(accession, skipped, "Skipped incomplete ChEMBL activity rows");
        }
        info!(accession, count = records.len(), "ChEMBL activities retrieved");
        Ok(records)
    }
}

/// One decoded page of the `activity` resource.
#[derive(Debug, Default)]
pub struct ActivityPage {
    pub records: Vec<BioactivityRecord>,
    /// Rows missing an id, structure or usable potency.
    pub skipped: usize,
    pub next: Option<String>,
}

/// Decode an `activity.json` page. Rows without a molecule id, structure
/// notation or finite non-negative potency at or below the ceiling are
/// counted as skipped rather than failing the page.
pub fn parse_activity_page(
    json: &Value,
    accession: &str,
    potency_ceiling_nm: f64,
) -> Result<ActivityPage, RetrievalError> {
    let rows = json["activities"]
        .as_array()
        .ok_or_else(|| RetrievalError::Malformed("missing `activities` array".to_string()))?;

    let mut page = ActivityPage {
        next: json["page_meta"]["next"].as_str().map(String::from),
        ..ActivityPage::default()
    };

    for row in rows {
        match parse_activity_row(row, accession) {
            Some(record) if record.potency_nm <= potency_ceiling_nm => page.records.push(record),
            _ => page.skipped += 1,
        }
    }
    Ok(page)
}

fn parse_activity_row(row: &Value, accession: &str) -> Option<BioactivityRecord> {
    let compound_id = non_empty(&row["molecule_chembl_id"])?;
    let smiles = non_empty(&row["canonical_smiles"])?;
    let potency_nm = numeric(&row["standard_value"]).filter(|v| v.is_finite() && *v >= 0.0)?;

    Some(BioactivityRecord {
        target: non_empty(&row["target_pref_name"]).unwrap_or_else(|| accession.to_string()),
        compound_id,
        smiles,
        potency_nm,
        assay: AssayMetadata {
            assay_id: non_empty(&row["assay_chembl_id"]),
            assay_type: non_empty(&row["assay_type"]),
            standard_type: non_empty(&row["standard_type"]),
            description: non_empty(&row["assay_description"]),
            pchembl_value: numeric(&row["pchembl_value"]),
        },
    })
}

fn non_empty(v: &Value) -> Option<String> {
    v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// ChEMBL sends decimals as strings; accept either form.
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
