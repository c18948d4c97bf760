use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::NocisiftError;

/// Request timeout applied when the caller does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP client that only talks to approved hosts.
/// Every outbound request from the retrieval layer goes through this.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
    timeout: Duration,
}

impl SandboxClient {
    /// Creates a client with the default allowlist of public chemistry databases.
    pub fn new() -> Result<Self, NocisiftError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests are bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, NocisiftError> {
        if timeout.is_zero() {
            return Err(NocisiftError::config("retrieval.timeout_secs", "timeout must be greater than zero"));
        }

        let mut allowlist = HashSet::new();
        let domains = [
            "www.ebi.ac.uk",            // ChEMBL
            "pubchem.ncbi.nlm.nih.gov", // PubChem
            "localhost",
            "127.0.0.1",
        ];
        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("nocisift/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NocisiftError::HttpClient(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Adds the host of `url` to the allowlist.
    pub fn allow_url(&mut self, url: &str) -> Result<(), NocisiftError> {
        let parsed = Url::parse(url)
            .map_err(|e| NocisiftError::config("retrieval.base_url", format!("'{url}' is not a valid URL: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| NocisiftError::config("retrieval.base_url", format!("'{url}' has no host")))?;
        self.allow_domain(host);
        Ok(())
    }

    /// Validates if a URL is permitted under the current policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// GET request builder for an allowed URL.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, NocisiftError> {
        if !self.is_allowed(url) {
            tracing::warn!(url, "Blocked request to host outside allowlist");
            return Err(NocisiftError::Security(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }
}
