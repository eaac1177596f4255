use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

pub const IANA_BOOTSTRAP_URL: &str = "https://data.iana.org/rdap/dns.json";

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Failed to fetch IANA bootstrap: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("Invalid domain format: {0}")]
    InvalidDomain(String),
}

#[derive(Debug, Deserialize)]
struct IanaBootstrap {
    services: Vec<(Vec<String>, Vec<String>)>,
}

/// Maps a TLD to its RDAP base URL, filled from the IANA bootstrap file on first use.
pub struct EndpointRegistry {
    endpoints: DashMap<String, String>,
    bootstrapped: AtomicBool,
    bootstrap_url: String,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::with_bootstrap_url(IANA_BOOTSTRAP_URL)
    }

    pub fn with_bootstrap_url(url: impl Into<String>) -> Self {
        Self {
            endpoints: DashMap::new(),
            bootstrapped: AtomicBool::new(false),
            bootstrap_url: url.into(),
        }
    }

    /// A registry that never fetches, serving only the given entries.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let registry = Self::new();
        for (tld, url) in entries {
            registry.insert(&tld, &url);
        }
        registry.bootstrapped.store(true, Ordering::Relaxed);
        registry
    }

    pub async fn bootstrap(&self, client: &Client) -> Result<(), EndpointError> {
        if self.bootstrapped.load(Ordering::Relaxed) {
            return Ok(());
        }

        let resp: IanaBootstrap = client
            .get(&self.bootstrap_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        for (tlds, urls) in resp.services {
            if let Some(url) = urls.first() {
                for tld in tlds {
                    self.insert(&tld, url);
                }
            }
        }

        self.bootstrapped.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub fn insert(&self, tld: &str, url: &str) {
        self.endpoints
            .insert(tld.to_lowercase(), url.trim_end_matches('/').to_string());
    }

    pub fn get_endpoint(&self, tld: &str) -> Option<String> {
        self.endpoints.get(&tld.to_lowercase()).map(|v| v.clone())
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The last label of `domain`; for `shop.co.in` that is `in`.
pub fn extract_tld(domain: &str) -> Result<String, EndpointError> {
    domain
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .filter(|s| !s.is_empty() && *s != domain)
        .map(|s| s.to_lowercase())
        .ok_or_else(|| EndpointError::InvalidDomain(domain.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_last_label() {
        assert_eq!(extract_tld("shop.co.in").unwrap(), "in");
        assert_eq!(extract_tld("MySite.NET").unwrap(), "net");
        assert!(extract_tld("localhost").is_err());
        assert!(extract_tld("").is_err());
    }

    #[test]
    fn seeded_registry_trims_and_lowercases() {
        let registry = EndpointRegistry::from_entries([(
            "NET".to_string(),
            "https://rdap.verisign.com/net/v1/".to_string(),
        )]);
        assert_eq!(
            registry.get_endpoint("net").as_deref(),
            Some("https://rdap.verisign.com/net/v1")
        );
        assert_eq!(registry.get_endpoint("us"), None);
    }
}
