use crate::{
    check::Check,
    endpoint::{extract_tld, EndpointRegistry},
    ratelimit::KeyedRateLimiters,
    types::{Availability, ProbeMethod},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::{sync::Arc, time::Duration};
use tracing::warn;

pub async fn check_rdap(
    client: &Client,
    endpoint: &str,
    domain: &str,
    timeout: Duration,
) -> Availability {
    let url = format!("{}/domain/{}", endpoint, domain);

    let result = tokio::time::timeout(timeout, client.get(&url).send()).await;

    match result {
        Ok(Ok(response)) => match response.status() {
            StatusCode::NOT_FOUND => Availability::Available,
            StatusCode::OK => Availability::Taken,
            StatusCode::TOO_MANY_REQUESTS => Availability::unknown("Rate limited"),
            status => Availability::unknown(format!("HTTP {}", status.as_u16())),
        },
        Ok(Err(e)) => Availability::error(format!("Request failed: {}", e)),
        Err(_) => Availability::error("Timeout"),
    }
}

/// Asks the registry's RDAP service, the one authoritative-ish source available.
pub struct RdapCheck {
    client: Client,
    registry: Arc<EndpointRegistry>,
    rate_limiters: Arc<KeyedRateLimiters<String>>,
    timeout: Duration,
}

impl RdapCheck {
    pub fn new(
        client: Client,
        registry: Arc<EndpointRegistry>,
        rate_limiters: Arc<KeyedRateLimiters<String>>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            registry,
            rate_limiters,
            timeout,
        }
    }
}

#[async_trait]
impl Check for RdapCheck {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Rdap
    }

    async fn check(&self, domain: &str) -> Availability {
        if let Err(e) = self.registry.bootstrap(&self.client).await {
            warn!(error = %e, "RDAP bootstrap failed");
            return Availability::unknown(format!("Bootstrap failed: {}", e));
        }

        let tld = match extract_tld(domain) {
            Ok(t) => t,
            Err(e) => return Availability::unknown(e.to_string()),
        };

        let Some(endpoint) = self.registry.get_endpoint(&tld) else {
            return Availability::unknown(format!("No RDAP endpoint for .{}", tld));
        };

        self.rate_limiters.acquire(&endpoint).await;

        check_rdap(&self.client, &endpoint, domain, self.timeout).await
    }
}
