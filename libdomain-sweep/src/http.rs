use crate::{check::Check, types::{Availability, ProbeMethod}};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub fn create_http_pool(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .use_rustls_tls()
        .build()
}

/// Sends `HEAD /` to the hostname, trying each scheme in turn.
///
/// Any HTTP response, whatever its status, means something is serving the
/// name. Failing to connect on every scheme is read as available.
pub struct HttpCheck {
    client: Client,
    timeout: Duration,
    schemes: Vec<&'static str>,
}

impl HttpCheck {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self::with_schemes(client, timeout, vec!["https", "http"])
    }

    pub fn with_schemes(client: Client, timeout: Duration, schemes: Vec<&'static str>) -> Self {
        Self {
            client,
            timeout,
            schemes,
        }
    }
}

#[async_trait]
impl Check for HttpCheck {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Http
    }

    async fn check(&self, domain: &str) -> Availability {
        let mut timed_out = false;

        for scheme in &self.schemes {
            let url = format!("{}://{}/", scheme, domain);
            let result = tokio::time::timeout(self.timeout, self.client.head(&url).send()).await;

            match result {
                Ok(Ok(response)) => {
                    debug!(%url, status = response.status().as_u16(), "HEAD answered");
                    return Availability::Taken;
                }
                Ok(Err(e)) if e.is_timeout() => timed_out = true,
                Ok(Err(e)) => debug!(%url, error = %e, "HEAD failed"),
                Err(_) => timed_out = true,
            }
        }

        if timed_out {
            Availability::error("HTTP timeout")
        } else {
            Availability::Available
        }
    }
}
