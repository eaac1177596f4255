use crate::{check::Check, types::{Availability, ProbeMethod}};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::lookup_host;
use tracing::debug;

/// Resolves the hostname with the system resolver.
///
/// Any address counts as taken. A failed lookup counts as available, which
/// also covers "resolver unreachable"; there is no way to tell those apart here.
pub struct DnsCheck {
    timeout: Duration,
}

impl DnsCheck {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Check for DnsCheck {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Dns
    }

    async fn check(&self, domain: &str) -> Availability {
        let result = tokio::time::timeout(self.timeout, lookup_host((domain, 80))).await;

        match result {
            Ok(Ok(mut addrs)) => match addrs.next() {
                Some(addr) => {
                    debug!(domain, %addr, "DNS answer");
                    Availability::Taken
                }
                None => Availability::Available,
            },
            Ok(Err(e)) => {
                debug!(domain, error = %e, "DNS lookup failed");
                Availability::Available
            }
            Err(_) => Availability::error("DNS timeout"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn localhost_is_taken() {
        let check = DnsCheck::new(Duration::from_secs(5));
        assert_eq!(check.check("localhost").await, Availability::Taken);
    }

    #[tokio::test]
    async fn invalid_tld_is_not_taken() {
        let check = DnsCheck::new(Duration::from_secs(5));
        // A resolver that never answers ends in a timeout instead; either way it is not taken.
        assert!(!check.check("no-such-name.invalid").await.is_taken());
    }
}
