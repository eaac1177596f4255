use crate::types::{Availability, ProbeMethod};
use async_trait::async_trait;

/// A single way of asking whether a hostname is in use.
///
/// Implementations never fail: transport problems are folded into
/// `Availability::Error` so the prober can apply one policy to all of them.
#[async_trait]
pub trait Check: Send + Sync {
    fn method(&self) -> ProbeMethod;

    async fn check(&self, domain: &str) -> Availability;
}
