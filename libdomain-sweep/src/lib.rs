mod check;
mod dns;
mod endpoint;
mod http;
pub mod names;
mod prober;
mod ratelimit;
mod rdap;
mod types;
mod verdict;

pub use check::Check;
pub use dns::DnsCheck;
pub use endpoint::{EndpointError, EndpointRegistry, IANA_BOOTSTRAP_URL};
pub use http::{create_http_pool, HttpCheck};
pub use prober::{ProbeError, Prober};
pub use ratelimit::KeyedRateLimiters;
pub use rdap::RdapCheck;
pub use types::{
    Availability, ErrorPolicy, NameReport, ProbeConfig, ProbeMethod, ProbeResult, Schedule,
    VerdictRule,
};
