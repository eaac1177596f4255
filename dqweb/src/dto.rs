//! Request and response bodies for the check endpoint and NDJSON output.

use libdomain_sweep::{Availability, NameReport, ProbeResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Taken,
    Available,
}

impl Filter {
    /// `Taken` keeps every row that is not available, errors and unknowns included.
    pub fn keeps(self, status: AvailabilityStatus) -> bool {
        match self {
            Filter::All => true,
            Filter::Taken => status != AvailabilityStatus::Available,
            Filter::Available => status == AvailabilityStatus::Available,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub domains: Vec<String>,
    #[serde(default)]
    pub filter: Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Taken,
    Available,
    Error,
    Unknown,
}

impl From<&Availability> for AvailabilityStatus {
    fn from(availability: &Availability) -> Self {
        match availability {
            Availability::Available => AvailabilityStatus::Available,
            Availability::Taken => AvailabilityStatus::Taken,
            Availability::Error { .. } => AvailabilityStatus::Error,
            Availability::Unknown { .. } => AvailabilityStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCheckResult {
    pub domain: String,
    pub available: bool,
    pub status: AvailabilityStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
    pub elapsed_ms: u64,
}

impl From<ProbeResult> for DomainCheckResult {
    fn from(result: ProbeResult) -> Self {
        let status = AvailabilityStatus::from(&result.availability);
        Self {
            domain: result.domain,
            available: status == AvailabilityStatus::Available,
            status,
            reason: result.availability.reason().map(str::to_string),
            elapsed_ms: result.duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainGroup {
    pub base_domain: String,
    pub extensions: Vec<DomainCheckResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub results: Vec<DomainGroup>,
}

impl CheckResponse {
    /// Groups left with no extensions after filtering are dropped.
    pub fn from_reports(reports: Vec<NameReport>, filter: Filter) -> Self {
        let results = reports
            .into_iter()
            .filter_map(|report| {
                let extensions: Vec<DomainCheckResult> = report
                    .results
                    .into_iter()
                    .map(DomainCheckResult::from)
                    .filter(|r| filter.keeps(r.status))
                    .collect();

                (!extensions.is_empty() || filter == Filter::All).then(|| DomainGroup {
                    base_domain: report.base,
                    extensions,
                })
            })
            .collect();

        Self { results }
    }
}

/// One NDJSON line of `dqw check --ndjson`.
#[derive(Debug, Clone, Serialize)]
pub struct NdjsonLine {
    pub query: String,
    #[serde(flatten)]
    pub result: DomainCheckResult,
}
