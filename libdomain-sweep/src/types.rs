use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
    /// The probe itself failed (timeout, transport error).
    Error { reason: String },
    /// The probe ran but its answer was inconclusive.
    Unknown { reason: String },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn is_taken(&self) -> bool {
        matches!(self, Availability::Taken)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Availability::Unknown { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Availability::Error { .. })
    }

    pub fn is_conclusive(&self) -> bool {
        self.is_available() || self.is_taken()
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Availability::Error { reason } | Availability::Unknown { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Availability::Error { reason: reason.into() }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Availability::Unknown { reason: reason.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub domain: String,
    pub availability: Availability,
    pub duration: Duration,
}

/// Every probed extension of one base name.
#[derive(Debug, Clone)]
pub struct NameReport {
    pub base: String,
    pub results: Vec<ProbeResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    Dns,
    Http,
    Rdap,
}

impl ProbeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeMethod::Dns => "dns",
            ProbeMethod::Http => "http",
            ProbeMethod::Rdap => "rdap",
        }
    }
}

/// How verdicts from several methods are folded into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictRule {
    #[default]
    AnyTaken,
    Majority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Sequential,
    #[default]
    Batched,
    Unordered,
}

/// What an `Availability::Error` is reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Available,
    Error,
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout: Duration,
    pub methods: Vec<ProbeMethod>,
    pub verdict: VerdictRule,
    pub schedule: Schedule,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub max_concurrent: usize,
    pub on_error: ErrorPolicy,
    pub api_fallback: bool,
    pub max_rate_per_endpoint: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            methods: vec![ProbeMethod::Dns],
            verdict: VerdictRule::AnyTaken,
            schedule: Schedule::Batched,
            batch_size: 5,
            batch_delay: Duration::from_millis(100),
            max_concurrent: 20,
            on_error: ErrorPolicy::Available,
            api_fallback: false,
            max_rate_per_endpoint: 20,
        }
    }
}
