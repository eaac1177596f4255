use libdomain_sweep::{
    names::{adjust_extensions, default_extensions},
    ErrorPolicy, ProbeConfig, ProbeMethod, Schedule, VerdictRule,
};
use serde::Deserialize;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub extensions: ExtensionConfig,
    #[serde(default)]
    pub probe: ProbeSection,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Upper bound on base names per request.
    pub max_names: usize,
    /// Empty allows every origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_names: 100,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub list: Vec<String>,
    pub always: Vec<String>,
    pub never: Vec<String>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            list: default_extensions(),
            always: Vec::new(),
            never: Vec::new(),
        }
    }
}

impl ExtensionConfig {
    pub fn resolve(&self) -> Vec<String> {
        adjust_extensions(self.list.clone(), &self.always, &self.never)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProbeSection {
    pub methods: Vec<ProbeMethod>,
    pub verdict: VerdictRule,
    pub schedule: Schedule,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub max_concurrent: usize,
    pub timeout_ms: u64,
    pub on_error: ErrorPolicy,
    pub api_fallback: bool,
    pub rdap_rate_per_second: u32,
}

impl Default for ProbeSection {
    fn default() -> Self {
        let defaults = ProbeConfig::default();
        Self {
            methods: defaults.methods,
            verdict: defaults.verdict,
            schedule: defaults.schedule,
            batch_size: defaults.batch_size,
            batch_delay_ms: defaults.batch_delay.as_millis() as u64,
            max_concurrent: defaults.max_concurrent,
            timeout_ms: defaults.timeout.as_millis() as u64,
            on_error: defaults.on_error,
            api_fallback: defaults.api_fallback,
            rdap_rate_per_second: defaults.max_rate_per_endpoint,
        }
    }
}

impl ProbeSection {
    pub fn to_probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            methods: self.methods.clone(),
            verdict: self.verdict,
            schedule: self.schedule,
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            max_concurrent: self.max_concurrent,
            on_error: self.on_error,
            api_fallback: self.api_fallback,
            max_rate_per_endpoint: self.rdap_rate_per_second,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests per client IP per minute; 0 disables limiting.
    pub requests_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 30,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dqw").join("config.toml"))
}

/// Loads `path`, or the default location when `None`.
///
/// A missing file means defaults. A broken one is logged and also means defaults.
pub fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        return Config::default();
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Config::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read config, using defaults");
            return Config::default();
        }
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            Config::default()
        }
    }
}

pub fn get_default_config_toml() -> String {
    r#"# dqw configuration

[server]
bind = "127.0.0.1:3000"
# Base names accepted per request
max_names = 100
# Allowed CORS origins; empty allows all
cors_origins = []

[extensions]
# Extensions appended to every base name, in this order
list = [".net", ".co", ".co.in", ".in", ".us"]
# Extensions to add in front of the list / drop from it
# always = [".com"]
always = []
never = []

[probe]
# Any of "dns", "http", "rdap"
methods = ["dns"]
# "any-taken" or "majority"
verdict = "any-taken"
# "sequential", "batched" or "unordered"
schedule = "batched"
batch_size = 5
batch_delay_ms = 100
max_concurrent = 20
timeout_ms = 3000
# Report failed probes as "available" or "error"
on_error = "available"
# Ask RDAP when the probes above are inconclusive
api_fallback = false
rdap_rate_per_second = 20

[rate_limit]
# Requests per client IP per minute, 0 disables
requests_per_minute = 30
"#
    .to_string()
}
