use crate::{
    check::Check,
    dns::DnsCheck,
    endpoint::EndpointRegistry,
    http::{create_http_pool, HttpCheck},
    names::expand_extensions,
    ratelimit::KeyedRateLimiters,
    rdap::RdapCheck,
    types::{NameReport, ProbeConfig, ProbeMethod, ProbeResult, Schedule},
    verdict::{apply_policy, combine},
};
use futures::{
    future::join_all,
    stream::{self, Stream, StreamExt},
};
use reqwest::Client;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Instant,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub struct Prober {
    checks: Vec<Arc<dyn Check>>,
    fallback: Option<Arc<dyn Check>>,
    config: ProbeConfig,
}

impl Prober {
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_config(ProbeConfig::default())
    }

    pub fn with_config(config: ProbeConfig) -> Result<Self, ProbeError> {
        let client = create_http_pool(config.timeout)?;
        Ok(Self::with_client(config, client, Arc::new(EndpointRegistry::new())))
    }

    /// Builds the configured methods around an existing client and RDAP registry.
    pub fn with_client(config: ProbeConfig, client: Client, registry: Arc<EndpointRegistry>) -> Self {
        let rate_limiters = Arc::new(KeyedRateLimiters::per_second(config.max_rate_per_endpoint));
        let rdap = || -> Arc<dyn Check> {
            Arc::new(RdapCheck::new(
                client.clone(),
                Arc::clone(&registry),
                Arc::clone(&rate_limiters),
                config.timeout,
            ))
        };

        let checks = config
            .methods
            .iter()
            .map(|method| -> Arc<dyn Check> {
                match method {
                    ProbeMethod::Dns => Arc::new(DnsCheck::new(config.timeout)),
                    ProbeMethod::Http => Arc::new(HttpCheck::new(client.clone(), config.timeout)),
                    ProbeMethod::Rdap => rdap(),
                }
            })
            .collect();

        let fallback = config.api_fallback.then(rdap);

        Self {
            checks,
            fallback,
            config,
        }
    }

    /// Uses caller-supplied checks instead of the network-backed ones.
    pub fn with_checks(
        config: ProbeConfig,
        checks: Vec<Arc<dyn Check>>,
        fallback: Option<Arc<dyn Check>>,
    ) -> Self {
        Self {
            checks,
            fallback,
            config,
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub async fn probe_one(&self, domain: &str) -> ProbeResult {
        let start = Instant::now();

        let mut availability = combine(&self.checks, self.config.verdict, domain).await;

        if !availability.is_conclusive() {
            if let Some(fallback) = &self.fallback {
                let answer = fallback.check(domain).await;
                debug!(domain, method = fallback.method().as_str(), ?answer, "fallback consulted");
                if answer.is_conclusive() {
                    availability = answer;
                }
            }
        }

        let availability = apply_policy(availability, self.config.on_error);
        debug!(domain, ?availability, "probed");

        ProbeResult {
            domain: domain.to_string(),
            availability,
            duration: start.elapsed(),
        }
    }

    /// Probes every domain with the configured schedule.
    ///
    /// `Sequential` and `Batched` return results in input order, `Unordered`
    /// in completion order.
    pub async fn probe_all(&self, domains: Vec<String>) -> Vec<ProbeResult> {
        match self.config.schedule {
            Schedule::Sequential => {
                let mut results = Vec::with_capacity(domains.len());
                for domain in &domains {
                    results.push(self.probe_one(domain).await);
                }
                results
            }
            Schedule::Batched => {
                let batch_size = self.config.batch_size.max(1);
                let batch_count = domains.len().div_ceil(batch_size);
                let mut results = Vec::with_capacity(domains.len());

                for (i, batch) in domains.chunks(batch_size).enumerate() {
                    results.extend(join_all(batch.iter().map(|d| self.probe_one(d))).await);

                    if i + 1 < batch_count && !self.config.batch_delay.is_zero() {
                        tokio::time::sleep(self.config.batch_delay).await;
                    }
                }
                results
            }
            Schedule::Unordered => self.probe_stream(domains).collect().await,
        }
    }

    pub fn probe_stream<I>(&self, domains: I) -> impl Stream<Item = ProbeResult> + '_
    where
        I: IntoIterator<Item = String> + 'static,
    {
        let domains: Vec<String> = domains.into_iter().collect();

        stream::iter(domains)
            .map(move |domain| async move { self.probe_one(&domain).await })
            .buffer_unordered(self.config.max_concurrent.max(1))
    }

    /// Expands every base against `extensions`, probes the cross product and
    /// groups the verdicts back by base, in input order.
    ///
    /// A hostname reachable from two bases (`x` + `.ac.in`, `x.ac` + `.in`) is
    /// probed once and its verdict is reported in both groups.
    pub async fn probe_names(&self, bases: &[String], extensions: &[String]) -> Vec<NameReport> {
        let mut seen = HashSet::new();
        let domains: Vec<String> = bases
            .iter()
            .flat_map(|base| expand_extensions(base, extensions))
            .filter(|domain| seen.insert(domain.clone()))
            .collect();

        let by_domain: HashMap<String, ProbeResult> = self
            .probe_all(domains)
            .await
            .into_iter()
            .map(|result| (result.domain.clone(), result))
            .collect();

        bases
            .iter()
            .map(|base| NameReport {
                base: base.clone(),
                results: expand_extensions(base, extensions)
                    .filter_map(|domain| by_domain.get(&domain).cloned())
                    .collect(),
            })
            .collect()
    }
}

impl Clone for Prober {
    fn clone(&self) -> Self {
        Self {
            checks: self.checks.clone(),
            fallback: self.fallback.clone(),
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Availability, ErrorPolicy, VerdictRule};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Answers from a fixed table; anything missing is a timeout.
    struct Table(HashMap<&'static str, Availability>);

    #[async_trait]
    impl Check for Table {
        fn method(&self) -> ProbeMethod {
            ProbeMethod::Dns
        }

        async fn check(&self, domain: &str) -> Availability {
            self.0
                .get(domain)
                .cloned()
                .unwrap_or_else(|| Availability::error("DNS timeout"))
        }
    }

    fn table() -> Arc<dyn Check> {
        Arc::new(Table(HashMap::from([
            ("mysite.net", Availability::Taken),
            ("mysite.co", Availability::Available),
            ("other.net", Availability::Available),
            ("other.co", Availability::Taken),
        ])))
    }

    fn config(schedule: Schedule) -> ProbeConfig {
        ProbeConfig {
            schedule,
            batch_size: 2,
            batch_delay: Duration::from_millis(1),
            ..ProbeConfig::default()
        }
    }

    fn verdicts(reports: &[NameReport]) -> Vec<(String, Availability)> {
        reports
            .iter()
            .flat_map(|r| r.results.iter())
            .map(|r| (r.domain.clone(), r.availability.clone()))
            .collect()
    }

    #[tokio::test]
    async fn every_schedule_yields_the_same_grouped_verdicts() {
        let bases = vec!["mysite".to_string(), "other".to_string()];
        let extensions = vec![".net".to_string(), ".co".to_string()];
        let expected = vec![
            ("mysite.net".to_string(), Availability::Taken),
            ("mysite.co".to_string(), Availability::Available),
            ("other.net".to_string(), Availability::Available),
            ("other.co".to_string(), Availability::Taken),
        ];

        for schedule in [Schedule::Sequential, Schedule::Batched, Schedule::Unordered] {
            let prober = Prober::with_checks(config(schedule), vec![table()], None);
            let reports = prober.probe_names(&bases, &extensions).await;

            assert_eq!(reports.len(), 2);
            assert_eq!(reports[0].base, "mysite");
            assert_eq!(reports[1].base, "other");
            assert_eq!(verdicts(&reports), expected, "schedule {:?}", schedule);
        }
    }

    /// Counts calls per hostname; everything is available.
    struct Counting(std::sync::Mutex<HashMap<String, usize>>);

    #[async_trait]
    impl Check for Counting {
        fn method(&self) -> ProbeMethod {
            ProbeMethod::Dns
        }

        async fn check(&self, domain: &str) -> Availability {
            *self.0.lock().unwrap().entry(domain.to_string()).or_default() += 1;
            Availability::Available
        }
    }

    #[tokio::test]
    async fn overlapping_expansions_fill_every_group() {
        let counting = Arc::new(Counting(std::sync::Mutex::new(HashMap::new())));
        let extensions = vec![".ac.in".to_string(), ".in".to_string()];
        let bases = crate::names::normalize_bases(["x", "x.ac"], &extensions);
        assert_eq!(bases, vec!["x", "x.ac"]);

        for schedule in [Schedule::Sequential, Schedule::Batched, Schedule::Unordered] {
            counting.0.lock().unwrap().clear();
            let checks: Vec<Arc<dyn Check>> = vec![counting.clone()];
            let prober = Prober::with_checks(config(schedule), checks, None);

            let reports = prober.probe_names(&bases, &extensions).await;

            let domains: Vec<Vec<&str>> = reports
                .iter()
                .map(|r| r.results.iter().map(|p| p.domain.as_str()).collect())
                .collect();
            assert_eq!(
                domains,
                vec![vec!["x.ac.in", "x.in"], vec!["x.ac.ac.in", "x.ac.in"]],
                "schedule {:?}",
                schedule
            );
            assert_eq!(counting.0.lock().unwrap()["x.ac.in"], 1);
        }
    }

    #[tokio::test]
    async fn errors_follow_policy() {
        let lenient = Prober::with_checks(config(Schedule::Sequential), vec![table()], None);
        assert_eq!(
            lenient.probe_one("missing.us").await.availability,
            Availability::Available
        );

        let strict = Prober::with_checks(
            ProbeConfig {
                on_error: ErrorPolicy::Error,
                ..config(Schedule::Sequential)
            },
            vec![table()],
            None,
        );
        assert_eq!(
            strict.probe_one("missing.us").await.availability,
            Availability::error("DNS timeout")
        );
    }

    #[tokio::test]
    async fn fallback_replaces_inconclusive_verdicts_only() {
        let fallback: Arc<dyn Check> = Arc::new(Table(HashMap::from([
            ("missing.us", Availability::Taken),
            ("mysite.co", Availability::Taken),
        ])));
        let prober = Prober::with_checks(
            ProbeConfig {
                on_error: ErrorPolicy::Error,
                verdict: VerdictRule::AnyTaken,
                ..config(Schedule::Sequential)
            },
            vec![table()],
            Some(fallback),
        );

        assert_eq!(prober.probe_one("missing.us").await.availability, Availability::Taken);
        assert_eq!(
            prober.probe_one("mysite.co").await.availability,
            Availability::Available
        );
        assert_eq!(
            prober.probe_one("nowhere.in").await.availability,
            Availability::error("DNS timeout")
        );
    }

    #[tokio::test]
    async fn batched_schedule_sleeps_between_batches_only() {
        let prober = Prober::with_checks(
            ProbeConfig {
                batch_size: 2,
                batch_delay: Duration::from_millis(200),
                ..config(Schedule::Batched)
            },
            vec![table()],
            None,
        );

        let start = Instant::now();
        let results = prober
            .probe_all(vec!["mysite.net".to_string(), "mysite.co".to_string()])
            .await;
        assert_eq!(results.len(), 2);
        assert!(start.elapsed() < Duration::from_millis(200));

        let start = Instant::now();
        let results = prober
            .probe_all(vec![
                "mysite.net".to_string(),
                "mysite.co".to_string(),
                "other.net".to_string(),
            ])
            .await;
        assert_eq!(results.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn configured_methods_are_built_in_order() {
        let config = ProbeConfig {
            methods: vec![ProbeMethod::Http, ProbeMethod::Dns],
            api_fallback: true,
            ..ProbeConfig::default()
        };
        let prober = Prober::with_client(
            config,
            Client::new(),
            Arc::new(EndpointRegistry::from_entries(Vec::new())),
        );

        let methods: Vec<ProbeMethod> = prober.checks.iter().map(|c| c.method()).collect();
        assert_eq!(methods, vec![ProbeMethod::Http, ProbeMethod::Dns]);
        assert_eq!(
            prober.fallback.as_ref().map(|c| c.method()),
            Some(ProbeMethod::Rdap)
        );
    }
}
