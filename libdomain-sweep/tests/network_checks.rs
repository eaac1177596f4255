use httpmock::prelude::*;
use httpmock::Method::HEAD;
use async_trait::async_trait;
use libdomain_sweep::{
    Availability, Check, EndpointRegistry, ErrorPolicy, HttpCheck, KeyedRateLimiters,
    ProbeConfig, ProbeMethod, Prober, RdapCheck, Schedule,
};
use reqwest::Client;
use std::{sync::Arc, time::Duration};

const TIMEOUT: Duration = Duration::from_secs(2);

fn plain_http(timeout: Duration) -> HttpCheck {
    HttpCheck::with_schemes(Client::new(), timeout, vec!["http"])
}

fn rdap_check(registry: EndpointRegistry) -> RdapCheck {
    RdapCheck::new(
        Client::new(),
        Arc::new(registry),
        Arc::new(KeyedRateLimiters::per_second(50)),
        TIMEOUT,
    )
}

#[tokio::test]
async fn head_answer_of_any_status_means_taken() {
    let server = MockServer::start_async().await;
    let head = server
        .mock_async(|when, then| {
            when.method(HEAD).path("/");
            then.status(403);
        })
        .await;

    let verdict = plain_http(TIMEOUT).check(&server.address().to_string()).await;

    assert_eq!(verdict, Availability::Taken);
    head.assert_async().await;
}

#[tokio::test]
async fn refused_connection_means_available() {
    let verdict = plain_http(TIMEOUT).check("127.0.0.1:1").await;
    assert_eq!(verdict, Availability::Available);
}

#[tokio::test]
async fn slow_server_is_a_timeout_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/");
            then.status(200).delay(Duration::from_millis(500));
        })
        .await;

    let verdict = plain_http(Duration::from_millis(100))
        .check(&server.address().to_string())
        .await;

    assert!(verdict.is_error(), "got {:?}", verdict);
}

#[tokio::test]
async fn rdap_status_codes_map_to_verdicts() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/domain/mysite.net");
            then.status(200).json_body(serde_json::json!({ "ldhName": "MYSITE.NET" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/domain/freename.net");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/domain/busy.net");
            then.status(429);
        })
        .await;

    let check = rdap_check(EndpointRegistry::from_entries([(
        "net".to_string(),
        server.base_url(),
    )]));

    assert_eq!(check.check("mysite.net").await, Availability::Taken);
    assert_eq!(check.check("freename.net").await, Availability::Available);
    assert_eq!(check.check("busy.net").await, Availability::unknown("Rate limited"));
    assert_eq!(
        check.check("mysite.zz").await,
        Availability::unknown("No RDAP endpoint for .zz")
    );
}

#[tokio::test]
async fn rdap_bootstraps_once_from_iana_file() {
    let server = MockServer::start_async().await;
    let bootstrap = server
        .mock_async(|when, then| {
            when.method(GET).path("/rdap/dns.json");
            then.status(200).json_body(serde_json::json!({
                "services": [
                    [["net", "com"], [format!("{}/registry/", server.base_url())]]
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/registry/domain/mysite.com");
            then.status(404);
        })
        .await;

    let check = rdap_check(EndpointRegistry::with_bootstrap_url(server.url("/rdap/dns.json")));

    assert_eq!(check.check("mysite.com").await, Availability::Available);
    assert_eq!(check.check("mysite.com").await, Availability::Available);
    bootstrap.assert_hits_async(1).await;
}

#[tokio::test]
async fn failed_bootstrap_is_unknown() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rdap/dns.json");
            then.status(500);
        })
        .await;

    let check = rdap_check(EndpointRegistry::with_bootstrap_url(server.url("/rdap/dns.json")));

    assert!(check.check("mysite.com").await.is_unknown());
}

/// A resolver that never answers in time.
struct SilentDns;

#[async_trait]
impl Check for SilentDns {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Dns
    }

    async fn check(&self, _domain: &str) -> Availability {
        Availability::error("DNS timeout")
    }
}

#[tokio::test]
async fn api_fallback_settles_inconclusive_probes() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET).path("/domain/mysite.us");
            then.status(200);
        })
        .await;

    let config = ProbeConfig {
        methods: vec![ProbeMethod::Dns],
        schedule: Schedule::Sequential,
        api_fallback: true,
        on_error: ErrorPolicy::Error,
        timeout: TIMEOUT,
        ..ProbeConfig::default()
    };
    // "us" resolves to the mock, "in" has no endpoint so the DNS error stands.
    let registry = EndpointRegistry::from_entries([("us".to_string(), server.base_url())]);
    let fallback: Arc<dyn Check> = Arc::new(rdap_check(registry));
    let prober = Prober::with_checks(config, vec![Arc::new(SilentDns) as Arc<dyn Check>], Some(fallback));

    let results = prober
        .probe_all(vec!["mysite.us".to_string(), "mysite.in".to_string()])
        .await;

    assert_eq!(results[0].availability, Availability::Taken);
    assert_eq!(results[1].availability, Availability::error("DNS timeout"));
    lookup.assert_hits_async(1).await;
}
