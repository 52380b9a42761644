//! Router tests against an engine wired to a canned transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;
use usrlinks_core::model::{EndpointDescriptor, PlatformRule, UrlTemplate};
use usrlinks_core::{
    EndpointRegistry, EngineConfig, FetchedResponse, RegistrySource,
    RetryConfig, ScanEngine, ScanLedger, Transport, TransportError,
    TransportFactory, TransportOptions,
};
use usrlinks_server::{AppState, create_router};

/// Answers 404 for everything, so every status-code platform is free.
#[derive(Debug, Default)]
struct NotFoundTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for NotFoundTransport {
    async fn get(
        &self,
        _url: &str,
        _user_agent: &str,
    ) -> Result<FetchedResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedResponse::new(404, "not found"))
    }
}

#[derive(Debug, Default)]
struct StaticFactory {
    transport: Arc<NotFoundTransport>,
}

impl TransportFactory for StaticFactory {
    fn build(
        &self,
        options: &TransportOptions,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        if let Some(proxy) = &options.proxy {
            return Err(TransportError::InvalidProxy {
                address: proxy.clone(),
                reason: "unsupported in tests".into(),
            });
        }
        Ok(self.transport.clone())
    }
}

fn registry() -> EndpointRegistry {
    let rule = |url: &str| {
        PlatformRule::status_code(UrlTemplate::new(url).unwrap(), [404])
    };
    EndpointRegistry::from_descriptors([
        EndpointDescriptor::new("Forge", rule("https://forge.example/{}")),
        EndpointDescriptor::new("Board", rule("https://board.example/{}")),
    ])
}

fn app() -> (Router, Arc<NotFoundTransport>) {
    let factory = Arc::new(StaticFactory::default());
    let transport = factory.transport.clone();
    let config = EngineConfig {
        retry: RetryConfig {
            max_attempts: 3,
            backoff_step_ms: 0,
        },
        ..EngineConfig::default()
    };
    let engine = ScanEngine::new(
        Arc::new(registry()),
        factory,
        Arc::new(ScanLedger::new()),
        config,
    );
    (
        create_router(AppState::new(engine, RegistrySource::Builtin)),
        transport,
    )
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn check_returns_sorted_report() {
    let (router, transport) = app();

    let (status, body) = get(&router, "/check/dev?threads=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handle"], "dev");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["platform"], "Board");
    assert_eq!(results[1]["platform"], "Forge");
    assert!(results.iter().all(|r| r["verdict"] == "present"));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn completed_scan_is_visible_in_status() {
    let (router, _) = app();

    let (_, report) = get(&router, "/check/dev").await;
    let scan_id = report["scan_id"].as_str().unwrap().to_string();

    let (status, body) = get(&router, &format!("/status/{scan_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scan_id"], scan_id.as_str());
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn unknown_scan_status() {
    let (router, _) = app();
    let (_, body) = get(&router, "/status/ghost_0_0").await;
    assert_eq!(body["status"], "unknown");
}

#[tokio::test]
async fn generate_dorks_skips_the_scan() {
    let (router, transport) = app();

    let (status, body) = get(&router, "/check/dev?generate_dorks=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dorks"].as_array().map(Vec::len), Some(10));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_proxy_is_a_bad_request() {
    let (router, transport) = app();

    let (status, body) = get(&router, "/check/dev?proxy=10.0.0.1:1080").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], 400);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn utility_endpoints() {
    let (router, _) = app();

    let (_, dorks) = get(&router, "/dorks/dev").await;
    assert_eq!(dorks["dorks"][0], "\"dev\"");

    let (_, variants) = get(&router, "/variants/dev").await;
    let variants = variants["variants"].as_array().unwrap();
    assert!(variants.iter().any(|v| v == "d3v"));
    assert!(!variants.iter().any(|v| v == "dev"));

    let (_, platforms) = get(&router, "/platforms").await;
    assert_eq!(platforms["Forge"]["code"], serde_json::json!([404]));

    let (status, health) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["platforms"], 2);
    assert_eq!(health["registry"], "builtin");
}

#[tokio::test]
async fn fuzzy_scan_covers_variants_of_selected_platforms() {
    let (router, transport) = app();

    let (status, body) =
        get(&router, "/fuzzy/dev?platforms=Forge&limit=4&threads=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handle"], "dev");
    let variants = body["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 4);
    for variant in variants {
        let results = variant["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["platform"], "Forge");
        assert_ne!(variant["variant"], "dev");
    }
    assert_eq!(transport.calls.load(Ordering::SeqCst), 4);

    let scan_id = body["scan_id"].as_str().unwrap();
    let (_, status_body) = get(&router, &format!("/status/{scan_id}")).await;
    assert_eq!(status_body["status"], "completed");
}

#[tokio::test]
async fn fuzzy_scan_rejects_unknown_platforms() {
    let (router, transport) = app();

    let (status, body) = get(&router, "/fuzzy/dev?platforms=Forge,Myspace").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "unknown platforms: Myspace");
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (router, _) = app();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "https://ui.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&header::HeaderValue::from_static("*"))
    );
}
