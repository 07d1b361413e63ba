//! End-to-end HTTP surface tests against the router directly, with a stub
//! upstream standing in for a real Git host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bytes::Bytes;
use git_http::{encode_pkt_line, GitHttpError, PKT_FLUSH};
use server::config::AdapterConfig;
use server::routes::{build_router, AppState};
use server::upstream::UpstreamClient;
use tower::ServiceExt;

struct StubUpstream {
    advertisements: HashMap<String, Vec<u8>>,
    upload_pack_calls: Mutex<Vec<(String, Bytes)>>,
}

impl StubUpstream {
    fn new(advertisements: HashMap<String, Vec<u8>>) -> Self {
        Self { advertisements, upload_pack_calls: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl UpstreamClient for StubUpstream {
    async fn fetch_info_refs(&self, repo_url: &str) -> Result<Vec<u8>, GitHttpError> {
        self.advertisements
            .get(repo_url)
            .cloned()
            .ok_or_else(|| GitHttpError::UpstreamFailure(format!("no fixture for {repo_url}")))
    }

    async fn upload_pack(&self, repo_url: &str, body: Bytes) -> Result<Bytes, GitHttpError> {
        self.upload_pack_calls.lock().unwrap().push((repo_url.to_string(), body.clone()));
        Ok(body)
    }
}

fn sample_advertisement() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(encode_pkt_line(b"# service=git-upload-pack\n"));
    out.extend_from_slice(PKT_FLUSH);
    out.extend(encode_pkt_line(
        b"aaaa000000000000000000000000000000000a HEAD\0symref=HEAD:refs/heads/master\n",
    ));
    out.extend(encode_pkt_line(b"aaaa000000000000000000000000000000000a refs/heads/master\n"));
    out.extend(encode_pkt_line(b"bbbb000000000000000000000000000000000b refs/tags/v0\n"));
    out.extend(encode_pkt_line(b"cccc000000000000000000000000000000000c refs/tags/v1\n"));
    out.extend(encode_pkt_line(b"dddd000000000000000000000000000000000d refs/tags/v1.2\n"));
    out.extend_from_slice(PKT_FLUSH);
    out
}

fn test_state(advertisements: HashMap<String, Vec<u8>>) -> AppState {
    let config = AdapterConfig {
        listen_addr: "0.0.0.0:0".into(),
        host_user: "bob".into(),
        upstream_base: "https://example.invalid".into(),
        upstream_timeout: Duration::from_secs(1),
        max_advertisement_bytes: 1_048_576,
        request_body_limit: 1_048_576,
    };
    AppState {
        config: Arc::new(config),
        matcher: Arc::new(git_http::ForgeMatcher::new("bob")),
        upstream: Arc::new(StubUpstream::new(advertisements)),
    }
}

#[tokio::test]
async fn info_refs_rewrites_head_to_the_highest_matching_release() {
    let mut fixtures = HashMap::new();
    fixtures.insert("bob/pkg.git".to_string(), sample_advertisement());
    let router = build_router(test_state(fixtures));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/pkg.v1/info/refs?service=git-upload-pack")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assert!(body_str.contains("dddd000000000000000000000000000000000d HEAD"));
    assert!(body_str.contains("dddd000000000000000000000000000000000d refs/heads/master"));
}

#[tokio::test]
async fn info_refs_returns_404_for_unmatched_import_path() {
    let router = build_router(test_state(HashMap::new()));
    let response = router
        .oneshot(
            Request::builder()
                .uri("/a/b/info/refs?service=git-upload-pack")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn info_refs_rejects_unknown_service_with_400() {
    let mut fixtures = HashMap::new();
    fixtures.insert("bob/pkg.git".to_string(), sample_advertisement());
    let router = build_router(test_state(fixtures));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/pkg.v1/info/refs?service=git-receive-pack")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn info_refs_returns_404_when_no_ref_satisfies_the_version() {
    let mut fixtures = HashMap::new();
    fixtures.insert("bob/pkg.git".to_string(), sample_advertisement());
    let router = build_router(test_state(fixtures));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/pkg.v9/info/refs?service=git-upload-pack")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_pack_proxies_the_request_body_untouched() {
    let mut fixtures = HashMap::new();
    fixtures.insert("bob/pkg.git".to_string(), sample_advertisement());
    let router = build_router(test_state(fixtures));

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/pkg.v1/git-upload-pack")
                .body(Body::from("0032want dddd000000000000000000000000000000000d\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"0032want dddd000000000000000000000000000000000d\n");
}

#[tokio::test]
async fn unsupported_methods_on_a_matched_path_return_404_not_405() {
    let mut fixtures = HashMap::new();
    fixtures.insert("bob/pkg.git".to_string(), sample_advertisement());
    let router = build_router(test_state(fixtures));

    let response = router
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/pkg.v1/info/refs?service=git-upload-pack")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn healthz_never_touches_upstream() {
    let router = build_router(test_state(HashMap::new()));
    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
