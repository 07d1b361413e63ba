use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use git_http::{rewrite_advertisement, select_ref, ForgeMatcher, GitHttpError, Matcher, RefAdvertisement};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::config::AdapterConfig;
use crate::upstream::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AdapterConfig>,
    pub matcher: Arc<ForgeMatcher>,
    pub upstream: Arc<dyn UpstreamClient>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceQuery {
    pub service: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    let request_body_limit = state.config.request_body_limit;
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/{*rest}",
            get(dispatch_get).post(dispatch_post).fallback(method_not_matched),
        )
        .layer(DefaultBodyLimit::max(request_body_limit))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

// Any method other than GET/POST under a matched import path is treated the
// same as an unmatched path: 404, not axum's default 405.
async fn method_not_matched() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn dispatch_get(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    Query(q): Query<ServiceQuery>,
) -> Response {
    let Some(import_path) = rest.strip_suffix("/info/refs") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if q.service.as_deref() != Some("git-upload-pack") {
        return (StatusCode::BAD_REQUEST, "unsupported service").into_response();
    }
    info_refs(state, import_path).await
}

async fn dispatch_post(State(state): State<AppState>, Path(rest): Path<String>, body: Bytes) -> Response {
    let Some(import_path) = rest.strip_suffix("/git-upload-pack") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    upload_pack(state, import_path, body).await
}

async fn info_refs(state: AppState, import_path: &str) -> Response {
    let start = Instant::now();

    let matched = match state.matcher.match_path(import_path) {
        Ok(m) => m,
        Err(e) => {
            counter!("redirect_http.info_refs", "outcome" => "not_found").increment(1);
            return e.into_response();
        }
    };

    let fetch_start = Instant::now();
    let raw = match state.upstream.fetch_info_refs(&matched.upstream_url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(upstream = %matched.upstream_url, error = %e, "upstream fetch failed");
            counter!("redirect_http.info_refs", "outcome" => "upstream_error").increment(1);
            return e.into_response();
        }
    };
    histogram!("redirect_http.upstream_fetch_ms").record(fetch_start.elapsed().as_millis() as f64);

    if raw.len() > state.config.max_advertisement_bytes {
        counter!("redirect_http.info_refs", "outcome" => "upstream_error").increment(1);
        return GitHttpError::Internal("advertisement exceeds configured size limit".into())
            .into_response();
    }

    let mut advertisement = match RefAdvertisement::parse(&raw) {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(upstream = %matched.upstream_url, error = %e, "malformed upstream advertisement");
            counter!("redirect_http.info_refs", "outcome" => "upstream_error").increment(1);
            return GitHttpError::MalformedAdvertisement(e.to_string()).into_response();
        }
    };

    let chosen_hash = match select_ref(&advertisement.records, &matched.version_token) {
        Some(record) => record.best_hash().to_string(),
        None => {
            counter!("redirect_http.info_refs", "outcome" => "not_found").increment(1);
            return GitHttpError::NoMatchingRef.into_response();
        }
    };

    rewrite_advertisement(&mut advertisement, &chosen_hash);
    tracing::debug!(
        upstream = %matched.upstream_url,
        chosen_hash = %chosen_hash,
        "resolved ref for request"
    );

    counter!("redirect_http.info_refs", "outcome" => "ok").increment(1);
    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "info_refs request complete");
    let body = advertisement.to_bytes();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-git-upload-pack-advertisement")
        .body(axum::body::Body::from(body))
        .expect("response build")
}

async fn upload_pack(state: AppState, import_path: &str, body: Bytes) -> Response {
    let matched = match state.matcher.match_path(import_path) {
        Ok(m) => m,
        Err(e) => return e.into_response(),
    };

    histogram!("redirect_http.upload_pack_bytes").record(body.len() as f64);

    match state.upstream.upload_pack(&matched.upstream_url, body).await {
        Ok(bytes) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/x-git-upload-pack-result")
            .body(axum::body::Body::from(bytes))
            .expect("response build"),
        Err(e) => {
            tracing::warn!(upstream = %matched.upstream_url, error = %e, "upload-pack proxy failed");
            e.into_response()
        }
    }
}
