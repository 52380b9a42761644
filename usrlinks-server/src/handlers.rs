use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use usrlinks_core::variants::DEFAULT_VARIANT_LIMIT;
use usrlinks_core::{
    FuzzyScanRequest, ScanRequest, TransportOptions, handle_variants,
    search_queries,
};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

const MAX_HANDLE_LEN: usize = 64;
/// Upper bound on the per-request worker pool.
const MAX_THREADS: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckParams {
    pub proxy: Option<String>,
    pub tor: bool,
    pub threads: Option<usize>,
    pub deep_scan: bool,
    pub generate_dorks: bool,
}

impl CheckParams {
    fn transport(&self) -> TransportOptions {
        transport_options(self.proxy.as_deref(), self.tor)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FuzzyParams {
    pub proxy: Option<String>,
    pub tor: bool,
    pub threads: Option<usize>,
    /// Comma-separated platform names. Empty or missing means all.
    pub platforms: Option<String>,
    pub limit: Option<usize>,
}

impl FuzzyParams {
    fn platforms(&self) -> Option<Vec<String>> {
        let names: Vec<String> = self
            .platforms
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        (!names.is_empty()).then_some(names)
    }
}

fn transport_options(proxy: Option<&str>, tor: bool) -> TransportOptions {
    TransportOptions {
        proxy: proxy
            .map(str::trim)
            .filter(|proxy| !proxy.is_empty())
            .map(str::to_string),
        use_relay: tor,
    }
}

fn validate_handle(handle: &str) -> AppResult<&str> {
    let handle = handle.trim();
    if handle.is_empty() {
        return Err(AppError::bad_request("handle must not be empty"));
    }
    if handle.chars().count() > MAX_HANDLE_LEN {
        return Err(AppError::bad_request(format!(
            "handle longer than {MAX_HANDLE_LEN} characters"
        )));
    }
    if handle
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/')
    {
        return Err(AppError::bad_request(
            "handle must not contain whitespace, control characters or '/'",
        ));
    }
    Ok(handle)
}

pub async fn check_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<CheckParams>,
) -> AppResult<Json<Value>> {
    let handle = validate_handle(&handle)?;

    if params.generate_dorks {
        return Ok(Json(json!({ "dorks": search_queries(handle) })));
    }

    let request = ScanRequest::new(handle)
        .with_transport(params.transport())
        .with_deep_scan(params.deep_scan)
        .with_parallelism(params.threads.map(|threads| threads.min(MAX_THREADS)));

    info!(handle, deep_scan = params.deep_scan, "check requested");
    let report = state.engine.run_scan(request).await?;
    Ok(Json(report.to_json_value()?))
}

pub async fn fuzzy_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<FuzzyParams>,
) -> AppResult<Json<Value>> {
    let handle = validate_handle(&handle)?;

    let mut request = FuzzyScanRequest::new(handle)
        .with_transport(transport_options(params.proxy.as_deref(), params.tor))
        .with_limit(Some(
            params
                .limit
                .unwrap_or(DEFAULT_VARIANT_LIMIT)
                .min(DEFAULT_VARIANT_LIMIT),
        ))
        .with_parallelism(params.threads.map(|threads| threads.min(MAX_THREADS)));
    if let Some(platforms) = params.platforms() {
        request = request.with_platforms(platforms);
    }

    info!(handle, platforms = ?request.platforms, "fuzzy scan requested");
    let report = state.engine.run_fuzzy_scan(request).await?;
    Ok(Json(report.to_json_value()?))
}

pub async fn status_handler(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> Json<Value> {
    let status = state.engine.ledger().status(&scan_id);
    Json(json!({ "scan_id": scan_id, "status": status }))
}

pub async fn dorks_handler(Path(handle): Path<String>) -> AppResult<Json<Value>> {
    let handle = validate_handle(&handle)?;
    Ok(Json(json!({ "dorks": search_queries(handle) })))
}

pub async fn variants_handler(
    Path(handle): Path<String>,
) -> AppResult<Json<Value>> {
    let handle = validate_handle(&handle)?;
    Ok(Json(json!({ "variants": handle_variants(handle) })))
}

pub async fn platforms_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.engine.registry().to_document()))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "platforms": state.engine.registry().len(),
        "registry": state.registry_source.to_string(),
    }))
}
