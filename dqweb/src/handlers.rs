//! Request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::Json;
use libdomain_sweep::names::normalize_bases;
use std::net::SocketAddr;
use tracing::info;

use crate::dto::{CheckRequest, CheckResponse};
use crate::error::HttpError;
use crate::state::AppState;

/// Expands each submitted base name against the configured extensions and
/// probes every combination.
pub async fn check_domains(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, HttpError> {
    if let (Some(limits), Some(ConnectInfo(addr))) = (&state.client_limits, &peer) {
        if !limits.try_acquire(&addr.ip()) {
            info!(client = %addr.ip(), "rate limited");
            return Err(HttpError::TooManyRequests);
        }
    }

    let Json(request) =
        payload.map_err(|_| HttpError::BadRequest("Domains array is required".to_string()))?;

    let bases = normalize_bases(&request.domains, &state.extensions);
    if bases.len() > state.max_names {
        return Err(HttpError::BadRequest(format!(
            "At most {} domains per request",
            state.max_names
        )));
    }

    info!(
        names = bases.len(),
        extensions = state.extensions.len(),
        filter = ?request.filter,
        "checking domains"
    );

    let reports = state.prober.probe_names(&bases, &state.extensions).await;
    Ok(Json(CheckResponse::from_reports(reports, request.filter)))
}

pub async fn extensions(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.extensions.clone())
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed
}
