use crate::web::{SharedState, WebError};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

pub const SECRET_HEADER: &str = "x-revalidate-secret";

#[derive(Debug, Deserialize)]
pub struct RevalidateParams {
    pub path: Option<String>,
}

/// Constant-time string comparison for the revalidation secret
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// `POST /api/revalidate[?path=/en/news]`
///
/// Purges one cached page, or all of them, so the next request re-renders from
/// fresh content. The endpoint does not exist unless a secret is configured.
pub async fn revalidate(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<RevalidateParams>,
) -> Result<impl IntoResponse, WebError> {
    let Some(expected) = state.revalidate_secret.as_deref() else {
        return Err(WebError::NotFound);
    };

    let provided = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !constant_time_compare(provided, expected) {
        warn!("Rejected revalidation request with invalid secret");
        return Err(WebError::Unauthorized);
    }

    let path = params.path.as_deref().filter(|p| !p.is_empty());
    let purged = state.cache.purge(path);
    info!(
        "Revalidated {} ({} cached pages purged)",
        path.unwrap_or("all pages"),
        purged
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "revalidated": true,
            "path": path,
            "purged": purged,
        })),
    ))
}
