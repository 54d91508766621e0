use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use placecrawl_engine::{CrawlError, PlaceCrawler, PlaceResult};

use crate::middleware::{request_id, require_api_key, AuthState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<PlaceCrawler>,
}

#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
}

/// Error response carrying the HTTP status and a client-safe detail string.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

/// Maps a crawl failure onto the HTTP taxonomy.
///
/// Invalid input surfaces with its message as a 400; every other failure is a
/// 502 whose internal details are logged but never sent to the caller.
fn map_crawl_error(request_id: &str, url: &str, error: &CrawlError) -> ApiError {
    if error.is_invalid_input() {
        tracing::warn!(request_id, url, error = %error, "rejecting crawl request");
        return ApiError {
            status: StatusCode::BAD_REQUEST,
            detail: error.to_string(),
        };
    }
    tracing::error!(request_id, url, error = %error, "crawl failed");
    ApiError {
        status: StatusCode::BAD_GATEWAY,
        detail: "Crawl failed".to_string(),
    }
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/health", get(health));
    let protected_routes = Router::new()
        .route("/crawl", post(crawl))
        .layer(axum::middleware::from_fn_with_state(auth, require_api_key));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> Json<HealthData> {
    Json(HealthData { status: "ok" })
}

async fn crawl(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(payload): Json<CrawlRequest>,
) -> Result<Json<PlaceResult>, ApiError> {
    tracing::debug!(request_id = %req_id.0, url = %payload.url, "received crawl request");

    let result = state
        .crawler
        .crawl(&payload.url)
        .await
        .map_err(|e| map_crawl_error(&req_id.0, &payload.url, &e))?;

    tracing::debug!(
        request_id = %req_id.0,
        url = %payload.url,
        place_name = %result.name,
        "returning crawl result"
    );
    Ok(Json(result))
}
