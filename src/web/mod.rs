//! Browser dashboard served over HTTP.
//!
//! Routes:
//! - `GET /`                         dashboard page (plotly.js renders figures)
//! - `GET /api/years?start=&end=`    year-range binding
//! - `GET /api/imputation?percent=`  missing-data binding (`percent` optional)
//! - `GET /healthz`                  liveness
//!
//! Handlers are synchronous computations over the shared read-only
//! `Dashboard`; the server runs on a current-thread runtime so requests are
//! handled one at a time.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::dashboard::{Dashboard, ImputationView, YearRangeView};
use crate::domain::{Percentage, YEAR_MAX, YEAR_MIN, YearRange};
use crate::error::AppError;

mod page;

#[derive(Clone)]
struct WebState {
    dashboard: Arc<Dashboard>,
}

/// Build the router; exposed separately from [`serve`] for tests.
pub fn router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/years", get(years))
        .route("/api/imputation", get(imputation))
        .route("/healthz", get(healthz))
        .with_state(WebState { dashboard })
}

/// Serve the dashboard until Ctrl-C. Blocks the calling thread.
///
/// Must be called outside any tokio runtime (the data load before it uses a
/// blocking HTTP client).
pub fn serve(dashboard: Dashboard, addr: SocketAddr) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to start runtime: {e}")))?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::runtime(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!("Dashboard listening on http://{addr}");

        axum::serve(listener, router(Arc::new(dashboard)))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::runtime(format!("Server error: {e}")))
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn index() -> Html<String> {
    Html(page::render())
}

async fn healthz() -> &'static str {
    "ok"
}

/// Raw so a malformed year is reported as a JSON usage error.
#[derive(Debug, Deserialize)]
struct YearsQuery {
    start: Option<String>,
    end: Option<String>,
}

async fn years(
    State(state): State<WebState>,
    Query(q): Query<YearsQuery>,
) -> Result<Json<YearRangeView>, ApiError> {
    let start = parse_year("start", q.start.as_deref())?.unwrap_or(YEAR_MIN);
    let end = parse_year("end", q.end.as_deref())?.unwrap_or(YEAR_MAX);
    let range = YearRange::new(start, end)?;
    let view = state.dashboard.year_range_view(range);
    tracing::info!(%range, rows = view.rows, "GET /api/years");
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct ImputationQuery {
    /// Raw so a cleared input (`percent=`) reads as "no removal".
    percent: Option<String>,
}

async fn imputation(
    State(state): State<WebState>,
    Query(q): Query<ImputationQuery>,
) -> Result<Json<ImputationView>, ApiError> {
    let percent = parse_percent(q.percent.as_deref())?;
    let view = state.dashboard.imputation_view(percent)?;
    tracing::info!(
        percent = view.percent,
        removed_cells = view.stats.removed_cells,
        "GET /api/imputation"
    );
    Ok(Json(view))
}

fn parse_year(field: &str, raw: Option<&str>) -> Result<Option<i32>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::usage(format!("Invalid {field} year '{raw}'.")))
}

fn parse_percent(raw: Option<&str>) -> Result<Option<Percentage>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let value: u32 = raw
        .parse()
        .map_err(|_| AppError::usage(format!("Invalid percentage '{raw}'.")))?;
    Percentage::new(value).map(Some)
}

/// `AppError` rendered as `{ "error": ... }`; usage errors are the client's
/// fault (400), anything else is ours (500).
struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_usage() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::warn!(%status, "request failed: {}", self.0);
        (status, Json(serde_json::json!({ "error": self.0.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::tests::fixture;

    fn app() -> Router {
        router(Arc::new(Dashboard::new(fixture(), Some(5))))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let resp = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn years_endpoint_returns_three_figures() {
        let (status, body) = get_json("/api/years?start=2008&end=2017").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 10);
        assert_eq!(body["category_figure"]["data"][0]["type"], "pie");
        assert_eq!(body["top_drugs_figure"]["data"][0]["type"], "bar");
        assert_eq!(body["ratings_figure"]["data"][0]["type"], "box");
    }

    #[tokio::test]
    async fn years_endpoint_rejects_inverted_range() {
        let (status, body) = get_json("/api/years?start=2015&end=2010").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("2015"));
    }

    #[tokio::test]
    async fn years_endpoint_reports_bad_year_as_json() {
        let (status, body) = get_json("/api/years?start=abc&end=2017").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid start year 'abc'.");

        let (status, body) = get_json("/api/years?start=&end=2016").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["range"]["start"], YEAR_MIN);
    }

    #[tokio::test]
    async fn imputation_endpoint_defaults_to_zero_percent() {
        let (status, body) = get_json("/api/imputation?percent=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["percent"], 0);
        assert_eq!(body["label"], "Percentage of data removed: 0%");

        let (status, body) = get_json("/api/imputation").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["figure"]["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn imputation_endpoint_validates_percent() {
        let (status, _) = get_json("/api/imputation?percent=25").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get_json("/api/imputation?percent=95").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json("/api/imputation?percent=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn index_serves_page() {
        let resp = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/years"));
        assert!(html.contains("max=\"80\""));
    }
}
