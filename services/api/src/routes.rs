use crate::assets;
use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use permit_dash::permits::{permit_router, PermitSnapshot};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_dashboard_routes(snapshot: Arc<PermitSnapshot>) -> Router {
    permit_router(snapshot)
        .route("/", get(index))
        .route("/assets/:file", get(asset))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

pub(crate) async fn asset(Path(file): Path<String>) -> Response {
    match assets::lookup(&file) {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, assets::content_type(&file))],
            body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no asset named '{file}'") })),
        )
            .into_response(),
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
