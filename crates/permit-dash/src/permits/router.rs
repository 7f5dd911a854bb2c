use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::dashboard::DashboardQuery;
use super::domain::{CategoryField, Measure, ZipSelection};
use super::snapshot::PermitSnapshot;

#[derive(Debug, Default, Deserialize)]
pub struct ZipFilterParams {
    #[serde(default)]
    pub zips: Option<String>,
}

impl ZipFilterParams {
    fn selection(&self) -> ZipSelection {
        self.zips
            .as_deref()
            .map(ZipSelection::parse)
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub zips: Option<String>,
    #[serde(default)]
    pub color_by: CategoryField,
    #[serde(default)]
    pub measure: Measure,
}

impl From<DashboardParams> for DashboardQuery {
    fn from(params: DashboardParams) -> Self {
        Self {
            zips: params
                .zips
                .as_deref()
                .map(ZipSelection::parse)
                .unwrap_or_default(),
            color_by: params.color_by,
            measure: params.measure,
        }
    }
}

/// Read-only endpoints over a loaded permit snapshot.
pub fn permit_router(snapshot: Arc<PermitSnapshot>) -> Router {
    Router::new()
        .route("/api/v1/permits/zips", get(zips_handler))
        .route("/api/v1/permits/records", get(records_handler))
        .route(
            "/api/v1/permits/aggregates/:field",
            get(aggregate_handler),
        )
        .route("/api/v1/permits/dashboard", get(dashboard_handler))
        .route("/api/v1/permits/report", get(report_handler))
        .with_state(snapshot)
}

pub(crate) async fn zips_handler(State(snapshot): State<Arc<PermitSnapshot>>) -> Response {
    Json(json!({ "zips": snapshot.zips() })).into_response()
}

pub(crate) async fn records_handler(
    State(snapshot): State<Arc<PermitSnapshot>>,
    Query(params): Query<ZipFilterParams>,
) -> Response {
    let records = snapshot.records(&params.selection());
    Json(json!({
        "count": records.len(),
        "records": records,
    }))
    .into_response()
}

pub(crate) async fn aggregate_handler(
    State(snapshot): State<Arc<PermitSnapshot>>,
    Path(field): Path<String>,
    Query(params): Query<ZipFilterParams>,
) -> Response {
    match CategoryField::from_slug(&field) {
        Some(field) => {
            let rows = snapshot.aggregate(field, &params.selection());
            Json(json!({
                "field": field,
                "rows": rows,
            }))
            .into_response()
        }
        None => {
            let payload = json!({
                "error": format!("unknown aggregate '{field}', expected 'class' or 'type'"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn dashboard_handler(
    State(snapshot): State<Arc<PermitSnapshot>>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let query = DashboardQuery::from(params);
    Json(snapshot.dashboard(&query)).into_response()
}

pub(crate) async fn report_handler(State(snapshot): State<Arc<PermitSnapshot>>) -> Response {
    Json(snapshot.metadata()).into_response()
}
