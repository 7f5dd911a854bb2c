use metrics_exporter_prometheus::PrometheusHandle;
use permit_dash::error::AppError;
use permit_dash::permits::{CategoryField, Measure, PermitSnapshot};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads and cleans the extract. Any failure here aborts startup.
pub(crate) fn load_snapshot(path: &Path) -> Result<Arc<PermitSnapshot>, AppError> {
    let snapshot = PermitSnapshot::from_path(path)?;
    let violations = snapshot.report().schema_violations();
    if violations > 0 {
        warn!(
            violations,
            source = %path.display(),
            "permit rows failed coercion and were left out of the dashboard"
        );
    }
    Ok(Arc::new(snapshot))
}

pub(crate) fn parse_category_field(raw: &str) -> Result<CategoryField, String> {
    CategoryField::from_slug(raw)
        .ok_or_else(|| format!("unknown breakdown '{raw}', expected 'class' or 'type'"))
}

pub(crate) fn parse_measure(raw: &str) -> Result<Measure, String> {
    Measure::from_slug(raw)
        .ok_or_else(|| format!("unknown measure '{raw}', expected 'percent' or 'total'"))
}
