use crate::cli::ServeArgs;
use crate::infra::{load_snapshot, AppState};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use permit_dash::config::AppConfig;
use permit_dash::error::AppError;
use permit_dash::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(permits) = args.permits.take() {
        config.data.permits_csv = permits;
    }

    telemetry::init(&config.telemetry)?;

    let snapshot = load_snapshot(&config.data.permits_csv)?;
    let permit_count = snapshot.len();
    let zip_count = snapshot.zips().len();

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_dashboard_routes(snapshot)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        permits = permit_count,
        zips = zip_count,
        "permit dashboard ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
