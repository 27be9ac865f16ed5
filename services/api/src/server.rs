use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::payroll_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fundraiser_payroll::config::AppConfig;
use fundraiser_payroll::error::AppError;
use fundraiser_payroll::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        report: Arc::new(config.report.clone()),
    };

    let app = payroll_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        year = config.report.year,
        invalid_records = ?config.report.invalid_records,
        "fundraiser payroll service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
