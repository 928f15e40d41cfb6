use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPayoutNotifier, InMemorySettlementRepository};
use crate::routes::with_billing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use care_billing::billing::{PricingConfig, SettlementService};
use care_billing::config::AppConfig;
use care_billing::error::AppError;
use care_billing::telemetry;
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
    };

    let repository = Arc::new(InMemorySettlementRepository::default());
    let payouts = Arc::new(InMemoryPayoutNotifier::default());
    let settlement_service = Arc::new(SettlementService::new(
        repository,
        payouts,
        PricingConfig::standard(),
    ));

    let app = with_billing_routes(settlement_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "care marketplace billing service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
