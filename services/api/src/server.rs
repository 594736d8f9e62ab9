use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use estate_market::config::AppConfig;
use estate_market::error::AppError;
use estate_market::infra::{InMemoryObjectStorage, InMemoryStore, LogMailer};
use estate_market::telemetry;
use estate_market::workflows::SystemClock;
use estate_market::{Marketplace, MarketplaceAdapters};
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

    let market = Marketplace::new(
        &config,
        MarketplaceAdapters {
            store: InMemoryStore::new(),
            mailer: Arc::new(LogMailer::new(config.mail.from_address.clone())),
            storage: Arc::new(InMemoryObjectStorage::from_config(&config.storage)),
            clock: Arc::new(SystemClock),
        },
    );
    if let Some(seed) = &config.admin {
        market.seed_admin(seed)?;
    }

    let app = with_operational_routes(market.router())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "estate market api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
