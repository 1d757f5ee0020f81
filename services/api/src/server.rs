use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use tracing::{error, info};

use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryLoiRepository, InMemoryNotificationPublisher, InMemoryOfferRepository,
};
use crate::routes::with_marketplace_routes;
use shortdeal::config::AppConfig;
use shortdeal::error::AppError;
use shortdeal::marketplace::loi::{FixedLayoutRenderer, LoiRenderer, LoiService};
use shortdeal::marketplace::offers::OfferService;
use shortdeal::telemetry;

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

    let offer_repository = Arc::new(InMemoryOfferRepository::default());
    let loi_repository = Arc::new(InMemoryLoiRepository::default());
    let renderer: Arc<dyn LoiRenderer> = Arc::new(FixedLayoutRenderer);
    let loi_service = Arc::new(LoiService::new(loi_repository, renderer));
    let offer_service = Arc::new(OfferService::new(
        offer_repository,
        loi_service.clone(),
        Arc::new(InMemoryNotificationPublisher::default()),
    ));

    if config.offers.sweep_seconds > 0 {
        let sweeper = offer_service.clone();
        let interval = Duration::from_secs(config.offers.sweep_seconds);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = sweeper.sweep_expired(Utc::now()) {
                    error!(%err, "offer expiry sweep failed");
                }
            }
        });
    }

    let app = with_marketplace_routes(offer_service, loi_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "marketplace offer service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
