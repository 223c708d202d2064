use std::sync::Arc;

use anyhow::Context as _;
use tokio_util::sync::CancellationToken;

use crate::{
    adapter::homeassistant::HaHttpClient,
    core::time::DateTime,
    device::DeviceRegistry,
    observability::{ExporterApi, PollerMetrics, PrometheusMetrics, SystemMetrics},
    poller::Poller,
    settings::Settings,
    system::Aggregator,
};

mod adapter;
mod core;
mod device;
mod discovery;
mod observability;
mod poller;
mod settings;
mod system;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() -> anyhow::Result<()> {
    let settings = Settings::new().context("Error reading configuration")?;
    settings.validate().context("Invalid configuration")?;
    settings.monitoring().init().context("Error initializing monitoring")?;

    let discovery = settings.discovery().context("Invalid discovery configuration")?;

    let metrics = PrometheusMetrics::new();
    let registry = Arc::new(DeviceRegistry::new(Arc::new(metrics.clone())));
    let poller_metrics = Arc::new(PollerMetrics::register(&metrics)?);
    let aggregator = Aggregator::new(SystemMetrics::register(&metrics)?, settings.poll_interval());

    let hub = HaHttpClient::new(&settings.hub_url, &settings.hub_token, settings.hub_timeout())
        .context("Error initializing Home Assistant REST client")?;

    let poller = Poller::new(
        hub,
        discovery,
        registry.clone(),
        aggregator,
        poller_metrics.clone(),
        settings.poll_interval(),
    );

    let api = Arc::new(ExporterApi::new(metrics, registry, poller_metrics, DateTime::now()));
    let http_server = settings
        .http_server()
        .start_server(move || vec![observability::routes(api.clone())])?;
    let http_server_handle = http_server.handle();

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

    tracing::info!(
        "Polling {} every {}, serving metrics on port {}",
        settings.hub_url,
        settings.poll_interval(),
        settings.export_port
    );

    let result = tokio::select!(
        res = poller.run(cancel.clone()) => res,
        res = http_server => res.context("HTTP server execution failed"),
    );

    if let Err(e) = &result {
        tracing::error!("Stopping after fatal error: {:?}", e);
    }

    http_server_handle.stop(true).await;
    tracing::info!("Shutdown complete");

    result
}

async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Error listening for Ctrl-C: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Error listening for SIGTERM: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select!(
        _ = ctrl_c => {},
        _ = terminate => {},
    );

    tracing::info!("Shutdown requested");
    cancel.cancel();
}
