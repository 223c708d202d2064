use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError, http::header, web};
use derive_more::derive::{Display, Error};
use serde::Serialize;

use crate::{core::time::DateTime, device::DeviceRegistry};

use super::{PollerMetrics, PrometheusMetrics};

const INDEX_HTML: &str = r#"<html>
<head><title>Power Exporter</title></head>
<body>
<h1>Power Exporter</h1>
<ul>
<li><a href="/metrics">/metrics</a></li>
<li><a href="/health">/health</a></li>
<li><a href="/ready">/ready</a></li>
<li><a href="/status">/status</a></li>
</ul>
</body>
</html>"#;

pub struct ExporterApi {
    metrics: PrometheusMetrics,
    registry: Arc<DeviceRegistry>,
    poller: Arc<PollerMetrics>,
    started_at: DateTime,
}

impl ExporterApi {
    pub fn new(
        metrics: PrometheusMetrics,
        registry: Arc<DeviceRegistry>,
        poller: Arc<PollerMetrics>,
        started_at: DateTime,
    ) -> Self {
        Self {
            metrics,
            registry,
            poller,
            started_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct Status {
    version: &'static str,
    uptime_secs: i64,
    devices: usize,
    last_success: Option<String>,
    poll_cycles: u64,
    poll_errors: u64,
}

#[derive(Debug, Error, Display)]
enum ExporterApiError {
    #[display("Error rendering metrics")]
    RenderError(anyhow::Error),
}

impl ResponseError for ExporterApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        tracing::warn!("ExporterApiError: {:?}", self);
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub fn routes(api: Arc<ExporterApi>) -> actix_web::Scope {
    web::scope("")
        .route("/", web::get().to(index))
        .route("/metrics", web::get().to(metrics))
        .route("/health", web::get().to(health))
        .route("/ready", web::get().to(ready))
        .route("/status", web::get().to(status))
        .app_data(web::Data::from(api))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .append_header(header::ContentType(mime::TEXT_HTML_UTF_8))
        .body(INDEX_HTML)
}

async fn metrics(api: web::Data<ExporterApi>) -> Result<HttpResponse, ExporterApiError> {
    let body = api.metrics.render().map_err(ExporterApiError::RenderError)?;

    Ok(HttpResponse::Ok()
        .append_header((header::CONTENT_TYPE, api.metrics.content_type()))
        .body(body))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

async fn ready(api: web::Data<ExporterApi>) -> HttpResponse {
    if api.poller.last_success().is_some() {
        HttpResponse::Ok().body("READY")
    } else {
        HttpResponse::ServiceUnavailable().body("waiting for first poll cycle")
    }
}

async fn status(api: web::Data<ExporterApi>) -> HttpResponse {
    let status = Status {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: api.started_at.elapsed().as_secs(),
        devices: api.registry.len().await,
        last_success: api
            .poller
            .last_success()
            .and_then(DateTime::from_timestamp_secs_f64)
            .map(|dt| dt.to_iso_string()),
        poll_cycles: api.poller.cycles(),
        poll_errors: api.poller.errors(),
    };

    HttpResponse::Ok().json(status)
}
