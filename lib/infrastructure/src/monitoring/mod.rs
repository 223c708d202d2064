use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

//KNOWN ISSUES:
// - EnvFilter on layer-level looses log-statements when combined with the OTLP bridge. Each layer gets its own filter.

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitoringConfig {
    pub service_name: String,
    pub app_name: String,
    pub logs: EnvFilterConfig,
    pub traces: EnvFilterConfig,
    pub otlp: Option<OtlpConfig>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EnvFilterConfig {
    pub default_level: String,
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OtlpConfig {
    pub url: String,
}

impl TryInto<EnvFilter> for EnvFilterConfig {
    type Error = tracing_subscriber::filter::ParseError;

    fn try_into(self) -> Result<EnvFilter, Self::Error> {
        EnvFilter::builder()
            .with_default_directive(self.default_level.parse()?)
            .parse(self.filters.join(","))
    }
}

impl MonitoringConfig {
    pub fn init(&self) -> anyhow::Result<()> {
        let logging_filter: EnvFilter = self.logs.clone().try_into()?;

        let Some(otlp_config) = &self.otlp else {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer())
                .with(logging_filter)
                .try_init()?;

            return Ok(());
        };

        let resource = Resource::builder()
            .with_attribute(KeyValue::new("service.name", self.service_name.clone()))
            .with_attribute(KeyValue::new("app.name", self.app_name.clone()))
            .build();

        opentelemetry::global::set_text_map_propagator(TraceContextPropagator::default());

        let fmt_layer = tracing_subscriber::fmt::layer().with_filter(logging_filter);

        let logger_provider = init_logs(resource.clone(), &otlp_config.url)?;
        let otlp_logging_filter: EnvFilter = self.logs.clone().try_into()?;
        let otlp_logging_layer = OpenTelemetryTracingBridge::new(&logger_provider).with_filter(otlp_logging_filter);

        let tracer_provider = init_traces(resource, &otlp_config.url)?;
        let tracer = tracer_provider.tracer(self.app_name.to_owned());
        let tracing_filter: EnvFilter = self.traces.clone().try_into()?;
        let tracing_layer = OpenTelemetryLayer::new(tracer).with_filter(tracing_filter);

        tracing_subscriber::registry()
            .with(tracing_layer)
            .with(otlp_logging_layer)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

fn init_traces(resource: Resource, url: &str) -> Result<SdkTracerProvider, ExporterBuildError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(url)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

fn init_logs(resource: Resource, url: &str) -> Result<SdkLoggerProvider, ExporterBuildError> {
    let exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(url)
        .build()?;

    Ok(SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_with_default_level_only() {
        let config = EnvFilterConfig {
            default_level: "debug".to_string(),
            filters: vec![],
        };

        let filter: Result<EnvFilter, _> = config.try_into();

        assert!(filter.is_ok());
    }

    #[test]
    fn test_env_filter_with_directives() {
        let config = EnvFilterConfig {
            default_level: "info".to_string(),
            filters: vec!["actix_web=warn".to_string(), "reqwest=error".to_string()],
        };

        let filter: Result<EnvFilter, _> = config.try_into();

        assert!(filter.is_ok());
    }

    #[test]
    fn test_env_filter_rejects_invalid_directive() {
        let config = EnvFilterConfig {
            default_level: "info".to_string(),
            filters: vec!["actix_web=loudest".to_string()],
        };

        let filter: Result<EnvFilter, _> = config.try_into();

        assert!(filter.is_err());
    }
}
