use anyhow::Context as _;
use prometheus::{Encoder, Opts, Registry, TextEncoder};

use super::{Counter, Gauge, MetricFactory, metric_name};

/// Process-wide prometheus registry. Scrapes only read atomics, so rendering never waits for the poller.
#[derive(Clone, Default)]
pub struct PrometheusMetrics {
    registry: Registry,
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Error encoding metrics")?;

        String::from_utf8(buffer).context("Encoded metrics are not valid UTF-8")
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    fn opts(name: &str, help: &str, labels: &[(&str, &str)]) -> Opts {
        labels
            .iter()
            .fold(Opts::new(metric_name(name), help), |opts, (k, v)| opts.const_label(*k, *v))
    }
}

impl MetricFactory for PrometheusMetrics {
    fn gauge(&self, name: &str, help: &str, labels: &[(&str, &str)]) -> anyhow::Result<Box<dyn Gauge>> {
        let gauge = prometheus::Gauge::with_opts(Self::opts(name, help, labels))?;
        self.registry
            .register(Box::new(gauge.clone()))
            .with_context(|| format!("Error registering gauge {} {:?}", name, labels))?;

        Ok(Box::new(gauge))
    }

    fn counter(&self, name: &str, help: &str, labels: &[(&str, &str)]) -> anyhow::Result<Box<dyn Counter>> {
        let counter = prometheus::Counter::with_opts(Self::opts(name, help, labels))?;
        self.registry
            .register(Box::new(counter.clone()))
            .with_context(|| format!("Error registering counter {} {:?}", name, labels))?;

        Ok(Box::new(counter))
    }
}

impl Gauge for prometheus::Gauge {
    fn set(&self, value: f64) {
        prometheus::Gauge::set(self, value)
    }

    fn get(&self) -> f64 {
        prometheus::Gauge::get(self)
    }
}

impl Counter for prometheus::Counter {
    fn inc_by(&self, value: f64) {
        //prometheus counters must not go down
        if value > 0.0 {
            prometheus::Counter::inc_by(self, value)
        }
    }

    fn get(&self) -> f64 {
        prometheus::Counter::get(self)
    }
}
