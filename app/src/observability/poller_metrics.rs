use crate::core::time::{DateTime, Duration};

use super::{Counter, Gauge, MetricFactory};

pub struct PollerMetrics {
    cycles: Box<dyn Counter>,
    errors: Box<dyn Counter>,
    duration: Box<dyn Gauge>,
    last_success: Box<dyn Gauge>,
    entities: Box<dyn Gauge>,
}

impl PollerMetrics {
    pub fn register(factory: &dyn MetricFactory) -> anyhow::Result<Self> {
        Ok(Self {
            cycles: factory.counter("poll_cycles_total", "Number of poll cycles started", &[])?,
            errors: factory.counter("poll_errors_total", "Number of failed poll cycles", &[])?,
            duration: factory.gauge("poll_duration_seconds", "Duration of the last poll cycle", &[])?,
            last_success: factory.gauge(
                "poll_last_success_timestamp_seconds",
                "Unix time of the last successful poll cycle",
                &[],
            )?,
            entities: factory.gauge("entities_seen", "Number of entities in the last snapshot", &[])?,
        })
    }

    pub fn record_cycle(&self, duration: Duration) {
        self.cycles.inc();
        self.duration.set(duration.as_secs_f64());
    }

    pub fn record_error(&self) {
        self.errors.inc();
    }

    pub fn record_success(&self, at: DateTime, entity_count: usize) {
        self.last_success.set(at.timestamp_secs_f64());
        self.entities.set(entity_count as f64);
    }

    pub fn cycles(&self) -> u64 {
        self.cycles.get() as u64
    }

    pub fn errors(&self) -> u64 {
        self.errors.get() as u64
    }

    /// Unix time of the last successful cycle, `None` before the first one.
    pub fn last_success(&self) -> Option<f64> {
        let value = self.last_success.get();
        (value > 0.0).then_some(value)
    }
}
