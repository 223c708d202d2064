//! Metric handles behind a small factory seam. Device and system code only talk to [`MetricFactory`],
//! [`Gauge`] and [`Counter`]; the exposition library is chosen in `main`.

mod api;
mod device_metrics;
mod exposition;
mod poller_metrics;
mod system_metrics;

pub use api::{ExporterApi, routes};
pub use device_metrics::DeviceMetrics;
pub use exposition::PrometheusMetrics;
pub use poller_metrics::PollerMetrics;
pub use system_metrics::SystemMetrics;

pub const METRIC_PREFIX: &str = "power_exporter";

const DEVICE_LABEL: &str = "device";
const NAME_LABEL: &str = "name";

pub trait Gauge: Send + Sync {
    fn set(&self, value: f64);
    fn get(&self) -> f64;

    /// Raises the gauge to `value` if it is higher. Peaks never decay.
    fn set_max(&self, value: f64) {
        if value > self.get() {
            self.set(value);
        }
    }
}

pub trait Counter: Send + Sync {
    fn inc_by(&self, value: f64);
    fn get(&self) -> f64;

    fn inc(&self) {
        self.inc_by(1.0);
    }
}

/// Creates and registers metric handles. Registering the same name with the same labels twice is an error.
pub trait MetricFactory: Send + Sync {
    fn gauge(&self, name: &str, help: &str, labels: &[(&str, &str)]) -> anyhow::Result<Box<dyn Gauge>>;
    fn counter(&self, name: &str, help: &str, labels: &[(&str, &str)]) -> anyhow::Result<Box<dyn Counter>>;
}

fn metric_name(name: &str) -> String {
    format!("{}_{}", METRIC_PREFIX, name)
}
