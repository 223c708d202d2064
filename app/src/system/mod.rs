use crate::{
    core::{
        time::Duration,
        unit::{Watt, WattHours},
    },
    device::{DeviceSnapshot, PowerState},
    observability::SystemMetrics,
};

/// System-wide view after one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemAggregate {
    pub total_power: Watt,
    pub energy: WattHours,
    pub peak: Watt,
    pub hourly_average: Option<Watt>,
    pub daily_average: Option<Watt>,
    pub devices: usize,
    pub devices_on: usize,
}

/// Current totals over the devices, without any accumulated state.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_power: Watt,
    pub hourly_average: Option<Watt>,
    pub daily_average: Option<Watt>,
    pub devices: usize,
    pub devices_on: usize,
}

pub fn summarize(devices: &[DeviceSnapshot]) -> Summary {
    Summary {
        total_power: devices.iter().map(|d| d.record.last_power).sum(),
        hourly_average: sum_present(devices.iter().map(|d| d.hourly_average)),
        daily_average: sum_present(devices.iter().map(|d| d.daily_average)),
        devices: devices.len(),
        devices_on: devices.iter().filter(|d| d.record.last_state == PowerState::On).count(),
    }
}

//None only if no device has a value
fn sum_present(values: impl Iterator<Item = Option<Watt>>) -> Option<Watt> {
    values.flatten().fold(None, |acc, w| Some(acc.unwrap_or_default() + w))
}

/// Rolls device snapshots up into the system series. Peak and energy live in the metrics only.
pub struct Aggregator {
    metrics: SystemMetrics,
    interval: Duration,
}

impl Aggregator {
    pub fn new(metrics: SystemMetrics, interval: Duration) -> Self {
        Self { metrics, interval }
    }

    pub fn recompute(&self, devices: &[DeviceSnapshot]) -> SystemAggregate {
        let summary = summarize(devices);

        self.metrics.record_power(summary.total_power);
        self.metrics.add_energy(summary.total_power.over(self.interval));

        if let Some(avg) = summary.hourly_average {
            self.metrics.record_hourly_average(avg);
        }
        if let Some(avg) = summary.daily_average {
            self.metrics.record_daily_average(avg);
        }

        self.metrics.record_device_counts(summary.devices, summary.devices_on);

        tracing::debug!(
            "System power {} from {} devices ({} on)",
            summary.total_power,
            summary.devices,
            summary.devices_on
        );

        SystemAggregate {
            total_power: summary.total_power,
            energy: self.metrics.energy(),
            peak: self.metrics.peak(),
            hourly_average: summary.hourly_average,
            daily_average: summary.daily_average,
            devices: summary.devices,
            devices_on: summary.devices_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device::{DeviceRecord, EntityIds},
        observability::PrometheusMetrics,
        t,
    };

    fn snapshot(id: &str, watts: f64, state: PowerState, hourly: Option<f64>) -> DeviceSnapshot {
        DeviceSnapshot {
            record: DeviceRecord {
                device_id: id.to_string(),
                display_name: id.to_string(),
                entity_ids: EntityIds::default(),
                last_power: Watt(watts),
                last_state: state,
            },
            hourly_average: hourly.map(Watt),
            daily_average: hourly.map(Watt),
        }
    }

    fn aggregator(interval: Duration) -> Aggregator {
        Aggregator::new(SystemMetrics::register(&PrometheusMetrics::new()).unwrap(), interval)
    }

    #[test]
    fn test_total_power_is_sum_of_last_readings() {
        let devices = vec![
            snapshot("tv", 80.0, PowerState::On, Some(70.0)),
            snapshot("fridge", 120.5, PowerState::Unknown, None),
            snapshot("kettle", 0.0, PowerState::Off, Some(10.0)),
        ];

        let summary = summarize(&devices);

        assert_eq!(summary.total_power, Watt(200.5));
        assert_eq!(summary.devices, 3);
        assert_eq!(summary.devices_on, 1);
        assert_eq!(summary.hourly_average, Some(Watt(80.0)));
    }

    #[test]
    fn test_off_devices_keep_last_reading() {
        let devices = vec![snapshot("kettle", 3.5, PowerState::Off, None)];

        assert_eq!(summarize(&devices).total_power, Watt(3.5));
    }

    #[test]
    fn test_no_averages_without_samples() {
        let devices = vec![snapshot("tv", 10.0, PowerState::On, None)];

        assert_eq!(summarize(&devices).hourly_average, None);
        assert_eq!(summarize(&[]).total_power, Watt(0.0));
    }

    #[test]
    fn test_system_peak_never_decays() {
        let aggregator = aggregator(t!(30 seconds));

        for watts in [5.0, 15.0, 8.0] {
            aggregator.recompute(&[snapshot("tv", watts, PowerState::On, None)]);
        }

        let aggregate = aggregator.recompute(&[snapshot("tv", 8.0, PowerState::On, None)]);
        assert_eq!(aggregate.peak, Watt(15.0));
        assert_eq!(aggregate.total_power, Watt(8.0));
    }

    #[test]
    fn test_energy_never_decreases() {
        let aggregator = aggregator(t!(30 minutes));
        let mut last = WattHours(0.0);

        for watts in [100.0, 0.0, 50.0, 0.0, 200.0] {
            let aggregate = aggregator.recompute(&[snapshot("tv", watts, PowerState::On, None)]);
            assert!(aggregate.energy >= last);
            last = aggregate.energy;
        }

        assert_eq!(last, WattHours(175.0));
    }
}
