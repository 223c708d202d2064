mod history;
mod registry;
mod transition;

pub use registry::DeviceRegistry;

use derive_more::derive::Display;
use tokio::sync::Mutex;

use crate::{
    core::{
        time::{DateTime, Duration},
        timeseries::DataPoint,
        unit::Watt,
    },
    observability::{DeviceMetrics, MetricFactory},
};

use history::PowerHistory;
use transition::{Observation, TransitionTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PowerState {
    #[display("on")]
    On,
    #[display("off")]
    Off,
    #[display("unknown")]
    Unknown,
}

impl PowerState {
    fn metric_value(&self) -> f64 {
        match self {
            PowerState::On => 1.0,
            PowerState::Off => 0.0,
            PowerState::Unknown => -1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityIds {
    pub power: Option<String>,
    pub switch: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub device_id: String,
    pub display_name: String,
    pub entity_ids: EntityIds,
    pub last_power: Watt,
    pub last_state: PowerState,
}

/// Point-in-time copy of a device, used for aggregation.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    pub record: DeviceRecord,
    pub hourly_average: Option<Watt>,
    pub daily_average: Option<Watt>,
}

struct DeviceState {
    record: DeviceRecord,
    history: PowerHistory,
    tracker: TransitionTracker,
}

/// A discovered device. Owns its metric set; all mutation goes through the poller.
pub struct Device {
    id: String,
    metrics: DeviceMetrics,
    state: Mutex<DeviceState>,
}

impl Device {
    fn new(id: &str, display_name: &str, now: DateTime, factory: &dyn MetricFactory) -> anyhow::Result<Self> {
        let metrics = DeviceMetrics::register(factory, id, display_name)?;
        metrics.record_state(PowerState::Unknown.metric_value());

        Ok(Self {
            id: id.to_owned(),
            metrics,
            state: Mutex::new(DeviceState {
                record: DeviceRecord {
                    device_id: id.to_owned(),
                    display_name: display_name.to_owned(),
                    entity_ids: EntityIds::default(),
                    last_power: Watt(0.0),
                    last_state: PowerState::Unknown,
                },
                history: PowerHistory::new(),
                tracker: TransitionTracker::new(now),
            }),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[cfg(test)]
    pub fn metrics(&self) -> &DeviceMetrics {
        &self.metrics
    }

    /// Records a valid power reading taken at `now`. The reading is assumed to hold for one poll interval.
    /// The first power entity seen is bound to the device; readings of other entities are ignored.
    pub async fn observe_power(&self, entity_id: &str, watts: Watt, now: DateTime, interval: Duration) {
        let mut state = self.state.lock().await;

        let bound = state.record.entity_ids.power.get_or_insert_with(|| entity_id.to_owned());
        if bound != entity_id {
            tracing::debug!("Ignoring power of {} for device {}, bound to {}", entity_id, self.id, bound);
            return;
        }

        state.record.last_power = watts;

        self.metrics.record_power(watts);
        self.metrics.add_energy(watts.over(interval));

        state.history.append(DataPoint::new(watts, now));

        if let Some(avg) = state.history.hourly_average(now) {
            self.metrics.record_hourly_average(avg);
        }
        if let Some(avg) = state.history.daily_average() {
            self.metrics.record_daily_average(avg);
        }
    }

    pub async fn observe_switch(&self, entity_id: &str, power_state: PowerState, now: DateTime) {
        let mut state = self.state.lock().await;

        let bound = state.record.entity_ids.switch.get_or_insert_with(|| entity_id.to_owned());
        if bound != entity_id {
            tracing::debug!("Ignoring switch {} for device {}, bound to {}", entity_id, self.id, bound);
            return;
        }

        match state.tracker.observe(power_state, now) {
            Observation::Unchanged => {}
            Observation::Initial => {
                tracing::debug!("Device {} initially {}", self.id, power_state);
                state.record.last_state = power_state;
                self.metrics.record_state(power_state.metric_value());
            }
            Observation::Transition { elapsed } => {
                tracing::debug!("Device {} switched {} after {}", self.id, power_state, elapsed);
                state.record.last_state = power_state;
                self.metrics.record_state(power_state.metric_value());
                self.metrics.record_transition(
                    state.tracker.on_time().as_secs_f64(),
                    state.tracker.off_time().as_secs_f64(),
                    state.tracker.utilization(),
                );
            }
        }
    }

    pub fn observe_signal_strength(&self, value: f64) {
        self.metrics.record_signal_strength(value);
    }

    /// Switch entity names win over names of other entities of the device.
    pub async fn observe_name(&self, friendly_name: &str, from_switch: bool) {
        if friendly_name.is_empty() {
            return;
        }

        let mut state = self.state.lock().await;
        if (from_switch || state.record.entity_ids.switch.is_none()) && state.record.display_name != friendly_name {
            state.record.display_name = friendly_name.to_owned();
        }
    }

    pub async fn snapshot(&self, now: DateTime) -> DeviceSnapshot {
        let state = self.state.lock().await;

        DeviceSnapshot {
            record: state.record.clone(),
            hourly_average: state.history.hourly_average(now),
            daily_average: state.history.daily_average(),
        }
    }
}
