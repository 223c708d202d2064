use crate::core::unit::{KiloWattHours, Percent, Watt, WattHours};

use super::{Counter, DEVICE_LABEL, Gauge, MetricFactory, NAME_LABEL};

/// Every series exposed for one device. Created once per device id, labelled with the device id and the
/// display name known at creation.
pub struct DeviceMetrics {
    power: Box<dyn Gauge>,
    energy_wh: Box<dyn Counter>,
    energy_kwh: Box<dyn Counter>,
    peak: Box<dyn Gauge>,
    avg_1h: Box<dyn Gauge>,
    avg_24h: Box<dyn Gauge>,
    state: Box<dyn Gauge>,
    on_seconds: Box<dyn Gauge>,
    off_seconds: Box<dyn Gauge>,
    utilization: Box<dyn Gauge>,
    transitions: Box<dyn Counter>,
    signal_strength: Box<dyn Gauge>,
}

impl DeviceMetrics {
    pub fn register(factory: &dyn MetricFactory, device_id: &str, display_name: &str) -> anyhow::Result<Self> {
        let labels = [(DEVICE_LABEL, device_id), (NAME_LABEL, display_name)];

        Ok(Self {
            power: factory.gauge("device_power_watts", "Current power draw", &labels)?,
            energy_wh: factory.counter("device_energy_wh_total", "Energy consumed since start", &labels)?,
            energy_kwh: factory.counter("device_energy_kwh_total", "Energy consumed since start", &labels)?,
            peak: factory.gauge("device_power_peak_watts", "Highest power draw seen", &labels)?,
            avg_1h: factory.gauge("device_power_avg_1h_watts", "Average power over the last hour", &labels)?,
            avg_24h: factory.gauge("device_power_avg_24h_watts", "Average power over the last 24 hours", &labels)?,
            state: factory.gauge("device_state", "Switch state (1 = on, 0 = off, -1 = unknown)", &labels)?,
            on_seconds: factory.gauge("device_on_seconds", "Accumulated time switched on", &labels)?,
            off_seconds: factory.gauge("device_off_seconds", "Accumulated time switched off", &labels)?,
            utilization: factory.gauge("device_utilization_percent", "Share of time switched on", &labels)?,
            transitions: factory.counter("device_transitions_total", "Number of on/off changes", &labels)?,
            signal_strength: factory.gauge("device_signal_strength", "Last reported signal strength", &labels)?,
        })
    }

    #[cfg(test)]
    pub fn power(&self) -> Watt {
        Watt(self.power.get())
    }

    #[cfg(test)]
    pub fn peak(&self) -> Watt {
        Watt(self.peak.get())
    }

    #[cfg(test)]
    pub fn energy(&self) -> WattHours {
        WattHours(self.energy_wh.get())
    }

    #[cfg(test)]
    pub fn transitions(&self) -> f64 {
        self.transitions.get()
    }

    #[cfg(test)]
    pub fn utilization(&self) -> Percent {
        Percent(self.utilization.get())
    }

    pub fn record_power(&self, watts: Watt) {
        self.power.set(watts.0);
        self.peak.set_max(watts.0);
    }

    pub fn add_energy(&self, energy: WattHours) {
        let kwh: KiloWattHours = energy.into();
        self.energy_wh.inc_by(energy.0);
        self.energy_kwh.inc_by(kwh.0);
    }

    pub fn record_hourly_average(&self, watts: Watt) {
        self.avg_1h.set(watts.0);
    }

    pub fn record_daily_average(&self, watts: Watt) {
        self.avg_24h.set(watts.0);
    }

    pub fn record_state(&self, value: f64) {
        self.state.set(value);
    }

    pub fn record_transition(&self, on_secs: f64, off_secs: f64, utilization: Percent) {
        self.transitions.inc();
        self.on_seconds.set(on_secs);
        self.off_seconds.set(off_secs);
        self.utilization.set(utilization.0);
    }

    pub fn record_signal_strength(&self, value: f64) {
        self.signal_strength.set(value);
    }
}
