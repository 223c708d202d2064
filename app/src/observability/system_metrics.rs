use crate::core::unit::{Watt, WattHours};

use super::{Counter, Gauge, MetricFactory};

pub struct SystemMetrics {
    power: Box<dyn Gauge>,
    energy: Box<dyn Counter>,
    peak: Box<dyn Gauge>,
    avg_1h: Box<dyn Gauge>,
    avg_24h: Box<dyn Gauge>,
    devices: Box<dyn Gauge>,
    devices_on: Box<dyn Gauge>,
}

impl SystemMetrics {
    pub fn register(factory: &dyn MetricFactory) -> anyhow::Result<Self> {
        Ok(Self {
            power: factory.gauge("system_power_watts", "Total power draw of all devices", &[])?,
            energy: factory.counter("system_energy_wh_total", "Total energy consumed since start", &[])?,
            peak: factory.gauge("system_power_peak_watts", "Highest total power draw seen", &[])?,
            avg_1h: factory.gauge("system_power_avg_1h_watts", "Sum of the devices' hourly averages", &[])?,
            avg_24h: factory.gauge("system_power_avg_24h_watts", "Sum of the devices' daily averages", &[])?,
            devices: factory.gauge("system_devices", "Number of discovered devices", &[])?,
            devices_on: factory.gauge("system_devices_on", "Number of devices switched on", &[])?,
        })
    }

    pub fn record_power(&self, total: Watt) {
        self.power.set(total.0);
        self.peak.set_max(total.0);
    }

    pub fn peak(&self) -> Watt {
        Watt(self.peak.get())
    }

    pub fn add_energy(&self, energy: WattHours) {
        self.energy.inc_by(energy.0);
    }

    pub fn energy(&self) -> WattHours {
        WattHours(self.energy.get())
    }

    pub fn record_hourly_average(&self, watts: Watt) {
        self.avg_1h.set(watts.0);
    }

    pub fn record_daily_average(&self, watts: Watt) {
        self.avg_24h.set(watts.0);
    }

    pub fn record_device_counts(&self, devices: usize, devices_on: usize) {
        self.devices.set(devices as f64);
        self.devices_on.set(devices_on as f64);
    }
}
