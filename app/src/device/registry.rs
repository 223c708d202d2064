use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{core::time::DateTime, observability::MetricFactory};

use super::{Device, DeviceSnapshot};

/// All devices discovered since start. Devices are never removed, and every device id gets exactly one
/// metric set.
pub struct DeviceRegistry {
    devices: RwLock<HashMap<String, Arc<Device>>>,
    factory: Arc<dyn MetricFactory>,
}

impl DeviceRegistry {
    pub fn new(factory: Arc<dyn MetricFactory>) -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
            factory,
        }
    }

    pub async fn get(&self, device_id: &str) -> Option<Arc<Device>> {
        self.devices.read().await.get(device_id).cloned()
    }

    /// Returns the device with the given id, creating it together with its metrics on first sighting.
    /// Lookup and creation happen under the write lock, so concurrent callers can't register twice.
    pub async fn get_or_create(
        &self,
        device_id: &str,
        display_name: &str,
        now: DateTime,
    ) -> anyhow::Result<Arc<Device>> {
        if let Some(device) = self.get(device_id).await {
            return Ok(device);
        }

        let mut devices = self.devices.write().await;
        if let Some(device) = devices.get(device_id) {
            return Ok(device.clone());
        }

        let device = Arc::new(Device::new(device_id, display_name, now, self.factory.as_ref())?);
        devices.insert(device_id.to_owned(), device.clone());

        tracing::info!("Discovered device {} ({})", device_id, display_name);
        Ok(device)
    }

    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Snapshots of all devices, ordered by device id.
    pub async fn snapshots(&self, now: DateTime) -> Vec<DeviceSnapshot> {
        let mut devices: Vec<Arc<Device>> = self.devices.read().await.values().cloned().collect();
        devices.sort_by(|a, b| a.id().cmp(b.id()));

        let mut snapshots = Vec::with_capacity(devices.len());
        for device in devices {
            snapshots.push(device.snapshot(now).await);
        }

        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::testing::CountingMetricFactory;

    const METRICS_PER_DEVICE: usize = 12;

    fn now() -> DateTime {
        DateTime::from_iso("2025-03-01T12:00:00Z").unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let factory = Arc::new(CountingMetricFactory::new());
        let registry = DeviceRegistry::new(factory.clone());

        let first = registry.get_or_create("kitchen_plug", "Kitchen Plug", now()).await.unwrap();
        for _ in 0..10 {
            let again = registry.get_or_create("kitchen_plug", "Other Name", now()).await.unwrap();
            assert!(Arc::ptr_eq(&first, &again));
        }

        assert_eq!(registry.len().await, 1);
        assert_eq!(factory.registrations(), METRICS_PER_DEVICE);
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_registers_once() {
        let factory = Arc::new(CountingMetricFactory::new());
        let registry = Arc::new(DeviceRegistry::new(factory.clone()));

        let handles = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.get_or_create("desk", "Desk", now()).await.map(|_| ()) })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(registry.len().await, 1);
        assert_eq!(factory.registrations(), METRICS_PER_DEVICE);
    }

    #[tokio::test]
    async fn test_snapshots_are_sorted() {
        let registry = DeviceRegistry::new(Arc::new(CountingMetricFactory::new()));

        registry.get_or_create("tv", "TV", now()).await.unwrap();
        registry.get_or_create("desk", "Desk", now()).await.unwrap();

        let ids = registry
            .snapshots(now())
            .await
            .into_iter()
            .map(|s| s.record.device_id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["desk".to_string(), "tv".to_string()]);
    }
}
