use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{
    adapter::homeassistant::{EntityState, FetchError},
    core::time::{DateTime, Duration},
    device::DeviceRegistry,
    discovery::DiscoveryConfig,
    observability::PollerMetrics,
    system::{Aggregator, SystemAggregate},
    t,
};

/// Where the poller takes the full entity snapshot from.
pub trait StateSource {
    async fn fetch_states(&self) -> Result<Vec<EntityState>, FetchError>;
}

pub struct Poller<S: StateSource> {
    source: S,
    discovery: DiscoveryConfig,
    registry: Arc<DeviceRegistry>,
    aggregator: Aggregator,
    metrics: Arc<PollerMetrics>,
    interval: Duration,
}

impl<S: StateSource> Poller<S> {
    pub fn new(
        source: S,
        discovery: DiscoveryConfig,
        registry: Arc<DeviceRegistry>,
        aggregator: Aggregator,
        metrics: Arc<PollerMetrics>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            discovery,
            registry,
            aggregator,
            metrics,
            interval,
        }
    }

    /// Polls until cancelled. Only a failure to create device metrics ends the loop with an error.
    pub async fn run(self, cancel: CancellationToken) -> anyhow::Result<()> {
        let mut timer = tokio::time::interval(self.interval.into());
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = timer.tick() => {},
            };

            let cycle = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                res = self.poll_once(t!(now)) => res,
            };

            cycle?;
        }

        tracing::info!("Poller stopped");
        Ok(())
    }

    /// One fetch-classify-update-aggregate cycle. A failed fetch leaves all device state untouched and
    /// returns `Ok(None)`.
    #[tracing::instrument(skip(self))]
    pub async fn poll_once(&self, now: DateTime) -> anyhow::Result<Option<SystemAggregate>> {
        let started = std::time::Instant::now();
        let result = self.cycle(now).await;

        match Duration::try_from(started.elapsed()) {
            Ok(duration) => self.metrics.record_cycle(duration),
            Err(e) => tracing::warn!("Error measuring poll duration: {:?}", e),
        }

        result
    }

    async fn cycle(&self, now: DateTime) -> anyhow::Result<Option<SystemAggregate>> {
        let entities = match self.source.fetch_states().await {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!("Skipping poll cycle, error fetching states: {:?}", e);
                self.metrics.record_error();
                return Ok(None);
            }
        };

        for entity in entities.iter() {
            self.process_entity(entity, now).await?;
        }

        let snapshots = self.registry.snapshots(now).await;
        let aggregate = self.aggregator.recompute(&snapshots);

        self.metrics.record_success(now, entities.len());
        tracing::debug!(
            "Poll cycle done: {} entities, {} devices, {} total",
            entities.len(),
            aggregate.devices,
            aggregate.total_power
        );

        Ok(Some(aggregate))
    }

    async fn process_entity(&self, entity: &EntityState, now: DateTime) -> anyhow::Result<()> {
        let name = entity.friendly_name();

        let class = match self.discovery.classify(&entity.entity_id, name) {
            Some(class) if class.is_tracked() => class,
            _ => return Ok(()),
        };

        let Some(device_id) = self.discovery.device_id(&entity.entity_id, name) else {
            tracing::debug!("No device id for entity {} ({}), skipping", entity.entity_id, name);
            return Ok(());
        };

        let display_name = if name.is_empty() { device_id.as_str() } else { name };
        let device = self.registry.get_or_create(&device_id, display_name, now).await?;

        if class.power {
            match entity.power_reading() {
                Some(watts) => {
                    device
                        .observe_power(&entity.entity_id, watts, now, self.interval)
                        .await
                }
                None => tracing::debug!("No power value for {} this cycle: {:?}", entity.entity_id, entity.state),
            }
        }

        if class.switch {
            device
                .observe_switch(&entity.entity_id, entity.switch_state(), now)
                .await;
        }

        if let Some(signal) = entity.signal_strength() {
            device.observe_signal_strength(signal);
        }

        device.observe_name(name, class.switch).await;

        Ok(())
    }
}
