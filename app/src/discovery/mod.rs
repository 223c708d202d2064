mod identity;
mod pattern;

pub use identity::extract_device_id;
pub use pattern::is_match;

use anyhow::{Context as _, ensure};
use regex::Regex;

pub const DEFAULT_ENTITY_PATTERNS: &[&str] = &["plug", "socket", "outlet", "switch"];
pub const DEFAULT_POWER_PATTERNS: &[&str] = &["power", "watt"];
pub const DEFAULT_SWITCH_PATTERNS: &[&str] = &["switch."];
pub const DEFAULT_DEVICE_ID_PATTERN: &str =
    r"^(?:sensor|switch)\.([a-z0-9_]+?)(?:_(?:current_)?power|_watt(?:s|age)?|_energy)?$";

/// Immutable naming heuristics deciding which hub entities belong to which device.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    entity_patterns: Vec<String>,
    power_patterns: Vec<String>,
    switch_patterns: Vec<String>,
    device_id_pattern: Regex,
}

/// Roles an entity plays for its device. Both flags may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub power: bool,
    pub switch: bool,
}

impl Classification {
    pub fn is_tracked(&self) -> bool {
        self.power || self.switch
    }
}

impl DiscoveryConfig {
    pub fn new(
        entity_patterns: Vec<String>,
        power_patterns: Vec<String>,
        switch_patterns: Vec<String>,
        device_id_pattern: &str,
    ) -> anyhow::Result<Self> {
        let device_id_pattern = Regex::new(device_id_pattern)
            .with_context(|| format!("Invalid device id pattern {}", device_id_pattern))?;

        ensure!(
            device_id_pattern.captures_len() > 1,
            "Device id pattern {} needs a capture group",
            device_id_pattern
        );

        Ok(Self {
            entity_patterns: normalize(entity_patterns),
            power_patterns: normalize(power_patterns),
            switch_patterns: normalize(switch_patterns),
            device_id_pattern,
        })
    }

    #[cfg(test)]
    pub fn with_defaults() -> anyhow::Result<Self> {
        Self::new(
            to_owned(DEFAULT_ENTITY_PATTERNS),
            to_owned(DEFAULT_POWER_PATTERNS),
            to_owned(DEFAULT_SWITCH_PATTERNS),
            DEFAULT_DEVICE_ID_PATTERN,
        )
    }

    /// `None` if the entity is not relevant at all.
    pub fn classify(&self, entity_id: &str, friendly_name: &str) -> Option<Classification> {
        if !is_match(entity_id, friendly_name, &self.entity_patterns) {
            return None;
        }

        Some(Classification {
            power: is_match(entity_id, friendly_name, &self.power_patterns),
            switch: is_match(entity_id, friendly_name, &self.switch_patterns),
        })
    }

    pub fn device_id(&self, entity_id: &str, friendly_name: &str) -> Option<String> {
        extract_device_id(entity_id, friendly_name, &self.device_id_pattern)
    }
}

#[cfg(test)]
fn to_owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

fn normalize(patterns: Vec<String>) -> Vec<String> {
    patterns
        .into_iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}
