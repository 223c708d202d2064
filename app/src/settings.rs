use anyhow::ensure;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use infrastructure::{EnvFilterConfig, HttpServerConfig, MonitoringConfig, OtlpConfig};
use serde::Deserialize;

use crate::{
    core::time::Duration,
    discovery::{
        DEFAULT_DEVICE_ID_PATTERN, DEFAULT_ENTITY_PATTERNS, DEFAULT_POWER_PATTERNS, DEFAULT_SWITCH_PATTERNS,
        DiscoveryConfig,
    },
};

//one week
const MAX_SECONDS: i64 = 7 * 24 * 3600;

const LIST_KEYS: [&str; 4] = ["entity_patterns", "power_patterns", "switch_patterns", "log_filters"];

/// Flat settings, read from an optional `config.toml` and overridden by environment variables
/// (`HUB_URL` becomes `hub_url`).
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub hub_url: String,
    pub hub_token: String,
    pub export_port: u16,
    pub poll_interval_seconds: i64,
    pub hub_timeout_seconds: i64,
    pub entity_patterns: Vec<String>,
    pub power_patterns: Vec<String>,
    pub switch_patterns: Vec<String>,
    pub device_id_pattern: String,
    pub log_level: u8,
    pub log_filters: Vec<String>,
    pub service_name: String,
    pub otlp_url: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let environment = LIST_KEYS.iter().fold(
            environment.try_parsing(true).list_separator(","),
            |env, key| env.with_list_parse_key(key),
        );

        Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config.toml").required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("export_port", 9105)?
            .set_default("poll_interval_seconds", 30)?
            .set_default("hub_timeout_seconds", 10)?
            .set_default("entity_patterns", DEFAULT_ENTITY_PATTERNS.to_vec())?
            .set_default("power_patterns", DEFAULT_POWER_PATTERNS.to_vec())?
            .set_default("switch_patterns", DEFAULT_SWITCH_PATTERNS.to_vec())?
            .set_default("device_id_pattern", DEFAULT_DEVICE_ID_PATTERN)?
            .set_default("log_level", 1)?
            .set_default("log_filters", Vec::<String>::new())?
            .set_default("service_name", "power-exporter")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.hub_url.trim().is_empty(), "HUB_URL must not be empty");
        ensure!(!self.hub_token.trim().is_empty(), "HUB_TOKEN must not be empty");
        ensure!(
            (1..=MAX_SECONDS).contains(&self.poll_interval_seconds),
            "POLL_INTERVAL_SECONDS must be between 1 and {}",
            MAX_SECONDS
        );
        ensure!(
            (1..=MAX_SECONDS).contains(&self.hub_timeout_seconds),
            "HUB_TIMEOUT_SECONDS must be between 1 and {}",
            MAX_SECONDS
        );
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::seconds(self.poll_interval_seconds)
    }

    pub fn hub_timeout(&self) -> Duration {
        Duration::seconds(self.hub_timeout_seconds)
    }

    pub fn discovery(&self) -> anyhow::Result<DiscoveryConfig> {
        DiscoveryConfig::new(
            self.entity_patterns.clone(),
            self.power_patterns.clone(),
            self.switch_patterns.clone(),
            &self.device_id_pattern,
        )
    }

    pub fn http_server(&self) -> HttpServerConfig {
        HttpServerConfig::new(self.export_port)
    }

    pub fn monitoring(&self) -> MonitoringConfig {
        let filter = EnvFilterConfig {
            default_level: level_directive(self.log_level).to_owned(),
            filters: self
                .log_filters
                .iter()
                .map(|f| f.trim().to_owned())
                .filter(|f| !f.is_empty())
                .collect(),
        };

        MonitoringConfig {
            service_name: self.service_name.clone(),
            app_name: env!("CARGO_PKG_NAME").to_owned(),
            logs: filter.clone(),
            traces: filter,
            otlp: self.otlp_url.clone().map(|url| OtlpConfig { url }),
        }
    }
}

fn level_directive(log_level: u8) -> &'static str {
    match log_level {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
