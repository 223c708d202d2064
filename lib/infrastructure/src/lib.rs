mod http;
mod monitoring;

pub use monitoring::{EnvFilterConfig, MonitoringConfig, OtlpConfig};

pub use http::client::HttpClientConfig;
pub use http::server::HttpServerConfig;
