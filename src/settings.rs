use crate::Error;
use config::Config;
use std::time::Duration;

const INVERTER_IP: &str = "192.168.2.123";
const INVERTER_PORT: i64 = 12345;
const GRAPHITE_HOST: &str = "127.0.0.1";
const GRAPHITE_PORT: i64 = 2003;

/// Runtime configuration, read from environment variables (`INVERTER_IP`, `GRAPHITE_PREFIX`,
/// ...). Variable names map to field names lowercased.
///
/// Logging is configured separately through `RUST_LOG`; it defaults to `info`, which prints
/// every line sent to graphite. `RUST_LOG=warn` keeps only failures.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Settings {
    pub inverter_ip: String,
    pub inverter_port: u16,
    /// Seconds allowed for connecting and for reading one response.
    pub inverter_timeout: u64,
    /// Prepended verbatim to `solarmax.<metric>`, so it should end with a dot.
    pub graphite_prefix: String,
    pub graphite_host: String,
    pub graphite_port: u16,
    /// Seconds to sleep between poll cycles.
    pub poll_interval: u64,
    /// Consecutive connection failures tolerated before exiting, 0 retries forever.
    pub max_connect_failures: u32,
    #[serde(default)]
    pub exporter_port: Option<u16>,
    pub exporter_address: String,
}

impl Settings {
    pub fn from_env() -> Result<Settings, Error> {
        let mut settings = Config::default();
        settings.merge(config::Environment::new())?;
        Settings::from_config(settings)
    }

    /// Fill in defaults for anything `settings` leaves unset.
    pub fn from_config(mut settings: Config) -> Result<Settings, Error> {
        settings
            .set_default("inverter_ip", INVERTER_IP)?
            .set_default("inverter_port", INVERTER_PORT)?
            .set_default("inverter_timeout", 10i64)?
            .set_default("graphite_prefix", "")?
            .set_default("graphite_host", GRAPHITE_HOST)?
            .set_default("graphite_port", GRAPHITE_PORT)?
            .set_default("poll_interval", 10i64)?
            .set_default("max_connect_failures", 30i64)?
            .set_default("exporter_address", "127.0.0.1")?;

        settings.try_into().map_err(Error::from)
    }

    pub fn inverter_addr(&self) -> String {
        format!("{}:{}", self.inverter_ip, self.inverter_port)
    }

    pub fn graphite_addr(&self) -> String {
        format!("{}:{}", self.graphite_host, self.graphite_port)
    }

    pub fn inverter_timeout(&self) -> Duration {
        Duration::from_secs(self.inverter_timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}
