// Configuration module entry point
// Layered loading: built-in defaults, optional file, then DISPATCHD__* environment

mod types;

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{Error, Result};

pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

const ENV_PREFIX: &str = "DISPATCHD";
const ENV_SEPARATOR: &str = "__";

impl Config {
    /// Load configuration using the default base name `config`
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a file path (extension optional)
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::InvalidAddress(format!("{}:{}: {e}", self.server.host, self.server.port)))
    }

    /// Per-connection timeout, `None` when both read and write limits are 0
    pub fn connection_timeout(&self) -> Option<Duration> {
        self.performance.connection_timeout()
    }
}

impl PerformanceConfig {
    pub fn connection_timeout(&self) -> Option<Duration> {
        match self.read_timeout.max(self.write_timeout) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let defaults = Config::default();
    let builder = config::Config::builder()
        .set_default("server.host", defaults.server.host)?
        .set_default("server.port", i64::from(defaults.server.port))?
        .set_default("server.backlog", i64::from(defaults.server.backlog))?
        .set_default("logging.level", defaults.logging.level)?
        .set_default("logging.access_log", defaults.logging.access_log)?
        .set_default("logging.access_log_format", defaults.logging.access_log_format)?
        .set_default("performance.keep_alive", defaults.performance.keep_alive)?
        .set_default("performance.read_timeout", defaults.performance.read_timeout)?
        .set_default("performance.write_timeout", defaults.performance.write_timeout)?
        .set_default("http.max_body_size", defaults.http.max_body_size)?
        .set_default("http.server_name", defaults.http.server_name)?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(source: &str) -> Config {
        with_defaults()
            .unwrap()
            .add_source(config::File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = from_toml("");
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.http.max_body_size, 10_485_760);
        assert_eq!(config.logging.access_log_format, "combined");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9090
            workers = 2

            [logging]
            access_log = false

            [performance]
            max_connections = 64

            [http]
            server_name = "edge"
            "#,
        );
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.workers, Some(2));
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.logging.access_log);
        assert_eq!(config.performance.max_connections, Some(64));
        assert_eq!(config.http.server_name, "edge");
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = Config::load_from("/nonexistent/dispatchd-test-config").unwrap();
        assert_eq!(config.server.backlog, 128);
    }

    #[test]
    fn test_load_default_base_name() {
        assert_eq!(Config::load().unwrap(), Config::load_from("config").unwrap());
    }

    #[test]
    fn test_socket_addr() {
        let mut config = Config::default();
        assert_eq!(config.socket_addr().unwrap().port(), 8080);

        config.server.host = "not a host".to_string();
        assert!(matches!(config.socket_addr(), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn test_connection_timeout() {
        let mut perf = PerformanceConfig::default();
        perf.read_timeout = 10;
        perf.write_timeout = 45;
        assert_eq!(perf.connection_timeout(), Some(Duration::from_secs(45)));

        perf.read_timeout = 0;
        perf.write_timeout = 0;
        assert_eq!(perf.connection_timeout(), None);
    }
}
