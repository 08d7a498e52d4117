//! Application configuration.
//!
//! Loaded from a TOML file (path from `--config`, then the `SGHSS_CONFIG`
//! environment variable, then `sghss.toml`), layered with `SGHSS`-prefixed
//! environment variables. `SGHSS_DATABASE_URL` and `SGHSS_JWT_SECRET`
//! override their fields directly so `.env` files stay simple.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use sghss_db::PostgresConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: PostgresConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.database.url.is_empty() {
            return Err("database.url must not be empty".into());
        }
        if self.database.pool_size == 0 {
            return Err("database.pool_size must be > 0".into());
        }
        if self.auth.jwt_secret.is_empty() {
            return Err("auth.jwt_secret must not be empty".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Symmetric secret for signing bearer tokens. Change in production.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
}

fn default_jwt_secret() -> String {
    "sghss-jwt-secret-change-in-production".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Load configuration from an optional TOML file plus environment layers.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(p) = path {
        builder = builder.add_source(config::File::with_name(p).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix("SGHSS").separator("__"));

    let mut cfg: AppConfig = builder.build()?.try_deserialize()?;

    if let Ok(url) = std::env::var("SGHSS_DATABASE_URL") {
        cfg.database.url = url;
    }
    if let Ok(secret) = std::env::var("SGHSS_JWT_SECRET") {
        cfg.auth.jwt_secret = secret;
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_addr_binds_all_interfaces_by_default() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_bad_logging_level_rejected() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_empty_database_url_rejected() {
        let mut cfg = AppConfig::default();
        cfg.database.url.clear();
        assert!(cfg.validate().is_err());
    }
}
