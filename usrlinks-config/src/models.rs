use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use usrlinks_core::EngineConfig;

/// Ledger retention applied by the service when the document leaves it
/// unset.
pub const DEFAULT_LEDGER_TTL_SECS: u64 = 3_600;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
    pub engine: EngineConfig,
}

impl Config {
    /// Engine settings with service defaults filled in.
    pub fn engine_config(&self) -> EngineConfig {
        let mut engine = self.engine.clone();
        if engine.ledger.ttl_secs.is_none() {
            engine.ledger.ttl_secs = Some(DEFAULT_LEDGER_TTL_SECS);
        }
        engine
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|err| anyhow::anyhow!("invalid listen address {raw}: {err}"))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Platform document to load instead of the built-in set.
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_defaults_ledger_ttl() {
        let config = Config::default();
        assert_eq!(config.engine.ledger.ttl_secs, None);
        assert_eq!(
            config.engine_config().ledger.ttl_secs,
            Some(DEFAULT_LEDGER_TTL_SECS)
        );
    }

    #[test]
    fn explicit_ttl_is_kept() {
        let config: Config = toml::from_str(
            r#"
            [engine.ledger]
            ttl_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.engine_config().ledger.ttl_secs, Some(0));
        assert_eq!(config.engine_config().ledger.ttl(), None);
    }

    #[test]
    fn socket_addr_from_parts() {
        let server = ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
        };
        assert_eq!(server.socket_addr().unwrap().port(), 8080);
        assert!(
            ServerConfig {
                host: "not a host".into(),
                port: 1
            }
            .socket_addr()
            .is_err()
        );
    }
}
