//! Configuration for the usrlinks service.
//!
//! Values come from, in order of precedence: environment overrides, one
//! config document (explicit path, `USRLINKS_CONFIG_PATH`,
//! `USRLINKS_CONFIG_JSON`, or a default file), then built-in defaults.

#![allow(missing_docs)]

pub mod loader;
pub mod models;

pub use loader::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, ConfigSource, EnvOverrides,
};
pub use models::{
    Config, DEFAULT_LEDGER_TTL_SECS, RegistryConfig, ServerConfig,
};
