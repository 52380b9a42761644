use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::models::Config;

pub const CONFIG_PATH_VAR: &str = "USRLINKS_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "USRLINKS_CONFIG_JSON";
pub const HOST_VAR: &str = "USRLINKS_HOST";
pub const PORT_VAR: &str = "USRLINKS_PORT";
pub const PLATFORMS_PATH_VAR: &str = "USRLINKS_PLATFORMS_PATH";

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("usrlinks.toml"),
        PathBuf::from("usrlinks.json"),
        PathBuf::from("config/usrlinks.toml"),
        PathBuf::from("config/usrlinks.json"),
    ]
});

/// Source that produced the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    Explicit(PathBuf),
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Environment values the loader consults, captured once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub config_path: Option<String>,
    pub config_json: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub platforms_path: Option<String>,
}

impl EnvOverrides {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var(CONFIG_PATH_VAR),
            config_json: non_empty_var(CONFIG_JSON_VAR),
            host: non_empty_var(HOST_VAR),
            port: non_empty_var(PORT_VAR),
            platforms_path: non_empty_var(PLATFORMS_PATH_VAR),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    /// Document path given on the command line. Wins over every env var.
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Directory the default file candidates are resolved against.
    pub search_root: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub source: ConfigSource,
    pub env_file_loaded: bool,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_search_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.search_root = Some(path.into());
        self
    }

    /// Loads `.env`, then resolves the configuration from the process
    /// environment.
    pub fn load(&self) -> anyhow::Result<ConfigLoad> {
        let env_file_loaded = self.load_env_file()?;
        let mut load = self.load_with_env(&EnvOverrides::gather())?;
        load.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Resolution against captured environment values.
    ///
    /// Evaluation order:
    /// 1) the explicit path from the options,
    /// 2) `$USRLINKS_CONFIG_PATH` (TOML or JSON file),
    /// 3) `$USRLINKS_CONFIG_JSON` (inline JSON),
    /// 4) the first default location that exists,
    /// 5) defaults.
    ///
    /// Host, port and platform path overrides apply on top of whichever
    /// document was chosen.
    pub fn load_with_env(
        &self,
        env: &EnvOverrides,
    ) -> anyhow::Result<ConfigLoad> {
        let (mut config, source) = self.resolve_document(env)?;
        apply_overrides(&mut config, env)?;
        debug!(?source, "configuration resolved");

        Ok(ConfigLoad {
            config,
            source,
            env_file_loaded: false,
        })
    }

    fn resolve_document(
        &self,
        env: &EnvOverrides,
    ) -> anyhow::Result<(Config, ConfigSource)> {
        if let Some(path) = &self.options.config_path {
            let config = load_from_file(path)?;
            return Ok((config, ConfigSource::Explicit(path.clone())));
        }

        if let Some(path_str) = &env.config_path {
            let path = PathBuf::from(path_str);
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = &env.config_json {
            let config = parse_json(raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))?;
            return Ok((config, ConfigSource::EnvInline));
        }

        if let Some(path) = self.find_default_file() {
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Config::default(), ConfigSource::Default))
    }

    fn find_default_file(&self) -> Option<PathBuf> {
        let root = self.options.search_root.as_deref();
        DEFAULT_CONFIG_LOCATIONS
            .iter()
            .map(|candidate| match root {
                Some(root) => root.join(candidate),
                None => candidate.clone(),
            })
            .find(|path| path.exists())
    }

    fn load_env_file(&self) -> anyhow::Result<bool> {
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match loaded {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err).context("failed to read .env file"),
        }
    }
}

fn apply_overrides(
    config: &mut Config,
    env: &EnvOverrides,
) -> anyhow::Result<()> {
    if let Some(host) = &env.host {
        config.server.host = host.trim().to_string();
    }
    if let Some(port) = &env.port {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("invalid {PORT_VAR} value {port:?}"))?;
    }
    if let Some(path) = &env.platforms_path {
        config.registry.path = Some(PathBuf::from(path));
    }
    Ok(())
}

pub fn load_from_file(path: &Path) -> anyhow::Result<Config> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!("failed to read usrlinks config from {}", path.display())
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&contents)
            .with_context(|| format!("invalid usrlinks config {}", path.display())),
        Some("toml") => toml::from_str(&contents).map_err(|err| {
            anyhow!("invalid usrlinks config {}: {}", path.display(), err)
        }),
        _ => parse_from_str(&contents, &path.display().to_string()),
    }
}

/// TOML first, then JSON.
pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Config> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "failed to parse usrlinks config {}: toml error: {}; json error: {}",
                origin,
                toml_err,
                json_err
            )
        })
    })
}

pub fn parse_json(raw: &str) -> anyhow::Result<Config> {
    serde_json::from_str(raw)
        .map_err(|err| anyhow!("invalid usrlinks config json: {err}"))
}
