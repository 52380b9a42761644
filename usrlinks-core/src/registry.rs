//! The endpoint registry: every platform a scan probes, keyed by name.
//!
//! Documents are JSON (or TOML) objects mapping a platform name to a
//! [`PlatformRule`]. A document is accepted whole or not at all; callers
//! that need a working registry regardless use [`EndpointRegistry::load_or_default`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{error, info, warn};
use usrlinks_model::{DetectionMethod, EndpointDescriptor, PlatformRule};

use crate::error::RegistryError;

const BUILTIN_DOCUMENT: &str = include_str!("../data/platforms.json");

static BUILTIN: Lazy<EndpointRegistry> = Lazy::new(|| {
    EndpointRegistry::from_json(BUILTIN_DOCUMENT, "builtin").unwrap_or_else(
        |err| {
            error!("embedded platform registry is invalid: {err}");
            EndpointRegistry::default()
        },
    )
});

/// Where a loaded registry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    Builtin,
    File(PathBuf),
    /// The file at `path` was unusable and the built-in set was used.
    Fallback { path: PathBuf, reason: String },
}

impl fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrySource::Builtin => f.write_str("builtin"),
            RegistrySource::File(path) => write!(f, "{}", path.display()),
            RegistrySource::Fallback { path, .. } => {
                write!(f, "builtin (fallback from {})", path.display())
            }
        }
    }
}

/// Immutable set of endpoint descriptors, iterated in name order.
///
/// Descriptors are handed out as shared references; executors never copy
/// and mutate them.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    descriptors: BTreeMap<String, Arc<EndpointDescriptor>>,
}

impl EndpointRegistry {
    /// The platform set shipped with the crate.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = EndpointDescriptor>,
    ) -> Self {
        let descriptors = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.name.clone(), Arc::new(descriptor)))
            .collect();
        Self { descriptors }
    }

    pub fn from_json(
        contents: &str,
        origin: &str,
    ) -> Result<Self, RegistryError> {
        let rules: BTreeMap<String, PlatformRule> =
            serde_json::from_str(contents).map_err(|err| {
                RegistryError::Parse {
                    origin: origin.to_string(),
                    reason: err.to_string(),
                }
            })?;
        Self::from_rules(rules, origin)
    }

    pub fn from_toml(
        contents: &str,
        origin: &str,
    ) -> Result<Self, RegistryError> {
        let rules: BTreeMap<String, PlatformRule> = toml::from_str(contents)
            .map_err(|err| RegistryError::Parse {
                origin: origin.to_string(),
                reason: err.to_string(),
            })?;
        Self::from_rules(rules, origin)
    }

    /// Parses a document whose format is not known up front: JSON first,
    /// then TOML. The JSON error is reported when both fail.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> Result<Self, RegistryError> {
        match Self::from_json(contents, origin) {
            Ok(registry) => Ok(registry),
            Err(json_err) => {
                Self::from_toml(contents, origin).map_err(|_| json_err)
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            RegistryError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let origin = path.display().to_string();

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents, &origin),
            Some("toml") => Self::from_toml(&contents, &origin),
            _ => Self::parse_from_str(&contents, &origin),
        }
    }

    /// Loads `path` when given, falling back to the built-in set with a
    /// warning if the file is missing or invalid.
    pub fn load_or_default(path: Option<&Path>) -> (Self, RegistrySource) {
        let Some(path) = path else {
            return (Self::builtin(), RegistrySource::Builtin);
        };

        match Self::load_from_file(path) {
            Ok(registry) => {
                info!(
                    platforms = registry.len(),
                    "loaded platform registry from {}",
                    path.display()
                );
                (registry, RegistrySource::File(path.to_path_buf()))
            }
            Err(err) => {
                warn!(
                    "platform registry {} unusable, using builtin set: {err}",
                    path.display()
                );
                (
                    Self::builtin(),
                    RegistrySource::Fallback {
                        path: path.to_path_buf(),
                        reason: err.to_string(),
                    },
                )
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EndpointDescriptor>> {
        self.descriptors.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EndpointDescriptor>> {
        self.descriptors.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The registry as a document, in the shape it is loaded from.
    pub fn to_document(&self) -> BTreeMap<String, PlatformRule> {
        self.descriptors
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.rule.clone()))
            .collect()
    }

    fn from_rules(
        rules: BTreeMap<String, PlatformRule>,
        origin: &str,
    ) -> Result<Self, RegistryError> {
        if rules.is_empty() {
            return Err(RegistryError::Empty {
                origin: origin.to_string(),
            });
        }

        for (name, rule) in &rules {
            if name.trim().is_empty() {
                return Err(RegistryError::Parse {
                    origin: origin.to_string(),
                    reason: "platform name must not be empty".to_string(),
                });
            }
            if rule.method == DetectionMethod::Unrecognized {
                warn!(
                    platform = %name,
                    "unrecognized detection method; probes will be indeterminate"
                );
            }
        }

        Ok(Self::from_descriptors(
            rules
                .into_iter()
                .map(|(name, rule)| EndpointDescriptor::new(name, rule)),
        ))
    }
}
