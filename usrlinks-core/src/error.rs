use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

/// Failures that stop a scan before any probe runs, or that happen after
/// all probes are done. Probe-level failures never show up here; they are
/// indeterminate results.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("output failed: {0}")]
    Output(#[from] OutputError),

    #[error("unknown platforms: {}", .0.join(", "))]
    UnknownPlatforms(Vec<String>),
}

/// The "produce output" step, kept apart from probe outcomes.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry {origin}: {reason}")]
    Parse { origin: String, reason: String },

    #[error("registry {origin} defines no platforms")]
    Empty { origin: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
