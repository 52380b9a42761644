use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid url template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
