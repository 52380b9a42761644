//! The HTTP seam between the engine and the network.
//!
//! Probes and avatar fetches only ever see [`Transport`]. A fresh transport
//! is built per scan by a [`TransportFactory`] so that proxy and relay
//! routing are fixed for the whole scan and shared by every worker.

mod client;
mod user_agent;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{ReqwestTransport, ReqwestTransportFactory};
pub use user_agent::{USER_AGENTS, random_user_agent};

/// Status and fully-read body of one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid proxy {address}: {reason}")]
    InvalidProxy { address: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Routing requested for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Explicit proxy. Takes precedence over `use_relay`.
    pub proxy: Option<String>,
    /// Route through the configured anonymizing relay.
    pub use_relay: bool,
}

impl TransportOptions {
    pub fn direct() -> Self {
        Self::default()
    }

    pub fn with_proxy(proxy: impl Into<String>) -> Self {
        Self {
            proxy: Some(proxy.into()),
            use_relay: false,
        }
    }

    pub fn via_relay() -> Self {
        Self {
            proxy: None,
            use_relay: true,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one GET with `user_agent`. A non-2xx status is a response,
    /// not an error.
    async fn get(
        &self,
        url: &str,
        user_agent: &str,
    ) -> Result<FetchedResponse, TransportError>;
}

pub trait TransportFactory: Send + Sync {
    /// Builds the transport for one scan. Fails before any probe runs when
    /// the routing options cannot be honored.
    fn build(
        &self,
        options: &TransportOptions,
    ) -> Result<Arc<dyn Transport>, TransportError>;
}
