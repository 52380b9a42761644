//! Endpoint descriptors: how to build the request for one platform and how
//! to read its response.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Substitution slot replaced by the handle when a template is rendered.
pub const HANDLE_SLOT: &str = "{}";

/// A URL with exactly one [`HANDLE_SLOT`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        match raw.matches(HANDLE_SLOT).count() {
            1 => Ok(Self(raw)),
            0 => Err(ModelError::InvalidTemplate {
                template: raw,
                reason: format!("missing {HANDLE_SLOT} slot"),
            }),
            n => Err(ModelError::InvalidTemplate {
                template: raw,
                reason: format!("expected one {HANDLE_SLOT} slot, found {n}"),
            }),
        }
    }

    /// Substitutes `handle` verbatim. Handle validation is the caller's job.
    pub fn render(&self, handle: &str) -> String {
        self.0.replacen(HANDLE_SLOT, handle, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UrlTemplate {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<UrlTemplate> for String {
    fn from(value: UrlTemplate) -> Self {
        value.0
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a platform signals that a handle is unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// The HTTP status is compared against the rule's success codes.
    StatusCode,
    /// The response body is searched for the rule's failure phrases.
    ResponseText,
    /// Any method string this build does not know. Probes using it are
    /// reported as indeterminate instead of guessed.
    #[serde(other)]
    Unrecognized,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::StatusCode => "status_code",
            DetectionMethod::ResponseText => "response_text",
            DetectionMethod::Unrecognized => "unrecognized",
        }
    }
}

/// The registry document value for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRule {
    pub url: UrlTemplate,
    pub method: DetectionMethod,
    /// Statuses meaning "no such profile" when `method = status_code`.
    #[serde(
        default,
        rename = "code",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub success_codes: BTreeSet<u16>,
    /// Case-insensitive phrases meaning "no such profile" when
    /// `method = response_text`.
    #[serde(
        default,
        rename = "error_msg",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub failure_phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recon_enabled: bool,
    /// Secondary metadata endpoint. Listed for callers; never fetched by
    /// the engine.
    #[serde(
        default,
        rename = "api_endpoint",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata_endpoint: Option<UrlTemplate>,
}

impl PlatformRule {
    pub fn status_code(
        url: UrlTemplate,
        codes: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            url,
            method: DetectionMethod::StatusCode,
            success_codes: codes.into_iter().collect(),
            failure_phrases: Vec::new(),
            recon_enabled: false,
            metadata_endpoint: None,
        }
    }

    pub fn response_text<S: Into<String>>(
        url: UrlTemplate,
        phrases: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            url,
            method: DetectionMethod::ResponseText,
            success_codes: BTreeSet::new(),
            failure_phrases: phrases.into_iter().map(Into::into).collect(),
            recon_enabled: false,
            metadata_endpoint: None,
        }
    }

    pub fn with_recon(mut self, enabled: bool) -> Self {
        self.recon_enabled = enabled;
        self
    }
}

/// A named, immutable probe rule as held by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: String,
    pub rule: PlatformRule,
}

impl EndpointDescriptor {
    pub fn new(name: impl Into<String>, rule: PlatformRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }

    pub fn resolve_url(&self, handle: &str) -> String {
        self.rule.url.render(handle)
    }

    pub fn recon_enabled(&self) -> bool {
        self.rule.recon_enabled
    }
}
