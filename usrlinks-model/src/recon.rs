use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Public profile signals extracted from a page where the handle is taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconPayload {
    pub contact_info: ContactInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<AvatarRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub emails: BTreeSet<String>,
    #[serde(default)]
    pub phones: BTreeSet<String>,
    #[serde(default)]
    pub urls: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// The avatar image reference found on a profile page.
///
/// `fingerprint` is only set when `downloaded` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub downloaded: bool,
}

impl AvatarRef {
    pub fn fetched(url: impl Into<String>, fingerprint: String) -> Self {
        Self {
            url: url.into(),
            fingerprint: Some(fingerprint),
            downloaded: true,
        }
    }

    pub fn not_fetched(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fingerprint: None,
            downloaded: false,
        }
    }
}
