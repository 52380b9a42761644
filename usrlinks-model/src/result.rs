use serde::{Deserialize, Serialize};

use crate::recon::ReconPayload;
use crate::verdict::Verdict;

/// One platform's terminal outcome within a scan.
///
/// Build values through the constructors: `error` is only populated for
/// indeterminate verdicts and `recon` only for absent ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub platform: String,
    pub url: String,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recon: Option<ReconPayload>,
}

impl ScanResult {
    pub fn present(platform: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
            verdict: Verdict::Present,
            error: None,
            recon: None,
        }
    }

    pub fn absent(
        platform: impl Into<String>,
        url: impl Into<String>,
        recon: Option<ReconPayload>,
    ) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
            verdict: Verdict::Absent,
            error: None,
            recon,
        }
    }

    pub fn indeterminate(
        platform: impl Into<String>,
        url: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
            verdict: Verdict::Indeterminate,
            error: Some(error.into()),
            recon: None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        !self.verdict.is_determinate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recon::{AvatarRef, ContactInfo};

    #[test]
    fn full_result_round_trips_through_json() {
        let mut contact = ContactInfo::default();
        contact.emails.insert("dev@example.org".into());
        contact.phones.insert("(555) 010-4477".into());
        contact.location = Some("Lisbon".into());
        contact.verified = true;

        let result = ScanResult::absent(
            "GitHub",
            "https://github.com/dev",
            Some(ReconPayload {
                contact_info: contact,
                avatar: Some(AvatarRef::fetched(
                    "https://avatars.example.org/dev.png",
                    "ab12".into(),
                )),
            }),
        );

        let encoded = serde_json::to_string(&result).unwrap();
        let decoded: ScanResult = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn indeterminate_serializes_verdict_and_error() {
        let result = ScanResult::indeterminate(
            "Keybase",
            "https://keybase.io/dev",
            "request timed out",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["verdict"], "indeterminate");
        assert_eq!(json["error"], "request timed out");
        assert!(json.get("recon").is_none());
    }
}
