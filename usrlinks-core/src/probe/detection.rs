use usrlinks_model::{DetectionMethod, PlatformRule, Verdict};

use crate::transport::FetchedResponse;

/// Why a response could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misconfiguration {
    NoSuccessCodes,
    NoFailurePhrases,
    UnknownMethod,
}

impl Misconfiguration {
    pub fn describe(self) -> &'static str {
        match self {
            Misconfiguration::NoSuccessCodes => {
                "status_code rule lists no status codes"
            }
            Misconfiguration::NoFailurePhrases => {
                "response_text rule lists no failure phrases"
            }
            Misconfiguration::UnknownMethod => "unrecognized detection method",
        }
    }
}

/// Checks a rule can classify anything at all. Probes skip the network for
/// rules that fail this.
pub fn validate_rule(rule: &PlatformRule) -> Result<(), Misconfiguration> {
    match rule.method {
        DetectionMethod::StatusCode if rule.success_codes.is_empty() => {
            Err(Misconfiguration::NoSuccessCodes)
        }
        DetectionMethod::ResponseText if rule.failure_phrases.is_empty() => {
            Err(Misconfiguration::NoFailurePhrases)
        }
        DetectionMethod::Unrecognized => Err(Misconfiguration::UnknownMethod),
        _ => Ok(()),
    }
}

/// Maps a response to a verdict under `rule`.
///
/// `Present` means the platform reported the profile missing, so the handle
/// is free. Phrase matching is case-insensitive on the lossily decoded
/// body.
pub fn classify(
    rule: &PlatformRule,
    response: &FetchedResponse,
) -> Result<Verdict, Misconfiguration> {
    validate_rule(rule)?;

    let available = match rule.method {
        DetectionMethod::StatusCode => {
            rule.success_codes.contains(&response.status)
        }
        DetectionMethod::ResponseText => {
            let body = response.text_lossy().to_lowercase();
            rule.failure_phrases
                .iter()
                .any(|phrase| body.contains(&phrase.to_lowercase()))
        }
        DetectionMethod::Unrecognized => {
            return Err(Misconfiguration::UnknownMethod);
        }
    };

    Ok(if available {
        Verdict::Present
    } else {
        Verdict::Absent
    })
}
