//! Single-endpoint probing: request, retry, classify, and recon.

mod detection;

use std::sync::Arc;

use tracing::{debug, warn};
use usrlinks_model::{EndpointDescriptor, ScanResult, Verdict};

pub use detection::{Misconfiguration, classify, validate_rule};

use crate::config::RetryConfig;
use crate::recon::ReconEngine;
use crate::transport::{Transport, TransportError, random_user_agent};

/// Everything a probe needs that is shared across one scan.
#[derive(Clone)]
pub struct ProbeContext {
    pub handle: Arc<str>,
    pub transport: Arc<dyn Transport>,
    pub retry: RetryConfig,
    pub deep_scan: bool,
    pub recon: Arc<ReconEngine>,
}

impl std::fmt::Debug for ProbeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeContext")
            .field("handle", &self.handle)
            .field("retry", &self.retry)
            .field("deep_scan", &self.deep_scan)
            .finish_non_exhaustive()
    }
}

impl ProbeContext {
    /// Probes one endpoint to a terminal result. Never fails: transport
    /// errors that survive every attempt become an indeterminate result.
    ///
    /// Every failed attempt, the last included, is followed by its backoff
    /// step, so three failures cost `1 + 2 + 3` steps.
    pub async fn probe(&self, descriptor: &EndpointDescriptor) -> ScanResult {
        let platform = descriptor.name.as_str();
        let url = descriptor.resolve_url(&self.handle);

        if let Err(problem) = validate_rule(&descriptor.rule) {
            warn!(
                platform,
                url = %url,
                "skipping probe: {}",
                problem.describe()
            );
            return ScanResult::indeterminate(platform, url, problem.describe());
        }

        let attempts = self.retry.attempts();
        let mut last_error: Option<TransportError> = None;

        for attempt in 0..attempts {
            match self.transport.get(&url, random_user_agent()).await {
                Ok(response) => {
                    debug!(
                        platform,
                        url = %url,
                        attempt = attempt + 1,
                        status = response.status,
                        "probe response"
                    );
                    return match classify(&descriptor.rule, &response) {
                        Ok(Verdict::Present) => {
                            ScanResult::present(platform, url)
                        }
                        Ok(_) if self.wants_recon(descriptor) => {
                            let transport = self.transport.as_ref();
                            let recon = self
                                .recon
                                .inspect(transport, &url, &response.body)
                                .await;
                            ScanResult::absent(platform, url, Some(recon))
                        }
                        Ok(_) => ScanResult::absent(platform, url, None),
                        Err(problem) => ScanResult::indeterminate(
                            platform,
                            url,
                            problem.describe(),
                        ),
                    };
                }
                Err(err) => {
                    let delay = self.retry.backoff_after(attempt);
                    if attempt + 1 < attempts {
                        warn!(
                            platform,
                            url = %url,
                            attempt = attempt + 1,
                            "probe failed, retrying in {:?}: {err}",
                            delay
                        );
                    } else {
                        warn!(
                            platform,
                            url = %url,
                            attempt = attempt + 1,
                            "probe failed on final attempt, backing off {:?}: {err}",
                            delay
                        );
                    }
                    tokio::time::sleep(delay).await;
                    last_error = Some(err);
                }
            }
        }

        let reason = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        ScanResult::indeterminate(platform, url, reason)
    }

    fn wants_recon(&self, descriptor: &EndpointDescriptor) -> bool {
        self.deep_scan && descriptor.recon_enabled()
    }
}
