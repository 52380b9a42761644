//! Post-scan passes over indeterminate results.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use usrlinks_model::ScanResult;

use crate::config::ReconcileConfig;
use crate::probe::ProbeContext;
use crate::registry::EndpointRegistry;
use crate::scheduler::{Parallelism, run_probes};

/// Re-probes indeterminate entries for up to `config.max_rounds` rounds,
/// replacing each resolved entry by platform name.
///
/// A fully determinate input is returned untouched without any network
/// access. Entries still indeterminate after the last round stay as they
/// are.
pub async fn reconcile(
    mut results: Vec<ScanResult>,
    registry: &EndpointRegistry,
    context: &Arc<ProbeContext>,
    parallelism: Parallelism,
    config: &ReconcileConfig,
) -> Vec<ScanResult> {
    if !results.iter().any(ScanResult::is_indeterminate) {
        return results;
    }

    let positions: HashMap<String, usize> = results
        .iter()
        .enumerate()
        .map(|(index, result)| (result.platform.clone(), index))
        .collect();

    for round in 1..=config.max_rounds {
        let pending: Vec<_> = results
            .iter()
            .filter(|result| result.is_indeterminate())
            .filter_map(|result| registry.get(&result.platform).cloned())
            .collect();
        if pending.is_empty() {
            break;
        }

        debug!(
            round,
            pending = pending.len(),
            "reconciling indeterminate results"
        );

        let mut resolved = 0usize;
        for retried in run_probes(Arc::clone(context), pending, parallelism).await
        {
            if retried.is_indeterminate() {
                continue;
            }
            if let Some(&index) = positions.get(&retried.platform) {
                results[index] = retried;
                resolved += 1;
            }
        }

        info!(round, resolved, "reconciliation round finished");
    }

    results
}
