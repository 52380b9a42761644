//! Folding probe results into the final report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use usrlinks_model::{ScanResult, Verdict};

use crate::error::OutputError;
use crate::variants::similarity;

/// Sorts by platform name so identical scans produce identical ordering
/// regardless of completion order.
pub fn sort_results(results: &mut [ScanResult]) {
    results.sort_by(|a, b| a.platform.cmp(&b.platform));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: String,
    pub handle: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub results: Vec<ScanResult>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub indeterminate: usize,
}

impl ScanSummary {
    pub fn of(results: &[ScanResult]) -> Self {
        results.iter().fold(
            ScanSummary {
                total: results.len(),
                ..ScanSummary::default()
            },
            |mut summary, result| {
                match result.verdict {
                    Verdict::Present => summary.present += 1,
                    Verdict::Absent => summary.absent += 1,
                    Verdict::Indeterminate => summary.indeterminate += 1,
                }
                summary
            },
        )
    }
}

/// Binary search over results already sorted by [`sort_results`].
fn find_result<'a>(
    results: &'a [ScanResult],
    platform: &str,
) -> Option<&'a ScanResult> {
    results
        .binary_search_by(|result| result.platform.as_str().cmp(platform))
        .ok()
        .map(|index| &results[index])
}

impl ScanReport {
    pub fn new(
        scan_id: String,
        handle: String,
        started_at: DateTime<Utc>,
        mut results: Vec<ScanResult>,
    ) -> Self {
        sort_results(&mut results);
        Self {
            scan_id,
            handle,
            started_at,
            completed_at: Utc::now(),
            results,
        }
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary::of(&self.results)
    }

    pub fn result(&self, platform: &str) -> Option<&ScanResult> {
        find_result(&self.results, platform)
    }

    pub fn to_json(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value, OutputError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Results for one look-alike of the scanned handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantReport {
    pub variant: String,
    /// Percentage similarity to the original handle.
    pub similarity: u8,
    pub results: Vec<ScanResult>,
}

impl VariantReport {
    pub fn new(
        handle: &str,
        variant: String,
        mut results: Vec<ScanResult>,
    ) -> Self {
        sort_results(&mut results);
        Self {
            similarity: similarity(handle, &variant),
            variant,
            results,
        }
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary::of(&self.results)
    }

    pub fn result(&self, platform: &str) -> Option<&ScanResult> {
        find_result(&self.results, platform)
    }

    /// Platforms where this variant is registered.
    pub fn taken(&self) -> impl Iterator<Item = &ScanResult> {
        self.results
            .iter()
            .filter(|result| result.verdict == Verdict::Absent)
    }
}

/// A fuzzy scan: one [`VariantReport`] per generated variant, ordered by
/// variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyReport {
    pub scan_id: String,
    pub handle: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub variants: Vec<VariantReport>,
}

impl FuzzyReport {
    pub fn new(
        scan_id: String,
        handle: String,
        started_at: DateTime<Utc>,
        mut variants: Vec<VariantReport>,
    ) -> Self {
        variants.sort_by(|a, b| a.variant.cmp(&b.variant));
        Self {
            scan_id,
            handle,
            started_at,
            completed_at: Utc::now(),
            variants,
        }
    }

    pub fn variant(&self, variant: &str) -> Option<&VariantReport> {
        self.variants
            .binary_search_by(|report| report.variant.as_str().cmp(variant))
            .ok()
            .map(|index| &self.variants[index])
    }

    /// Verdict counts across every variant and platform.
    pub fn summary(&self) -> ScanSummary {
        self.variants.iter().map(VariantReport::summary).fold(
            ScanSummary::default(),
            |total, part| ScanSummary {
                total: total.total + part.total,
                present: total.present + part.present,
                absent: total.absent + part.absent,
                indeterminate: total.indeterminate + part.indeterminate,
            },
        )
    }

    pub fn to_json(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value, OutputError> {
        Ok(serde_json::to_value(self)?)
    }
}
