//! In-memory scan status ledger.
//!
//! One ledger is owned per service instance and handed to the engine; it
//! is the only mutable state shared between concurrent scans.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;
use usrlinks_model::ScanStatus;

static SCAN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy)]
struct LedgerEntry {
    status: ScanStatus,
    updated_at: Instant,
}

#[derive(Debug, Default)]
pub struct ScanLedger {
    entries: RwLock<HashMap<String, LedgerEntry>>,
    ttl: Option<Duration>,
}

impl ScanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries untouched for longer than `ttl` are dropped on the next
    /// write.
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Allocates a fresh scan id for `handle` and records it as scanning.
    pub fn begin(&self, handle: &str) -> String {
        let scan_id = next_scan_id(handle);
        self.set(&scan_id, ScanStatus::Scanning);
        scan_id
    }

    pub fn complete(&self, scan_id: &str) {
        self.set(scan_id, ScanStatus::Completed);
    }

    /// Current status, or [`ScanStatus::Unknown`] for ids never recorded
    /// or already evicted.
    pub fn status(&self, scan_id: &str) -> ScanStatus {
        let entries = self.entries.read();
        match entries.get(scan_id) {
            Some(entry) if !self.is_expired(entry, Instant::now()) => {
                entry.status
            }
            _ => ScanStatus::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn set(&self, scan_id: &str, status: ScanStatus) {
        let now = Instant::now();
        let mut entries = self.entries.write();
        if self.ttl.is_some() {
            let before = entries.len();
            entries.retain(|_, entry| !self.is_expired(entry, now));
            let evicted = before - entries.len();
            if evicted > 0 {
                debug!(evicted, "evicted expired ledger entries");
            }
        }
        entries.insert(
            scan_id.to_string(),
            LedgerEntry {
                status,
                updated_at: now,
            },
        );
    }

    fn is_expired(&self, entry: &LedgerEntry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.duration_since(entry.updated_at) > ttl)
    }
}

/// `<handle>_<unix-nanos>_<sequence>`; the sequence keeps ids unique within
/// the same nanosecond.
fn next_scan_id(handle: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let sequence = SCAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{handle}_{nanos}_{sequence}")
}
