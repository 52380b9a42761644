//! Concurrent handle probing across many platforms.
//!
//! A scan resolves one handle against every endpoint in an
//! [`EndpointRegistry`], retries transient failures, optionally mines
//! taken profiles for public contact signals and returns a sorted
//! [`ScanReport`]. A fuzzy scan does the same for generated look-alikes of
//! the handle over a platform selection.

#![allow(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod probe;
pub mod queries;
pub mod recon;
pub mod reconcile;
pub mod registry;
pub mod scheduler;
pub mod transport;
pub mod variants;

pub use aggregate::{FuzzyReport, ScanReport, ScanSummary, VariantReport};
pub use config::{
    EngineConfig, LedgerConfig, ReconcileConfig, RetryConfig, SchedulerConfig,
    TransportSettings,
};
pub use engine::{FuzzyScanRequest, ScanEngine, ScanRequest};
pub use error::{EngineError, OutputError, RegistryError, Result};
pub use ledger::ScanLedger;
pub use queries::search_queries;
pub use registry::{EndpointRegistry, RegistrySource};
pub use scheduler::Parallelism;
pub use transport::{
    FetchedResponse, ReqwestTransportFactory, Transport, TransportError,
    TransportFactory, TransportOptions,
};
pub use variants::{handle_variants, similarity};

pub use usrlinks_model as model;
