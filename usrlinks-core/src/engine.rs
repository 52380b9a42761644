//! The scan driver: ledger, transport, scheduling, aggregation and
//! reconciliation for one handle or for its generated variants.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use usrlinks_model::EndpointDescriptor;

use crate::aggregate::{FuzzyReport, ScanReport, VariantReport, sort_results};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::ledger::ScanLedger;
use crate::probe::ProbeContext;
use crate::recon::{ExtractorSet, ReconEngine};
use crate::reconcile::reconcile;
use crate::registry::EndpointRegistry;
use crate::scheduler::{Parallelism, ProbeJob, run_jobs, run_probes};
use crate::transport::{
    ReqwestTransportFactory, Transport, TransportFactory, TransportOptions,
};
use crate::variants::{DEFAULT_VARIANT_LIMIT, handle_variants_limited};

/// Inputs of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    pub handle: String,
    pub transport: TransportOptions,
    pub deep_scan: bool,
    /// Pool size. `None` uses the configured default; `Some(0)` fans out
    /// one task per endpoint.
    pub parallelism: Option<usize>,
}

impl ScanRequest {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Self::default()
        }
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_deep_scan(mut self, deep_scan: bool) -> Self {
        self.deep_scan = deep_scan;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Option<usize>) -> Self {
        self.parallelism = parallelism;
        self
    }
}

/// Inputs of one fuzzy scan: look-alikes of `handle` probed across a
/// platform selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuzzyScanRequest {
    pub handle: String,
    pub transport: TransportOptions,
    /// Platform names to probe. `None` probes the whole registry.
    pub platforms: Option<Vec<String>>,
    /// Variant cap. `None` uses [`DEFAULT_VARIANT_LIMIT`].
    pub limit: Option<usize>,
    pub parallelism: Option<usize>,
}

impl FuzzyScanRequest {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Self::default()
        }
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = Some(platforms.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Option<usize>) -> Self {
        self.parallelism = parallelism;
        self
    }
}

#[derive(Clone)]
pub struct ScanEngine {
    registry: Arc<EndpointRegistry>,
    factory: Arc<dyn TransportFactory>,
    ledger: Arc<ScanLedger>,
    recon: Arc<ReconEngine>,
    config: EngineConfig,
}

impl fmt::Debug for ScanEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanEngine")
            .field("platforms", &self.registry.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScanEngine {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        factory: Arc<dyn TransportFactory>,
        ledger: Arc<ScanLedger>,
        config: EngineConfig,
    ) -> Self {
        let recon = Arc::new(ReconEngine::new(
            ExtractorSet::default(),
            config.transport.avatar_timeout(),
        ));
        Self {
            registry,
            factory,
            ledger,
            recon,
            config,
        }
    }

    /// Engine over `registry` using the real HTTP transport and a fresh
    /// ledger sized by `config`.
    pub fn with_http(registry: EndpointRegistry, config: EngineConfig) -> Self {
        let factory =
            Arc::new(ReqwestTransportFactory::new(config.transport.clone()));
        let ledger = Arc::new(ScanLedger::with_ttl(config.ledger.ttl()));
        Self::new(Arc::new(registry), factory, ledger, config)
    }

    pub fn with_extractors(mut self, extractors: ExtractorSet) -> Self {
        self.recon = Arc::new(ReconEngine::new(
            extractors,
            self.config.transport.avatar_timeout(),
        ));
        self
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &Arc<ScanLedger> {
        &self.ledger
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one scan to completion.
    ///
    /// Every configured endpoint yields exactly one result. The only errors
    /// are transport setup failures, raised before any probe runs and
    /// before the scan is entered in the ledger.
    pub async fn run_scan(&self, request: ScanRequest) -> Result<ScanReport> {
        let started_at = Utc::now();
        let transport =
            self.build_transport(&request.handle, &request.transport)?;
        let scan_id = self.ledger.begin(&request.handle);
        let parallelism = self.parallelism(request.parallelism);

        info!(
            scan_id = %scan_id,
            handle = %request.handle,
            platforms = self.registry.len(),
            deep_scan = request.deep_scan,
            ?parallelism,
            "scan started"
        );

        let context =
            self.context(&request.handle, transport, request.deep_scan);
        let descriptors = self.registry.iter().cloned().collect();
        let mut results =
            run_probes(Arc::clone(&context), descriptors, parallelism).await;
        sort_results(&mut results);

        let results = reconcile(
            results,
            &self.registry,
            &context,
            parallelism,
            &self.config.reconcile,
        )
        .await;

        let report = ScanReport::new(
            scan_id.clone(),
            request.handle,
            started_at,
            results,
        );
        self.ledger.complete(&scan_id);

        let summary = report.summary();
        info!(
            scan_id = %scan_id,
            present = summary.present,
            absent = summary.absent,
            indeterminate = summary.indeterminate,
            "scan completed"
        );

        Ok(report)
    }

    /// Probes every look-alike of the handle against the selected
    /// platforms.
    ///
    /// All (variant, platform) jobs share one pool and one transport. Each
    /// variant is then reconciled like a regular scan and gets its own
    /// report. Unknown platform names fail the request before anything is
    /// probed.
    pub async fn run_fuzzy_scan(
        &self,
        request: FuzzyScanRequest,
    ) -> Result<FuzzyReport> {
        let started_at = Utc::now();
        let descriptors = self.select(request.platforms.as_deref())?;
        let transport =
            self.build_transport(&request.handle, &request.transport)?;
        let scan_id = self.ledger.begin(&request.handle);
        let parallelism = self.parallelism(request.parallelism);

        let variants = handle_variants_limited(
            &request.handle,
            request.limit.unwrap_or(DEFAULT_VARIANT_LIMIT),
        );
        info!(
            scan_id = %scan_id,
            handle = %request.handle,
            variants = variants.len(),
            platforms = descriptors.len(),
            ?parallelism,
            "fuzzy scan started"
        );

        let contexts: Vec<Arc<ProbeContext>> = variants
            .iter()
            .map(|variant| self.context(variant, Arc::clone(&transport), false))
            .collect();
        let jobs = contexts
            .iter()
            .flat_map(|context| {
                descriptors.iter().map(|descriptor| ProbeJob {
                    context: Arc::clone(context),
                    descriptor: Arc::clone(descriptor),
                })
            })
            .collect();

        let mut by_variant: HashMap<Arc<str>, Vec<_>> = HashMap::new();
        for outcome in run_jobs(jobs, parallelism).await {
            by_variant.entry(outcome.handle).or_default().push(outcome.result);
        }

        let mut reports = Vec::with_capacity(contexts.len());
        for context in &contexts {
            let mut results =
                by_variant.remove(&context.handle).unwrap_or_default();
            sort_results(&mut results);
            let results = reconcile(
                results,
                &self.registry,
                context,
                parallelism,
                &self.config.reconcile,
            )
            .await;
            reports.push(VariantReport::new(
                &request.handle,
                context.handle.to_string(),
                results,
            ));
        }

        let report =
            FuzzyReport::new(scan_id.clone(), request.handle, started_at, reports);
        self.ledger.complete(&scan_id);

        let summary = report.summary();
        info!(
            scan_id = %scan_id,
            variants = report.variants.len(),
            taken = summary.absent,
            indeterminate = summary.indeterminate,
            "fuzzy scan completed"
        );

        Ok(report)
    }

    fn build_transport(
        &self,
        handle: &str,
        options: &TransportOptions,
    ) -> Result<Arc<dyn Transport>> {
        self.factory.build(options).map_err(|err| {
            warn!(handle, "scan aborted before probing: {err}");
            EngineError::from(err)
        })
    }

    fn parallelism(&self, hint: Option<usize>) -> Parallelism {
        Parallelism::from_count(
            hint.unwrap_or(self.config.scheduler.default_parallelism),
        )
    }

    fn context(
        &self,
        handle: &str,
        transport: Arc<dyn Transport>,
        deep_scan: bool,
    ) -> Arc<ProbeContext> {
        Arc::new(ProbeContext {
            handle: Arc::from(handle),
            transport,
            retry: self.config.retry,
            deep_scan,
            recon: Arc::clone(&self.recon),
        })
    }

    /// Descriptors for `platforms`, in registry order, or the whole
    /// registry.
    fn select(
        &self,
        platforms: Option<&[String]>,
    ) -> Result<Vec<Arc<EndpointDescriptor>>> {
        let Some(platforms) = platforms else {
            return Ok(self.registry.iter().cloned().collect());
        };

        let unknown: Vec<String> = platforms
            .iter()
            .filter(|name| self.registry.get(name).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(EngineError::UnknownPlatforms(unknown));
        }

        Ok(self
            .registry
            .iter()
            .filter(|descriptor| platforms.contains(&descriptor.name))
            .cloned()
            .collect())
    }
}
