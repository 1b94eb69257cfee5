use rayon::prelude::*;

use crate::{
    engine::{
        config::{CancellationToken, ScanConfig},
        task::{scan_class, ClassInput},
    },
    report::{Aggregator, ScanReport},
    rules::RuleCatalog,
    Result,
};

/// Runs a rule catalog over many class files in parallel.
///
/// Every input is scanned by an independent task on a dedicated worker pool. Each worker folds
/// its outcomes into its own [`Aggregator`]; the aggregators are merged pairwise and sorted at
/// the end, so the report is identical for any thread count and any completion order.
///
/// # Examples
///
/// ```rust,no_run
/// use jarscope::{
///     engine::{ClassInput, ScanConfig, ScanEngine},
///     rules::{RuleCatalog, SignaturePattern},
/// };
///
/// let catalog = RuleCatalog::new([SignaturePattern::new("okhttp", "okhttp3/*")])?;
/// let inputs = vec![ClassInput::new("app.jar!/Foo.class", std::fs::read("Foo.class")?)];
///
/// let report = ScanEngine::new(&catalog)
///     .with_config(ScanConfig::default().with_concurrency(4))
///     .run(&inputs)?;
/// for finding in report.findings_for("okhttp") {
///     println!("{finding}");
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ScanEngine<'c> {
    catalog: &'c RuleCatalog,
    config: ScanConfig,
    cancel: CancellationToken,
}

impl<'c> ScanEngine<'c> {
    /// An engine with the default configuration and a fresh cancellation token.
    #[must_use]
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        ScanEngine {
            catalog,
            config: ScanConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Observe an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The configuration runs use.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// A handle that cancels runs of this engine.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan a batch of class files.
    ///
    /// # Errors
    /// Returns [`crate::Error::ThreadPool`] if the worker pool cannot be created. Per-file
    /// failures never fail the run; they are listed in [`ScanReport::errors`].
    pub fn run(&self, inputs: &[ClassInput]) -> Result<ScanReport> {
        let pool = self.thread_pool()?;
        let aggregator = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| self.scan(input))
                .fold(Aggregator::new, fold_outcome)
                .reduce(Aggregator::new, Aggregator::merge)
        });

        Ok(self.finish(aggregator))
    }

    /// Scan class files pulled from an iterator, such as a lazy archive walk.
    ///
    /// # Errors
    /// Returns [`crate::Error::ThreadPool`] if the worker pool cannot be created.
    pub fn run_iter<I>(&self, inputs: I) -> Result<ScanReport>
    where
        I: Iterator<Item = ClassInput> + Send,
    {
        let pool = self.thread_pool()?;
        let aggregator = pool.install(|| {
            inputs
                .par_bridge()
                .map(|input| self.scan(&input))
                .fold(Aggregator::new, fold_outcome)
                .reduce(Aggregator::new, Aggregator::merge)
        });

        Ok(self.finish(aggregator))
    }

    fn scan(&self, input: &ClassInput) -> crate::report::FileOutcome {
        scan_class(
            &input.identity,
            &input.bytes,
            self.catalog,
            &self.config,
            &self.cancel,
        )
    }

    fn thread_pool(&self) -> Result<rayon::ThreadPool> {
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_concurrency)
            .thread_name(|index| format!("jarscope-scan-{index}"))
            .build()?)
    }

    fn finish(&self, aggregator: Aggregator) -> ScanReport {
        let report = aggregator.finish();
        log::info!(
            "scanned {} files with {} rules: {} findings, {} errors, {} cancelled",
            report.files_scanned,
            self.catalog.len(),
            report.total_findings(),
            report.errors.len(),
            report.cancelled
        );
        report
    }
}

fn fold_outcome(mut aggregator: Aggregator, outcome: crate::report::FileOutcome) -> Aggregator {
    aggregator.add(outcome);
    aggregator
}
