use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{classfile::DecoderConfig, profile::ProfileConfig};

/// Configuration of a scan run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanConfig {
    /// Worker threads; `0` uses one per available core
    pub max_concurrency: usize,
    /// How each class file is decoded
    pub decoder: DecoderConfig,
    /// Profile methods for instrumentation planning when set
    pub profile: Option<ProfileConfig>,
}

impl ScanConfig {
    /// Scan on a single worker thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self::default().with_concurrency(1)
    }

    /// Limit the number of worker threads; `0` means one per available core.
    #[must_use]
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Use a different decoder configuration.
    #[must_use]
    pub fn with_decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }

    /// Enable method profiling.
    #[must_use]
    pub fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Run-level cancellation signal, shared by cloning.
///
/// Once cancelled, tasks that have not started are skipped and tasks in flight stop at the
/// next method boundary. Neither contributes findings.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`CancellationToken::cancel`] was called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
