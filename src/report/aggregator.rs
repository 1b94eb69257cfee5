use std::collections::BTreeMap;

use crate::{
    profile::{InstrumentationPlan, ProfileConfig},
    report::finding::{FileError, FileOutcome, FileProfile, Finding},
};

/// Accumulates per-file outcomes.
///
/// Aggregators can be filled independently on different threads and merged in any order;
/// [`Aggregator::finish`] sorts everything, so the resulting [`ScanReport`] does not depend on
/// the order outcomes arrived in. Duplicate class names from different files are kept apart by
/// their file identity and never deduplicated.
#[derive(Debug, Default)]
pub struct Aggregator {
    findings: BTreeMap<String, Vec<Finding>>,
    errors: Vec<FileError>,
    profiles: Vec<FileProfile>,
    files_scanned: usize,
    cancelled: usize,
}

impl Aggregator {
    /// An empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one file.
    pub fn add(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Scanned {
                file,
                findings,
                profile,
            } => {
                self.files_scanned += 1;
                for finding in findings {
                    self.findings
                        .entry(finding.rule_id.clone())
                        .or_default()
                        .push(finding);
                }
                if let Some(profile) = profile {
                    self.profiles.push(FileProfile { file, profile });
                }
            }
            FileOutcome::Failed(failure) => {
                log::warn!("{failure}");
                self.errors.push(failure);
            }
            FileOutcome::Cancelled { file } => {
                log::trace!("{file}: skipped after cancellation");
                self.cancelled += 1;
            }
        }
    }

    /// Combine two aggregators.
    #[must_use]
    pub fn merge(mut self, other: Aggregator) -> Aggregator {
        for (rule, mut findings) in other.findings {
            self.findings.entry(rule).or_default().append(&mut findings);
        }
        self.errors.extend(other.errors);
        self.profiles.extend(other.profiles);
        self.files_scanned += other.files_scanned;
        self.cancelled += other.cancelled;
        self
    }

    /// Sort everything into the final report.
    #[must_use]
    pub fn finish(mut self) -> ScanReport {
        for findings in self.findings.values_mut() {
            findings.sort_unstable();
        }
        self.errors
            .sort_by_cached_key(|failure| (failure.file.clone(), failure.error.to_string()));
        self.profiles.sort_by(|a, b| {
            (&a.file, &a.profile.class_name).cmp(&(&b.file, &b.profile.class_name))
        });

        ScanReport {
            findings: self.findings,
            errors: self.errors,
            files_scanned: self.files_scanned,
            cancelled: self.cancelled,
            profiles: self.profiles,
        }
    }
}

impl Extend<FileOutcome> for Aggregator {
    fn extend<I: IntoIterator<Item = FileOutcome>>(&mut self, iter: I) {
        for outcome in iter {
            self.add(outcome);
        }
    }
}

impl FromIterator<FileOutcome> for Aggregator {
    fn from_iter<I: IntoIterator<Item = FileOutcome>>(iter: I) -> Self {
        let mut aggregator = Aggregator::new();
        aggregator.extend(iter);
        aggregator
    }
}

/// The deterministic result of a scan run.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Findings per rule id, each list sorted by location
    pub findings: BTreeMap<String, Vec<Finding>>,
    /// Files that failed, sorted by identity
    pub errors: Vec<FileError>,
    /// Number of files decoded and scanned successfully
    pub files_scanned: usize,
    /// Number of files skipped or aborted because the run was cancelled
    pub cancelled: usize,
    /// Method profiles per file, when profiling was enabled
    pub profiles: Vec<FileProfile>,
}

impl ScanReport {
    /// Total number of findings over all rules.
    #[must_use]
    pub fn total_findings(&self) -> usize {
        self.findings.values().map(Vec::len).sum()
    }

    /// Rule ids with at least one finding, sorted.
    pub fn matched_rules(&self) -> impl Iterator<Item = &str> {
        self.findings
            .iter()
            .filter(|(_, findings)| !findings.is_empty())
            .map(|(rule, _)| rule.as_str())
    }

    /// Findings of one rule, empty if it never matched.
    #[must_use]
    pub fn findings_for(&self, rule_id: &str) -> &[Finding] {
        self.findings.get(rule_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether every file was scanned: no errors and no cancellations.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.cancelled == 0
    }

    /// Merge the profiled methods of every file into one plan.
    #[must_use]
    pub fn instrumentation_plan(&self, config: &ProfileConfig) -> InstrumentationPlan {
        InstrumentationPlan::from_profiles(self.profiles.iter().map(|file| &file.profile), config)
    }
}
