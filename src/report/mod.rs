//! Findings, per-file errors and their deterministic aggregation.
//!
//! Each file task produces one [`FileOutcome`]. An [`Aggregator`] collects outcomes, possibly
//! split across threads and merged later, and [`Aggregator::finish`] turns them into a
//! [`ScanReport`] whose content depends only on the set of outcomes, never on the order they
//! were produced in.

mod aggregator;
mod finding;

pub use aggregator::{Aggregator, ScanReport};
pub use finding::{FileError, FileOutcome, FileProfile, Finding, MatchedReference};
