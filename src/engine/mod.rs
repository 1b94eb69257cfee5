//! Parallel scan orchestration.
//!
//! A scan run maps every [`ClassInput`] to a [`crate::report::FileOutcome`] with
//! [`scan_class`] and folds the outcomes into a [`crate::report::ScanReport`]. The
//! [`ScanEngine`] distributes the map step over a bounded rayon worker pool; the report is the
//! same whatever the pool size or completion order.
//!
//! # Cancellation
//!
//! A [`CancellationToken`] stops a run cooperatively. Files not yet started are reported as
//! cancelled without being decoded, and files in flight stop at the next method boundary. A
//! cancelled file contributes no findings, and partial findings are never reported.

mod config;
mod runner;
mod task;

pub use config::{CancellationToken, ScanConfig};
pub use runner::ScanEngine;
pub use task::{scan_class, ClassInput};
