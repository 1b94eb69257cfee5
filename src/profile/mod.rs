//! Method profiling for instrumentation planning.
//!
//! Alongside rule matching, a scan can profile each method body to find the methods worth
//! tracing: methods that synchronize, call out through client or repository objects, make many
//! calls or branch a lot. The flagged methods of many classes merge into an
//! [`InstrumentationPlan`], which renders the `Class[method,...];` include value used by
//! method-level tracing agents.

mod analyzer;
mod plan;

pub use analyzer::{profile_class, ClassProfile, MethodProfile, ProfileConfig};
pub use plan::InstrumentationPlan;
