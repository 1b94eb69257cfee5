//! Signature patterns and the rule catalog.
//!
//! A [`SignaturePattern`] describes a family of symbolic references by owner, member name,
//! descriptor and (optionally) reference kind, and belongs to a rule. The [`RuleCatalog`]
//! validates a set of patterns once, indexes them by owner and answers "which rules does this
//! reference match" for the scan engine.
//!
//! Matching is purely syntactic. Supertypes are never resolved: a pattern written against an
//! interface only sees calls made through that interface type, which is what
//! [`SignaturePattern::interface_call`] expresses.

mod catalog;
mod pattern;

pub use catalog::RuleCatalog;
pub use pattern::{DescriptorMatcher, MemberMatcher, OwnerMatcher, SignaturePattern};
