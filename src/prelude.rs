//! # jarscope Prelude
//!
//! The types most scans need, for glob import with `use jarscope::prelude::*;`.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jarscope operations
pub use crate::Error;

/// The result type used throughout jarscope
pub use crate::Result;

/// Low-level binary cursor
pub use crate::Parser;

// ================================================================================================
// Class Files
// ================================================================================================

/// Decoding entry points and the decoded model
pub use crate::classfile::{
    decode_class, decode_class_with, ClassAccessFlags, ConstantPool, DecodedClass, DecoderConfig,
    FieldInfo, MethodAccessFlags, MethodInfo,
};

/// Descriptor and signature parsing
pub use crate::descriptor::{parse_descriptor, Descriptor};

// ================================================================================================
// Scanning and Matching
// ================================================================================================

/// Symbolic references and their extraction
pub use crate::scanner::{scan_method, ReferenceKind, ReferenceKinds, SymbolicReference};

/// Rule definitions
pub use crate::rules::{RuleCatalog, SignaturePattern};

// ================================================================================================
// Scan Runs and Reports
// ================================================================================================

/// Parallel scan orchestration
pub use crate::engine::{CancellationToken, ClassInput, ScanConfig, ScanEngine};

/// Report types
pub use crate::report::{FileError, Finding, ScanReport};

/// Instrumentation planning
pub use crate::profile::{InstrumentationPlan, ProfileConfig};
