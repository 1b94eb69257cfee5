use std::{cmp::Ordering, fmt};

use crate::{
    profile::ClassProfile,
    scanner::{ReferenceKind, SymbolicReference},
    Error,
};

/// Owned copy of the reference a finding matched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchedReference {
    /// How the instruction used the reference
    pub kind: ReferenceKind,
    /// Owner internal name
    pub owner: String,
    /// Member name, empty for type references
    pub name: String,
    /// Member descriptor, empty for type references
    pub descriptor: String,
}

impl From<&SymbolicReference<'_>> for MatchedReference {
    fn from(reference: &SymbolicReference<'_>) -> Self {
        MatchedReference {
            kind: reference.kind,
            owner: reference.owner.to_string(),
            name: reference.name.to_string(),
            descriptor: reference.descriptor.to_string(),
        }
    }
}

impl fmt::Display for MatchedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{} {}", self.kind, self.owner)
        } else {
            write!(f, "{} {}.{}{}", self.kind, self.owner, self.name, self.descriptor)
        }
    }
}

/// One match of a rule at a code location.
///
/// Findings order by file, class, method name and bytecode offset, then by method descriptor
/// and matched reference so that the order is total.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Finding {
    /// Rule that matched
    pub rule_id: String,
    /// Identity of the scanned input (archive path plus entry)
    pub file: String,
    /// Internal name of the class containing the code
    pub class_name: String,
    /// Name of the method containing the code
    pub method: String,
    /// Descriptor of the method containing the code
    pub method_descriptor: String,
    /// Bytecode offset of the instruction within the method body
    pub offset: u32,
    /// The reference that matched
    pub reference: MatchedReference,
}

impl Finding {
    fn sort_key(&self) -> (&str, &str, &str, u32, &str, &MatchedReference, &str) {
        (
            self.file.as_str(),
            self.class_name.as_str(),
            self.method.as_str(),
            self.offset,
            self.method_descriptor.as_str(),
            &self.reference,
            self.rule_id.as_str(),
        )
    }
}

impl PartialOrd for Finding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Finding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}.{}{} @{}: {}",
            self.rule_id,
            self.file,
            self.class_name,
            self.method,
            self.method_descriptor,
            self.offset,
            self.reference
        )
    }
}

/// A file that could not be decoded or scanned.
#[derive(Debug)]
pub struct FileError {
    /// Identity of the failed input
    pub file: String,
    /// Why it failed
    pub error: Error,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.error)
    }
}

/// Method profiles of one scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProfile {
    /// Identity of the scanned input
    pub file: String,
    /// Profiles of the class's methods
    pub profile: ClassProfile,
}

/// Everything one file task hands to the aggregator.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was decoded and scanned
    Scanned {
        /// Identity of the input
        file: String,
        /// Every finding in the file, in any order
        findings: Vec<Finding>,
        /// Method profiles, when profiling was requested
        profile: Option<ClassProfile>,
    },
    /// The file failed to decode or scan; it contributes no findings
    Failed(FileError),
    /// The task stopped on the cancellation signal; it contributes no findings
    Cancelled {
        /// Identity of the input
        file: String,
    },
}

impl FileOutcome {
    /// Identity of the input this outcome belongs to.
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            FileOutcome::Scanned { file, .. } | FileOutcome::Cancelled { file } => file,
            FileOutcome::Failed(failure) => &failure.file,
        }
    }
}
