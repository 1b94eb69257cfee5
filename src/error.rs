use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($offset:expr, $msg:expr) => {
        crate::Error::MalformedClass {
            offset: $offset,
            message: $msg.to_string(),
        }
    };

    // Format string with arguments version
    ($offset:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::MalformedClass {
            offset: $offset,
            message: format!($fmt, $($arg)*),
        }
    };
}

macro_rules! out_of_bounds_error {
    ($offset:expr, $needed:expr, $available:expr) => {
        crate::Error::OutOfBounds {
            offset: $offset,
            needed: $needed,
            available: $available,
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two scopes. Per-file errors ([`Error::MalformedClass`],
/// [`Error::DescriptorSyntax`], [`Error::CorruptReference`], [`Error::MalformedCode`],
/// [`Error::Cancelled`]) are recorded against the offending input and never abort a multi-file
/// run. Run-level errors ([`Error::Catalog`], [`Error::ThreadPool`]) are surfaced once, before
/// any scanning starts.
///
/// # Examples
///
/// ```rust
/// use jarscope::{classfile::decode_class, Error};
///
/// match decode_class(&[0xCA, 0xFE, 0xBA]) {
///     Err(Error::MalformedClass { offset, message }) => {
///         assert_eq!(offset, 0);
///         println!("malformed class at {offset}: {message}");
///     }
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Binary reading and decoding
    /// A read would have crossed the end of the buffer.
    ///
    /// Produced by [`crate::Parser`]; the class decoder folds it into
    /// [`Error::MalformedClass`] before handing it to callers.
    #[error("Out of bound read at offset {offset}: needed {needed} bytes, {available} available")]
    OutOfBounds {
        /// Absolute offset at which the read was attempted
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes that were left
        available: usize,
    },

    /// The class file violates the class-file structure.
    ///
    /// Covers bad magic, unsupported versions, truncated or overlong sections, and constant
    /// pool indices that are out of range or carry the wrong tag for their context.
    ///
    /// # Fields
    ///
    /// * `offset` - Absolute byte offset at which the violation was detected
    /// * `message` - Expected-vs-found description of the violation
    #[error("Malformed class file at offset {offset}: {message}")]
    MalformedClass {
        /// Absolute byte offset inside the class file
        offset: usize,
        /// The message to be printed for the MalformedClass error
        message: String,
    },

    /// A field or method descriptor, or a generic signature, is not well formed.
    #[error(
        "Invalid descriptor {descriptor:?} at position {position}: expected {expected}, found {}",
        describe_found(.found)
    )]
    DescriptorSyntax {
        /// The complete descriptor text being parsed
        descriptor: String,
        /// Character position of the offending input
        position: usize,
        /// The offending character, `None` at end of input
        found: Option<char>,
        /// What the grammar required at this position
        expected: &'static str,
    },

    // Instruction scanning
    /// An instruction references a constant pool entry of the wrong kind.
    ///
    /// This should not happen after a successful decode, but a hostile file may carry a pool
    /// that is internally consistent while the bytecode points at the wrong entries.
    #[error(
        "Corrupt reference in {method} at offset {offset}: pool index {index} is {found}, expected {expected}"
    )]
    CorruptReference {
        /// Name and descriptor of the method being scanned
        method: String,
        /// Bytecode offset of the referencing instruction
        offset: u32,
        /// The constant pool index that failed to resolve
        index: u16,
        /// The entry kind the instruction requires
        expected: &'static str,
        /// The entry kind actually found
        found: &'static str,
    },

    /// The instruction stream of a method could not be walked.
    #[error("Malformed bytecode in {method} at offset {offset}: {message}")]
    MalformedCode {
        /// Name and descriptor of the method being scanned
        method: String,
        /// Bytecode offset of the offending instruction
        offset: u32,
        /// Description of the problem
        message: String,
    },

    /// Nesting went deeper than the parser permits.
    ///
    /// Guards recursive descent over generic signatures against stack exhaustion.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    // Run level
    /// The rule catalog contains an invalid pattern.
    ///
    /// Raised once, before any file is scanned. Every result would be meaningless otherwise.
    #[error("Invalid rule {rule_id:?}: {message}")]
    Catalog {
        /// Identifier of the offending rule
        rule_id: String,
        /// What is wrong with the pattern
        message: String,
    },

    /// The file task observed the run's cancellation signal.
    #[error("Scan was cancelled")]
    Cancelled,

    /// The worker pool could not be created.
    #[error("{0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Returns `true` for structural class-file errors, including raw bounds failures.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedClass { .. } | Error::OutOfBounds { .. } | Error::DescriptorSyntax { .. }
        )
    }

    /// Returns `true` if the error invalidates the whole run instead of a single file.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Catalog { .. } | Error::ThreadPool(_))
    }

    /// Converts reader and descriptor failures into [`Error::MalformedClass`].
    ///
    /// `offset` is used for errors that carry no byte offset of their own.
    pub(crate) fn into_malformed(self, offset: usize) -> Error {
        match self {
            Error::OutOfBounds {
                offset,
                needed,
                available,
            } => malformed_error!(
                offset,
                "truncated input: expected {} more bytes, found {}",
                needed,
                available
            ),
            Error::DescriptorSyntax { .. } => malformed_error!(offset, self.to_string()),
            Error::RecursionLimit(_) => malformed_error!(offset, self.to_string()),
            other => other,
        }
    }
}

fn describe_found(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{c:?}"),
        None => "end of input".to_string(),
    }
}
