//! Attributes the decoder understands, plus a raw form for everything else.

use crate::disassembler::InstructionIter;

/// Attribute names the decoder interprets.
pub mod names {
    /// Method body
    pub const CODE: &str = "Code";
    /// Generic signature of a class, field or method
    pub const SIGNATURE: &str = "Signature";
    /// Source file name of a class
    pub const SOURCE_FILE: &str = "SourceFile";
    /// Bootstrap method table for `invokedynamic` and dynamic constants
    pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
}

/// An attribute kept as its name and undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// Attribute name from the constant pool
    pub name: String,
    /// File offset of the attribute body
    pub offset: usize,
    /// Attribute body
    pub data: Vec<u8>,
}

/// One row of a Code attribute's exception table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Start of the protected range (inclusive)
    pub start_pc: u16,
    /// End of the protected range (exclusive)
    pub end_pc: u16,
    /// Entry point of the handler
    pub handler_pc: u16,
    /// Caught class, `None` for a catch-all (`finally`)
    pub catch_type: Option<String>,
}

/// The body of a non-abstract, non-native method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Number of local variable slots
    pub max_locals: u16,
    /// The raw instruction stream
    pub code: Vec<u8>,
    /// File offset of the first instruction byte
    pub code_offset: usize,
    /// Exception handler table in declaration order
    pub exception_table: Vec<ExceptionHandler>,
    /// Nested attributes (line numbers, stack map frames, ...)
    pub attributes: Vec<RawAttribute>,
}

impl CodeAttribute {
    /// Iterate over the decoded instructions of this body.
    #[must_use]
    pub fn instructions(&self) -> InstructionIter<'_> {
        InstructionIter::new(&self.code, self.code_offset)
    }
}

/// One entry of the `BootstrapMethods` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    /// Pool index of the bootstrap `MethodHandle`
    pub method_handle: u16,
    /// Pool indices of the static arguments
    pub arguments: Vec<u16>,
}
