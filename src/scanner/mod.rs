//! Symbolic reference extraction from method bodies.
//!
//! The scanner walks a method's instruction stream with the [`crate::disassembler`] and turns
//! every instruction whose operand names a field, method or type into a
//! [`SymbolicReference`]. Only the opcodes listed under [`ReferenceKind`] produce references;
//! every other instruction is decoded for offset tracking and otherwise ignored.
//!
//! References borrow their strings from the class's constant pool, so a scan never allocates
//! per reference. A pool index that does not resolve to the entry kind the opcode requires
//! ends the scan with [`crate::Error::CorruptReference`]; undecodable bytecode ends it with
//! [`crate::Error::MalformedCode`].

mod reference;
mod walker;

pub use reference::{ReferenceKind, ReferenceKinds, SymbolicReference};
pub(crate) use walker::malformed_code;
pub use walker::{element_class, scan_class_references, scan_method, MethodScan};
