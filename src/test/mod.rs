//! Shared fixtures for unit tests.

pub mod builder;

pub use builder::{Bytecode, ClassBuilder, Code};

use crate::disassembler::opcodes::{ALOAD_0, INVOKESPECIAL, RETURN};

/// A class with a default constructor and nothing else.
pub fn empty_class(name: &str) -> Vec<u8> {
    let mut builder = ClassBuilder::new(name);
    let init = builder.method_ref("java/lang/Object", "<init>", "()V");
    let code = Bytecode::new()
        .op(ALOAD_0)
        .op_u16(INVOKESPECIAL, init)
        .op(RETURN)
        .build();
    builder.method(0x0001, "<init>", "()V", code).build()
}
