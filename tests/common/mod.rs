//! Fixtures shared by the integration tests.

#![allow(dead_code)]

#[path = "../../src/test/builder.rs"]
mod builder;

pub use builder::{Bytecode, ClassBuilder, Code};

use jarscope::disassembler::opcodes::*;

/// A service class touching okhttp, reflection and a repository.
///
/// - `fetch()V`: `invokevirtual okhttp3/Call.execute` at offset 1
/// - `lookup(Ljava/lang/Object;)V`: `checkcast`, `getstatic`, `invokeinterface`
/// - `<init>()V`: `invokespecial java/lang/Object.<init>`
pub fn service_class(name: &str) -> Vec<u8> {
    let mut builder = ClassBuilder::new(name);
    let init = builder.method_ref("java/lang/Object", "<init>", "()V");
    let execute = builder.method_ref("okhttp3/Call", "execute", "()Lokhttp3/Response;");
    let method_class = builder.class("java/lang/reflect/Method");
    let out = builder.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
    let find = builder.interface_method_ref(
        "com/acme/OrderRepository",
        "find",
        "(Ljava/lang/String;)Lcom/acme/Order;",
    );

    let constructor = Bytecode::new()
        .op(ALOAD_0)
        .op_u16(INVOKESPECIAL, init)
        .op(RETURN)
        .build();
    let fetch = Bytecode::new()
        .op(ALOAD_0)
        .op_u16(INVOKEVIRTUAL, execute)
        .op(POP)
        .op(RETURN)
        .build();
    let lookup = Bytecode::new()
        .op(ALOAD_1)
        .op_u16(CHECKCAST, method_class)
        .op(POP)
        .op_u16(GETSTATIC, out)
        .op(POP)
        .op(ALOAD_0)
        .op(ACONST_NULL)
        .invokeinterface(find, 2)
        .op(POP)
        .op(RETURN)
        .build();

    builder
        .method(0x0001, "<init>", "()V", constructor)
        .method(0x0001, "fetch", "()V", fetch)
        .method(0x0001, "lookup", "(Ljava/lang/Object;)V", lookup)
        .source_file("Service.java")
        .build()
}
