//! Byte-level class file builder for tests.
//!
//! Depends on nothing but `std` so the integration tests can include it with `#[path]`.

#![allow(dead_code)]

use std::collections::HashMap;

/// Assembles a method body byte by byte.
#[derive(Debug, Default, Clone)]
pub struct Bytecode {
    bytes: Vec<u8>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opcode without operands.
    pub fn op(mut self, opcode: u8) -> Self {
        self.bytes.push(opcode);
        self
    }

    /// Opcode with a one byte operand.
    pub fn op_u8(mut self, opcode: u8, operand: u8) -> Self {
        self.bytes.extend([opcode, operand]);
        self
    }

    /// Opcode with a two byte operand (pool index or branch offset).
    pub fn op_u16(mut self, opcode: u8, operand: u16) -> Self {
        self.bytes.push(opcode);
        self.bytes.extend(operand.to_be_bytes());
        self
    }

    pub fn invokeinterface(mut self, index: u16, count: u8) -> Self {
        self.bytes.push(0xB9);
        self.bytes.extend(index.to_be_bytes());
        self.bytes.extend([count, 0]);
        self
    }

    pub fn invokedynamic(mut self, index: u16) -> Self {
        self.bytes.push(0xBA);
        self.bytes.extend(index.to_be_bytes());
        self.bytes.extend([0, 0]);
        self
    }

    pub fn multianewarray(mut self, index: u16, dimensions: u8) -> Self {
        self.bytes.push(0xC5);
        self.bytes.extend(index.to_be_bytes());
        self.bytes.push(dimensions);
        self
    }

    /// Raw bytes, for deliberately broken bodies.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// A method body plus its exception table.
#[derive(Debug, Clone)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub bytes: Vec<u8>,
    /// `(start_pc, end_pc, handler_pc, catch_type)`
    pub handlers: Vec<(u16, u16, u16, u16)>,
}

impl Code {
    pub fn new(bytes: Vec<u8>) -> Self {
        Code {
            max_stack: 4,
            max_locals: 4,
            bytes,
            handlers: Vec::new(),
        }
    }

    pub fn handler(mut self, start: u16, end: u16, handler: u16, catch_type: u16) -> Self {
        self.handlers.push((start, end, handler, catch_type));
        self
    }
}

struct Member {
    access: u16,
    name: u16,
    descriptor: u16,
    attributes: Vec<(u16, Vec<u8>)>,
}

/// Builds a class file with a deduplicated constant pool.
pub struct ClassBuilder {
    major: u16,
    minor: u16,
    pool: Vec<u8>,
    next_index: u16,
    interned: HashMap<Vec<u8>, u16>,
    access: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    attributes: Vec<(u16, Vec<u8>)>,
    bootstrap: Vec<(u16, Vec<u16>)>,
    trailing: Vec<u8>,
}

impl ClassBuilder {
    /// A public class `name` extending `java/lang/Object`, major version 52.
    pub fn new(name: &str) -> Self {
        let mut builder = ClassBuilder {
            major: 52,
            minor: 0,
            pool: Vec::new(),
            next_index: 1,
            interned: HashMap::new(),
            access: 0x0021,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            bootstrap: Vec::new(),
            trailing: Vec::new(),
        };
        builder.this_class = builder.class(name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, name: Option<&str>) -> Self {
        self.super_class = match name {
            Some(name) => self.class(name),
            None => 0,
        };
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    // ── constant pool ──

    fn intern(&mut self, bytes: Vec<u8>, slots: u16) -> u16 {
        if let Some(index) = self.interned.get(&bytes) {
            return *index;
        }
        let index = self.next_index;
        self.pool.extend_from_slice(&bytes);
        self.next_index += slots;
        self.interned.insert(bytes, index);
        index
    }

    /// Append an entry without deduplication, for malformed pools.
    pub fn raw_entry(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.extend_from_slice(bytes);
        self.next_index += slots;
        index
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        let encoded = modified_utf8(text);
        let mut bytes = vec![1];
        bytes.extend((encoded.len() as u16).to_be_bytes());
        bytes.extend(encoded);
        self.intern(bytes, 1)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.intern(tagged(7, &[name_index]), 1)
    }

    pub fn string(&mut self, text: &str) -> u16 {
        let utf8 = self.utf8(text);
        self.intern(tagged(8, &[utf8]), 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut bytes = vec![3];
        bytes.extend(value.to_be_bytes());
        self.intern(bytes, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut bytes = vec![5];
        bytes.extend(value.to_be_bytes());
        self.intern(bytes, 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let mut bytes = vec![6];
        bytes.extend(value.to_bits().to_be_bytes());
        self.intern(bytes, 2)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.intern(tagged(12, &[name, descriptor]), 1)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let nat = self.name_and_type(name, descriptor);
        self.intern(tagged(tag, &[class, nat]), 1)
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(9, owner, name, descriptor)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(10, owner, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(11, owner, name, descriptor)
    }

    pub fn method_handle(&mut self, reference_kind: u8, reference_index: u16) -> u16 {
        let mut bytes = vec![15, reference_kind];
        bytes.extend(reference_index.to_be_bytes());
        self.intern(bytes, 1)
    }

    pub fn method_type(&mut self, descriptor: &str) -> u16 {
        let descriptor = self.utf8(descriptor);
        self.intern(tagged(16, &[descriptor]), 1)
    }

    /// Adds a bootstrap method and an `InvokeDynamic` entry that uses it.
    pub fn invoke_dynamic(
        &mut self,
        bootstrap_handle: u16,
        arguments: &[u16],
        name: &str,
        descriptor: &str,
    ) -> u16 {
        let bootstrap_index = self.bootstrap.len() as u16;
        self.bootstrap.push((bootstrap_handle, arguments.to_vec()));
        let nat = self.name_and_type(name, descriptor);
        self.intern(tagged(18, &[bootstrap_index, nat]), 1)
    }

    // ── members ──

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.fields.push(Member {
            access,
            name,
            descriptor,
            attributes: Vec::new(),
        });
        self
    }

    /// A method without a body (abstract or native).
    pub fn abstract_method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.methods.push(Member {
            access,
            name,
            descriptor,
            attributes: Vec::new(),
        });
        self
    }

    pub fn method(self, access: u16, name: &str, descriptor: &str, code: Vec<u8>) -> Self {
        self.method_with(access, name, descriptor, Code::new(code))
    }

    pub fn method_with(mut self, access: u16, name: &str, descriptor: &str, code: Code) -> Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let code_name = self.utf8("Code");

        let mut body = Vec::new();
        body.extend(code.max_stack.to_be_bytes());
        body.extend(code.max_locals.to_be_bytes());
        body.extend((code.bytes.len() as u32).to_be_bytes());
        body.extend(&code.bytes);
        body.extend((code.handlers.len() as u16).to_be_bytes());
        for (start, end, handler, catch_type) in code.handlers {
            for value in [start, end, handler, catch_type] {
                body.extend(value.to_be_bytes());
            }
        }
        body.extend(0u16.to_be_bytes());

        self.methods.push(Member {
            access,
            name,
            descriptor,
            attributes: vec![(code_name, body)],
        });
        self
    }

    /// Attach a `Signature` attribute to the most recently added method.
    pub fn method_signature(mut self, signature: &str) -> Self {
        let name = self.utf8("Signature");
        let value = self.utf8(signature);
        if let Some(method) = self.methods.last_mut() {
            method.attributes.push((name, value.to_be_bytes().to_vec()));
        }
        self
    }

    // ── class attributes ──

    pub fn source_file(mut self, file: &str) -> Self {
        let name = self.utf8("SourceFile");
        let value = self.utf8(file);
        self.attributes.push((name, value.to_be_bytes().to_vec()));
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        let name = self.utf8("Signature");
        let value = self.utf8(signature);
        self.attributes.push((name, value.to_be_bytes().to_vec()));
        self
    }

    pub fn attribute(mut self, name: &str, data: &[u8]) -> Self {
        let name = self.utf8(name);
        self.attributes.push((name, data.to_vec()));
        self
    }

    /// Bytes appended after the class structure.
    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        if !self.bootstrap.is_empty() {
            let name = self.utf8("BootstrapMethods");
            let mut body = Vec::new();
            body.extend((self.bootstrap.len() as u16).to_be_bytes());
            for (handle, arguments) in &self.bootstrap {
                body.extend(handle.to_be_bytes());
                body.extend((arguments.len() as u16).to_be_bytes());
                for argument in arguments {
                    body.extend(argument.to_be_bytes());
                }
            }
            self.attributes.push((name, body));
        }

        let mut out = Vec::new();
        out.extend(0xCAFE_BABEu32.to_be_bytes());
        out.extend(self.minor.to_be_bytes());
        out.extend(self.major.to_be_bytes());
        out.extend(self.next_index.to_be_bytes());
        out.extend(&self.pool);
        out.extend(self.access.to_be_bytes());
        out.extend(self.this_class.to_be_bytes());
        out.extend(self.super_class.to_be_bytes());
        out.extend((self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend(interface.to_be_bytes());
        }
        write_members(&mut out, &self.fields);
        write_members(&mut out, &self.methods);
        write_attributes(&mut out, &self.attributes);
        out.extend(&self.trailing);
        out
    }
}

fn tagged(tag: u8, indices: &[u16]) -> Vec<u8> {
    let mut bytes = vec![tag];
    for index in indices {
        bytes.extend(index.to_be_bytes());
    }
    bytes
}

fn write_members(out: &mut Vec<u8>, members: &[Member]) {
    out.extend((members.len() as u16).to_be_bytes());
    for member in members {
        out.extend(member.access.to_be_bytes());
        out.extend(member.name.to_be_bytes());
        out.extend(member.descriptor.to_be_bytes());
        write_attributes(out, &member.attributes);
    }
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    out.extend((attributes.len() as u16).to_be_bytes());
    for (name, data) in attributes {
        out.extend(name.to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());
        out.extend(data);
    }
}

/// Encode text the way class files store it.
pub fn modified_utf8(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) as u8 & 0x1F));
                out.push(0x80 | (unit as u8 & 0x3F));
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) as u8 & 0x0F));
                out.push(0x80 | ((unit >> 6) as u8 & 0x3F));
                out.push(0x80 | (unit as u8 & 0x3F));
            }
        }
    }
    out
}
