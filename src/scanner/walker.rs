use std::collections::VecDeque;

use crate::{
    classfile::{
        ConstantPoolEntry, DecodedClass, MemberRef, MemberRefKind, MethodInfo, PoolError,
    },
    disassembler::{opcodes, Instruction, InstructionIter},
    scanner::reference::{ReferenceKind, SymbolicReference},
    Error, Result,
};

/// Lazy walk over one method body, yielding every symbolic reference with its bytecode offset.
///
/// Created by [`scan_method`]. The walk is single pass: once an error has been returned the
/// iterator is exhausted.
pub struct MethodScan<'c> {
    class: &'c DecodedClass,
    method: &'c MethodInfo,
    /// Offset of the next instruction to decode
    cursor: u32,
    instructions: Option<InstructionIter<'c>>,
    pending: VecDeque<(u32, SymbolicReference<'c>)>,
    failed: bool,
}

/// Scan a method of `class` for symbolic references.
///
/// Methods without a body produce an empty scan.
///
/// # Examples
///
/// ```rust,no_run
/// use jarscope::{classfile::decode_class, scanner::scan_method};
///
/// let bytes = std::fs::read("Example.class")?;
/// let class = decode_class(&bytes)?;
/// for method in &class.methods {
///     for item in scan_method(&class, method) {
///         let (offset, reference) = item?;
///         println!("{}@{offset}: {reference}", method.name);
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn scan_method<'c>(class: &'c DecodedClass, method: &'c MethodInfo) -> MethodScan<'c> {
    MethodScan {
        class,
        method,
        cursor: 0,
        instructions: method.code.as_ref().map(|code| code.instructions()),
        pending: VecDeque::new(),
        failed: false,
    }
}

/// Collect every reference of every method in `class`, in method then offset order.
///
/// # Errors
/// Returns the first [`Error::CorruptReference`] or [`Error::MalformedCode`] encountered.
pub fn scan_class_references(
    class: &DecodedClass,
) -> Result<Vec<(&MethodInfo, u32, SymbolicReference<'_>)>> {
    let mut references = Vec::new();
    for method in &class.methods {
        for item in scan_method(class, method) {
            let (offset, reference) = item?;
            references.push((method, offset, reference));
        }
    }
    Ok(references)
}

impl<'c> MethodScan<'c> {
    /// The method being scanned.
    #[must_use]
    pub fn method(&self) -> &'c MethodInfo {
        self.method
    }

    fn emit(&mut self, offset: u32, reference: SymbolicReference<'c>) {
        self.pending.push_back((offset, reference));
    }

    /// Queue the references made by one instruction.
    fn resolve(&mut self, instruction: &Instruction) -> Result<()> {
        let offset = instruction.offset;
        let Some(index) = instruction.pool_index() else {
            return Ok(());
        };

        match instruction.opcode {
            opcodes::GETFIELD => self.field(offset, index, ReferenceKind::GetField),
            opcodes::PUTFIELD => self.field(offset, index, ReferenceKind::PutField),
            opcodes::GETSTATIC => self.field(offset, index, ReferenceKind::GetStatic),
            opcodes::PUTSTATIC => self.field(offset, index, ReferenceKind::PutStatic),

            opcodes::INVOKEVIRTUAL => {
                self.method_call(offset, index, ReferenceKind::InvokeVirtual)
            }
            opcodes::INVOKESPECIAL => {
                self.method_call(offset, index, ReferenceKind::InvokeSpecial)
            }
            opcodes::INVOKESTATIC => self.method_call(offset, index, ReferenceKind::InvokeStatic),
            opcodes::INVOKEINTERFACE => {
                self.method_call(offset, index, ReferenceKind::InvokeInterface)
            }
            opcodes::INVOKEDYNAMIC => self.invoke_dynamic(offset, index),

            opcodes::NEW => self.type_reference(offset, index, ReferenceKind::NewInstance),
            opcodes::CHECKCAST => self.type_reference(offset, index, ReferenceKind::CheckCast),
            opcodes::INSTANCEOF => self.type_reference(offset, index, ReferenceKind::InstanceOf),
            opcodes::ANEWARRAY | opcodes::MULTIANEWARRAY => {
                self.type_reference(offset, index, ReferenceKind::TypeUse)
            }

            opcodes::LDC | opcodes::LDC_W => self.loaded_constant(offset, index),
            // long, double and dynamic constants name no types or members
            _ => Ok(()),
        }
    }

    fn field(&mut self, offset: u32, index: u16, kind: ReferenceKind) -> Result<()> {
        let member = self.member_ref(offset, index, "Fieldref", |kind| {
            kind == MemberRefKind::Field
        })?;
        self.emit_member(offset, kind, &member);
        Ok(())
    }

    fn method_call(&mut self, offset: u32, index: u16, kind: ReferenceKind) -> Result<()> {
        let member = match kind {
            ReferenceKind::InvokeVirtual => {
                self.member_ref(offset, index, "Methodref", |kind| kind == MemberRefKind::Method)?
            }
            ReferenceKind::InvokeInterface => {
                self.member_ref(offset, index, "InterfaceMethodref", |kind| {
                    kind == MemberRefKind::InterfaceMethod
                })?
            }
            _ => self.member_ref(offset, index, "Methodref or InterfaceMethodref", |kind| {
                kind != MemberRefKind::Field
            })?,
        };
        self.emit_member(offset, kind, &member);
        Ok(())
    }

    fn emit_member(&mut self, offset: u32, kind: ReferenceKind, member: &MemberRef<'c>) {
        // calls on array types (`[I.clone()`) are reported against the element class, if any
        if let Some(owner) = element_class(member.owner) {
            self.emit(
                offset,
                SymbolicReference::member(kind, owner, member.name, member.descriptor),
            );
        }
    }

    fn type_reference(&mut self, offset: u32, index: u16, kind: ReferenceKind) -> Result<()> {
        let class = self.class;
        let name = class
            .constant_pool
            .class_name(index)
            .map_err(|err| self.corrupt(offset, &err))?;
        if let Some(owner) = element_class(name) {
            self.emit(offset, SymbolicReference::type_only(kind, owner));
        }
        Ok(())
    }

    fn loaded_constant(&mut self, offset: u32, index: u16) -> Result<()> {
        let class = self.class;
        let entry = class
            .constant_pool
            .entry(index, "a loadable constant")
            .map_err(|err| self.corrupt(offset, &err))?;
        match entry {
            ConstantPoolEntry::Class { .. } => {
                self.type_reference(offset, index, ReferenceKind::TypeUse)
            }
            ConstantPoolEntry::MethodHandle { .. } => self.method_handle(offset, index),
            _ => Ok(()),
        }
    }

    fn method_handle(&mut self, offset: u32, index: u16) -> Result<()> {
        let class = self.class;
        let handle = class
            .constant_pool
            .method_handle(index, class.version.major)
            .map_err(|err| self.corrupt(offset, &err))?;
        self.emit_member(offset, ReferenceKind::MethodHandle, &handle.member);
        Ok(())
    }

    /// An `invokedynamic` call site yields the call itself, attributed to the bootstrap
    /// method's class, followed by every method handle among the bootstrap arguments
    /// (the implementation method of a lambda or method reference).
    fn invoke_dynamic(&mut self, offset: u32, index: u16) -> Result<()> {
        let class = self.class;
        let pool = &class.constant_pool;

        let entry = pool
            .entry(index, "InvokeDynamic")
            .map_err(|err| self.corrupt(offset, &err))?;
        let ConstantPoolEntry::InvokeDynamic {
            bootstrap_method_attr_index,
            name_and_type_index,
        } = entry
        else {
            return Err(self.corrupt_kind(offset, index, "InvokeDynamic", entry.kind_name()));
        };

        let (name, descriptor) = pool
            .name_and_type(*name_and_type_index)
            .map_err(|err| self.corrupt(offset, &err))?;
        let Some(bootstrap) = class
            .bootstrap_methods
            .get(usize::from(*bootstrap_method_attr_index))
        else {
            return Err(self.corrupt_kind(
                offset,
                index,
                "InvokeDynamic with a declared bootstrap method",
                "a dangling bootstrap method index",
            ));
        };

        let handle = pool
            .method_handle(bootstrap.method_handle, class.version.major)
            .map_err(|err| self.corrupt(offset, &err))?;
        if let Some(owner) = element_class(handle.member.owner) {
            self.emit(
                offset,
                SymbolicReference::member(ReferenceKind::InvokeDynamic, owner, name, descriptor),
            );
        }

        for argument in &bootstrap.arguments {
            if let Ok(ConstantPoolEntry::MethodHandle { .. }) = pool.entry(*argument, "") {
                self.method_handle(offset, *argument)?;
            }
        }
        Ok(())
    }

    fn member_ref(
        &self,
        offset: u32,
        index: u16,
        expected: &'static str,
        accept: impl Fn(MemberRefKind) -> bool,
    ) -> Result<MemberRef<'c>> {
        let class = self.class;
        let member = class
            .constant_pool
            .member_ref(index)
            .map_err(|err| self.corrupt(offset, &err))?;
        if !accept(member.kind) {
            let found = match member.kind {
                MemberRefKind::Field => "Fieldref",
                MemberRefKind::Method => "Methodref",
                MemberRefKind::InterfaceMethod => "InterfaceMethodref",
            };
            return Err(self.corrupt_kind(offset, index, expected, found));
        }
        Ok(member)
    }

    fn corrupt(&self, offset: u32, err: &PoolError) -> Error {
        self.corrupt_kind(offset, err.index, err.expected, err.found)
    }

    fn corrupt_kind(
        &self,
        offset: u32,
        index: u16,
        expected: &'static str,
        found: &'static str,
    ) -> Error {
        Error::CorruptReference {
            method: self.method.key(),
            offset,
            index,
            expected,
            found,
        }
    }
}

/// Re-scope an instruction decoding failure to the method and instruction that caused it.
pub(crate) fn malformed_code(method: &MethodInfo, offset: u32, err: Error) -> Error {
    let message = match err {
        Error::MalformedClass { message, .. } => message,
        Error::OutOfBounds {
            needed, available, ..
        } => format!("instruction truncated: expected {needed} more bytes, found {available}"),
        other => return other,
    };
    Error::MalformedCode {
        method: method.key(),
        offset,
        message,
    }
}

impl<'c> Iterator for MethodScan<'c> {
    type Item = Result<(u32, SymbolicReference<'c>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            if self.failed {
                return None;
            }

            let instruction = match self.instructions.as_mut()?.next()? {
                Ok(instruction) => instruction,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(malformed_code(self.method, self.cursor, err)));
                }
            };

            self.cursor = instruction.next_offset();
            if let Err(err) = self.resolve(&instruction) {
                self.failed = true;
                self.pending.clear();
                return Some(Err(err));
            }
        }
    }
}

/// Reduce a `Class` entry name to the class it denotes.
///
/// Plain names pass through, object arrays yield their element class. Primitive arrays and
/// arrays of an empty class name yield `None`.
#[must_use]
pub fn element_class(name: &str) -> Option<&str> {
    if !name.starts_with('[') {
        return Some(name);
    }
    name.trim_start_matches('[')
        .strip_prefix('L')
        .and_then(|element| element.strip_suffix(';'))
        .filter(|element| !element.is_empty())
}
