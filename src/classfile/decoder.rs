use crate::{
    classfile::{
        attributes::{names, BootstrapMethod, CodeAttribute, ExceptionHandler, RawAttribute},
        config::DecoderConfig,
        constpool::{ConstantPool, ConstantPoolEntry, PoolError},
        flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
        members::{FieldInfo, MethodInfo},
        ClassVersion, DecodedClass,
    },
    descriptor::{parse_field_descriptor, parse_method_descriptor},
    disassembler::InstructionIter,
    file::parser::Parser,
    Error, Result,
};

/// Magic number at the start of every class file
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// Largest code array a method may carry
const MAX_CODE_LENGTH: u32 = 65_535;

/// Single-pass decoder for one class file.
///
/// The decoder owns nothing but a cursor over the input; all decoded data is copied into the
/// returned [`DecodedClass`].
pub struct ClassDecoder<'a> {
    parser: Parser<'a>,
    config: &'a DecoderConfig,
}

impl<'a> ClassDecoder<'a> {
    /// Create a decoder over `data`.
    #[must_use]
    pub fn new(data: &'a [u8], config: &'a DecoderConfig) -> Self {
        ClassDecoder {
            parser: Parser::new(data),
            config,
        }
    }

    /// Decode the complete class file.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedClass`] for every structural violation, including
    /// truncated input. Raw reader errors never escape.
    pub fn decode(mut self) -> Result<DecodedClass> {
        let result = self.decode_class();
        result.map_err(|err| err.into_malformed(self.parser.offset()))
    }

    fn decode_class(&mut self) -> Result<DecodedClass> {
        let magic = self.parser.read_be::<u32>()?;
        if magic != CLASS_MAGIC {
            return Err(malformed_error!(
                0,
                "expected magic 0xCAFEBABE, found 0x{:08X}",
                magic
            ));
        }

        let minor = self.parser.read_be::<u16>()?;
        let major = self.parser.read_be::<u16>()?;
        self.config
            .check_version(major, minor)
            .map_err(|message| malformed_error!(4, message))?;

        let constant_pool = ConstantPool::parse(&mut self.parser)?;
        constant_pool.validate(major, self.config.validate_descriptors)?;

        let access = ClassAccessFlags::from_bits_retain(self.parser.read_be::<u16>()?);

        let this_offset = self.parser.offset();
        let this_index = self.parser.read_be::<u16>()?;
        let this_class = constant_pool
            .class_name(this_index)
            .map_err(|err| pool_error(this_offset, "this_class", &err))?
            .to_string();

        let super_offset = self.parser.offset();
        let super_index = self.parser.read_be::<u16>()?;
        let super_class = if super_index == 0 {
            if this_class != "java/lang/Object" && !access.contains(ClassAccessFlags::MODULE) {
                return Err(malformed_error!(
                    super_offset,
                    "expected a superclass for {}, found none",
                    this_class
                ));
            }
            None
        } else {
            Some(
                constant_pool
                    .class_name(super_index)
                    .map_err(|err| pool_error(super_offset, "super_class", &err))?
                    .to_string(),
            )
        };

        let interfaces_count = self.parser.read_be::<u16>()?;
        let mut interfaces =
            Vec::with_capacity(self.parser.capacity_for(usize::from(interfaces_count), 2));
        for _ in 0..interfaces_count {
            let offset = self.parser.offset();
            let index = self.parser.read_be::<u16>()?;
            let name = constant_pool
                .class_name(index)
                .map_err(|err| pool_error(offset, "interface", &err))?;
            interfaces.push(name.to_string());
        }

        let fields_count = self.parser.read_be::<u16>()?;
        let mut fields = Vec::with_capacity(self.parser.capacity_for(usize::from(fields_count), 8));
        for _ in 0..fields_count {
            fields.push(self.field(&constant_pool)?);
        }

        let methods_count = self.parser.read_be::<u16>()?;
        let mut methods =
            Vec::with_capacity(self.parser.capacity_for(usize::from(methods_count), 8));
        for _ in 0..methods_count {
            methods.push(self.method(&constant_pool)?);
        }

        let mut source_file = None;
        let mut signature = None;
        let mut bootstrap_methods = None;
        let mut attributes = Vec::new();

        let attributes_count = self.parser.read_be::<u16>()?;
        for _ in 0..attributes_count {
            let (name, mut body) = self.attribute_header(&constant_pool)?;
            match name {
                names::SOURCE_FILE => {
                    let text = utf8_attribute(&mut body, &constant_pool, name)?;
                    set_once(&mut source_file, text, name, body.offset())?;
                }
                names::SIGNATURE => {
                    let text = utf8_attribute(&mut body, &constant_pool, name)?;
                    set_once(&mut signature, text, name, body.offset())?;
                }
                names::BOOTSTRAP_METHODS => {
                    let table = bootstrap_methods_attribute(&mut body, &constant_pool, major)?;
                    set_once(&mut bootstrap_methods, table, name, body.offset())?;
                }
                _ => attributes.push(raw_attribute(name, body)),
            }
        }

        if self.parser.has_more_data() {
            return Err(malformed_error!(
                self.parser.offset(),
                "expected end of class file, found {} trailing bytes",
                self.parser.remaining()
            ));
        }

        let bootstrap_methods = bootstrap_methods.unwrap_or_default();
        check_bootstrap_indices(&constant_pool, &bootstrap_methods)?;

        Ok(DecodedClass {
            version: ClassVersion { major, minor },
            constant_pool,
            access,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            source_file,
            signature,
            bootstrap_methods,
            attributes,
        })
    }

    /// Read `access_flags`, `name_index` and `descriptor_index` of a field or method.
    fn member_header<'p>(
        &mut self,
        pool: &'p ConstantPool,
    ) -> Result<(u16, &'p str, &'p str, usize)> {
        let access = self.parser.read_be::<u16>()?;
        let name_offset = self.parser.offset();
        let name = pool
            .utf8(self.parser.read_be::<u16>()?)
            .map_err(|err| pool_error(name_offset, "member name", &err))?;
        let descriptor_offset = self.parser.offset();
        let descriptor = pool
            .utf8(self.parser.read_be::<u16>()?)
            .map_err(|err| pool_error(descriptor_offset, "member descriptor", &err))?;
        Ok((access, name, descriptor, descriptor_offset))
    }

    fn field(&mut self, pool: &ConstantPool) -> Result<FieldInfo> {
        let (access, name, descriptor, descriptor_offset) = self.member_header(pool)?;
        let parsed = parse_field_descriptor(descriptor)
            .map_err(|err| err.into_malformed(descriptor_offset))?;

        let mut signature = None;
        let mut attributes = Vec::new();
        let attributes_count = self.parser.read_be::<u16>()?;
        for _ in 0..attributes_count {
            let (attr_name, mut body) = self.attribute_header(pool)?;
            if attr_name == names::SIGNATURE {
                let text = utf8_attribute(&mut body, pool, attr_name)?;
                set_once(&mut signature, text, attr_name, body.offset())?;
            } else {
                attributes.push(raw_attribute(attr_name, body));
            }
        }

        Ok(FieldInfo {
            access: FieldAccessFlags::from_bits_retain(access),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            parsed,
            signature,
            attributes,
        })
    }

    fn method(&mut self, pool: &ConstantPool) -> Result<MethodInfo> {
        let (access, name, descriptor, descriptor_offset) = self.member_header(pool)?;
        let access = MethodAccessFlags::from_bits_retain(access);
        let parsed = parse_method_descriptor(descriptor)
            .map_err(|err| err.into_malformed(descriptor_offset))?;

        let mut code = None;
        let mut signature = None;
        let mut attributes = Vec::new();
        let attributes_count = self.parser.read_be::<u16>()?;
        for _ in 0..attributes_count {
            let (attr_name, mut body) = self.attribute_header(pool)?;
            match attr_name {
                names::CODE => {
                    if access.intersects(MethodAccessFlags::ABSTRACT | MethodAccessFlags::NATIVE) {
                        return Err(malformed_error!(
                            body.offset(),
                            "abstract or native method {}{} has a Code attribute",
                            name,
                            descriptor
                        ));
                    }
                    let body_code = self.code_attribute(&mut body, pool)?;
                    set_once(&mut code, body_code, attr_name, body.offset())?;
                }
                names::SIGNATURE => {
                    let text = utf8_attribute(&mut body, pool, attr_name)?;
                    set_once(&mut signature, text, attr_name, body.offset())?;
                }
                _ => attributes.push(raw_attribute(attr_name, body)),
            }
        }

        Ok(MethodInfo {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            parsed,
            code,
            signature,
            attributes,
        })
    }

    /// Read an attribute's name and length, returning a parser over exactly its body.
    fn attribute_header<'p>(&mut self, pool: &'p ConstantPool) -> Result<(&'p str, Parser<'a>)> {
        let name_offset = self.parser.offset();
        let name = pool
            .utf8(self.parser.read_be::<u16>()?)
            .map_err(|err| pool_error(name_offset, "attribute name", &err))?;
        let length = self.parser.read_be::<u32>()?;
        let Ok(length) = usize::try_from(length) else {
            return Err(malformed_error!(name_offset, "attribute length overflow"));
        };
        Ok((name, self.parser.sub_parser(length)?))
    }

    fn code_attribute(&self, body: &mut Parser, pool: &ConstantPool) -> Result<CodeAttribute> {
        let max_stack = body.read_be::<u16>()?;
        let max_locals = body.read_be::<u16>()?;

        let length_offset = body.offset();
        let code_length = body.read_be::<u32>()?;
        if code_length == 0 || code_length > MAX_CODE_LENGTH {
            return Err(malformed_error!(
                length_offset,
                "expected code_length in 1..=65535, found {}",
                code_length
            ));
        }

        let code_offset = body.offset();
        let code = body.read_bytes(code_length as usize)?;
        if self.config.validate_code {
            for instruction in InstructionIter::new(code, code_offset) {
                instruction?;
            }
        }

        let table_length = body.read_be::<u16>()?;
        let mut exception_table =
            Vec::with_capacity(body.capacity_for(usize::from(table_length), 8));
        for _ in 0..table_length {
            let entry_offset = body.offset();
            let start_pc = body.read_be::<u16>()?;
            let end_pc = body.read_be::<u16>()?;
            let handler_pc = body.read_be::<u16>()?;
            let catch_index = body.read_be::<u16>()?;

            if start_pc >= end_pc
                || u32::from(end_pc) > code_length
                || u32::from(handler_pc) >= code_length
            {
                return Err(malformed_error!(
                    entry_offset,
                    "exception handler [{}, {}) -> {} outside code of length {}",
                    start_pc,
                    end_pc,
                    handler_pc,
                    code_length
                ));
            }

            let catch_type = if catch_index == 0 {
                None
            } else {
                Some(
                    pool.class_name(catch_index)
                        .map_err(|err| pool_error(entry_offset, "catch_type", &err))?
                        .to_string(),
                )
            };

            exception_table.push(ExceptionHandler {
                start_pc,
                end_pc,
                handler_pc,
                catch_type,
            });
        }

        let attributes_count = body.read_be::<u16>()?;
        let mut attributes =
            Vec::with_capacity(body.capacity_for(usize::from(attributes_count), 6));
        for _ in 0..attributes_count {
            let name_offset = body.offset();
            let name = pool
                .utf8(body.read_be::<u16>()?)
                .map_err(|err| pool_error(name_offset, "attribute name", &err))?;
            let length = body.read_be::<u32>()? as usize;
            let nested = body.sub_parser(length)?;
            attributes.push(raw_attribute(name, nested));
        }

        finish_attribute(body, names::CODE)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code: code.to_vec(),
            code_offset,
            exception_table,
            attributes,
        })
    }
}

fn pool_error(offset: usize, context: &str, err: &PoolError) -> Error {
    malformed_error!(offset, "{}: {}", context, err)
}

fn raw_attribute(name: &str, body: Parser) -> RawAttribute {
    RawAttribute {
        name: name.to_string(),
        offset: body.offset(),
        data: body.data().to_vec(),
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str, offset: usize) -> Result<()> {
    if slot.is_some() {
        return Err(malformed_error!(offset, "duplicate {} attribute", name));
    }
    *slot = Some(value);
    Ok(())
}

fn finish_attribute(body: &Parser, name: &str) -> Result<()> {
    if body.has_more_data() {
        return Err(malformed_error!(
            body.offset(),
            "expected end of {} attribute, found {} unread bytes",
            name,
            body.remaining()
        ));
    }
    Ok(())
}

/// Attributes whose body is a single Utf8 index (`Signature`, `SourceFile`).
fn utf8_attribute(body: &mut Parser, pool: &ConstantPool, name: &str) -> Result<String> {
    let offset = body.offset();
    let text = pool
        .utf8(body.read_be::<u16>()?)
        .map_err(|err| pool_error(offset, name, &err))?
        .to_string();
    finish_attribute(body, name)?;
    Ok(text)
}

fn bootstrap_methods_attribute(
    body: &mut Parser,
    pool: &ConstantPool,
    major: u16,
) -> Result<Vec<BootstrapMethod>> {
    let count = body.read_be::<u16>()?;
    let mut methods = Vec::with_capacity(body.capacity_for(usize::from(count), 4));
    for _ in 0..count {
        let offset = body.offset();
        let method_handle = body.read_be::<u16>()?;
        pool.method_handle(method_handle, major)
            .map_err(|err| pool_error(offset, "bootstrap method", &err))?;

        let argument_count = body.read_be::<u16>()?;
        let mut arguments = Vec::with_capacity(body.capacity_for(usize::from(argument_count), 2));
        for _ in 0..argument_count {
            let arg_offset = body.offset();
            let index = body.read_be::<u16>()?;
            pool.entry(index, "a loadable constant")
                .map_err(|err| pool_error(arg_offset, "bootstrap argument", &err))?;
            arguments.push(index);
        }

        methods.push(BootstrapMethod {
            method_handle,
            arguments,
        });
    }
    finish_attribute(body, names::BOOTSTRAP_METHODS)?;
    Ok(methods)
}

/// Every `Dynamic` and `InvokeDynamic` entry must name an existing bootstrap method.
fn check_bootstrap_indices(pool: &ConstantPool, bootstrap: &[BootstrapMethod]) -> Result<()> {
    for (index, entry) in pool.iter() {
        if let ConstantPoolEntry::Dynamic {
            bootstrap_method_attr_index,
            ..
        }
        | ConstantPoolEntry::InvokeDynamic {
            bootstrap_method_attr_index,
            ..
        } = entry
        {
            if usize::from(*bootstrap_method_attr_index) >= bootstrap.len() {
                return Err(malformed_error!(
                    pool.entry_offset(index).unwrap_or_default(),
                    "entry {} ({}) uses bootstrap method {}, but only {} are declared",
                    index,
                    entry.kind_name(),
                    bootstrap_method_attr_index,
                    bootstrap.len()
                ));
            }
        }
    }
    Ok(())
}
