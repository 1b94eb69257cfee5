//! The constant pool of a class file.
//!
//! Entries are decoded into the [`ConstantPoolEntry`] sum type and stored by their 1-based
//! pool index. `Long` and `Double` entries occupy two slots; the second is stored as
//! [`ConstantPoolEntry::Unusable`] so that index arithmetic stays exact. Every typed accessor
//! checks the tag of the entry it resolves and reports a [`PoolError`] naming what was
//! expected and what was found.

use strum::{Display, FromRepr};

use crate::{descriptor::parse_descriptor, file::parser::Parser, Error, Result};

/// Tag byte of a constant pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[repr(u8)]
pub enum ConstantTag {
    /// `CONSTANT_Utf8`
    Utf8 = 1,
    /// `CONSTANT_Integer`
    Integer = 3,
    /// `CONSTANT_Float`
    Float = 4,
    /// `CONSTANT_Long`
    Long = 5,
    /// `CONSTANT_Double`
    Double = 6,
    /// `CONSTANT_Class`
    Class = 7,
    /// `CONSTANT_String`
    String = 8,
    /// `CONSTANT_Fieldref`
    #[strum(serialize = "Fieldref")]
    FieldRef = 9,
    /// `CONSTANT_Methodref`
    #[strum(serialize = "Methodref")]
    MethodRef = 10,
    /// `CONSTANT_InterfaceMethodref`
    #[strum(serialize = "InterfaceMethodref")]
    InterfaceMethodRef = 11,
    /// `CONSTANT_NameAndType`
    NameAndType = 12,
    /// `CONSTANT_MethodHandle`
    MethodHandle = 15,
    /// `CONSTANT_MethodType`
    MethodType = 16,
    /// `CONSTANT_Dynamic`
    Dynamic = 17,
    /// `CONSTANT_InvokeDynamic`
    InvokeDynamic = 18,
    /// `CONSTANT_Module`
    Module = 19,
    /// `CONSTANT_Package`
    Package = 20,
}

impl ConstantTag {
    /// First major version in which the tag may appear.
    #[must_use]
    pub fn since_major(self) -> u16 {
        match self {
            ConstantTag::MethodHandle | ConstantTag::MethodType | ConstantTag::InvokeDynamic => 51,
            ConstantTag::Module | ConstantTag::Package => 53,
            ConstantTag::Dynamic => 55,
            _ => 45,
        }
    }
}

/// A decoded constant pool entry.
///
/// Floating point constants are kept as raw bits so that decoded pools compare equal
/// structurally even when they hold NaN payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantPoolEntry {
    /// Index 0 and the slot following a `Long` or `Double`
    Unusable,
    /// Decoded modified UTF-8 text
    Utf8(String),
    /// 32-bit integer constant
    Integer(i32),
    /// IEEE 754 single, raw bits
    Float(u32),
    /// 64-bit integer constant
    Long(i64),
    /// IEEE 754 double, raw bits
    Double(u64),
    /// A class or interface, or an array type
    Class {
        /// Utf8 index of the internal name
        name_index: u16,
    },
    /// A string literal
    String {
        /// Utf8 index of the literal
        utf8_index: u16,
    },
    /// A field reference
    FieldRef {
        /// Class index of the owner
        class_index: u16,
        /// NameAndType index of the member
        name_and_type_index: u16,
    },
    /// A class method reference
    MethodRef {
        /// Class index of the owner
        class_index: u16,
        /// NameAndType index of the member
        name_and_type_index: u16,
    },
    /// An interface method reference
    InterfaceMethodRef {
        /// Class index of the owner
        class_index: u16,
        /// NameAndType index of the member
        name_and_type_index: u16,
    },
    /// A member name and descriptor pair
    NameAndType {
        /// Utf8 index of the name
        name_index: u16,
        /// Utf8 index of the descriptor
        descriptor_index: u16,
    },
    /// A method handle
    MethodHandle {
        /// Reference kind, 1..=9
        reference_kind: u8,
        /// Index of the referenced field or method
        reference_index: u16,
    },
    /// A method type
    MethodType {
        /// Utf8 index of the method descriptor
        descriptor_index: u16,
    },
    /// A dynamically computed constant
    Dynamic {
        /// Index into the BootstrapMethods attribute
        bootstrap_method_attr_index: u16,
        /// NameAndType index
        name_and_type_index: u16,
    },
    /// A dynamically computed call site
    InvokeDynamic {
        /// Index into the BootstrapMethods attribute
        bootstrap_method_attr_index: u16,
        /// NameAndType index
        name_and_type_index: u16,
    },
    /// A module
    Module {
        /// Utf8 index of the module name
        name_index: u16,
    },
    /// A package exported or opened by a module
    Package {
        /// Utf8 index of the package name
        name_index: u16,
    },
}

impl ConstantPoolEntry {
    /// The entry's tag, `None` for unusable slots.
    #[must_use]
    pub fn tag(&self) -> Option<ConstantTag> {
        Some(match self {
            ConstantPoolEntry::Unusable => return None,
            ConstantPoolEntry::Utf8(_) => ConstantTag::Utf8,
            ConstantPoolEntry::Integer(_) => ConstantTag::Integer,
            ConstantPoolEntry::Float(_) => ConstantTag::Float,
            ConstantPoolEntry::Long(_) => ConstantTag::Long,
            ConstantPoolEntry::Double(_) => ConstantTag::Double,
            ConstantPoolEntry::Class { .. } => ConstantTag::Class,
            ConstantPoolEntry::String { .. } => ConstantTag::String,
            ConstantPoolEntry::FieldRef { .. } => ConstantTag::FieldRef,
            ConstantPoolEntry::MethodRef { .. } => ConstantTag::MethodRef,
            ConstantPoolEntry::InterfaceMethodRef { .. } => ConstantTag::InterfaceMethodRef,
            ConstantPoolEntry::NameAndType { .. } => ConstantTag::NameAndType,
            ConstantPoolEntry::MethodHandle { .. } => ConstantTag::MethodHandle,
            ConstantPoolEntry::MethodType { .. } => ConstantTag::MethodType,
            ConstantPoolEntry::Dynamic { .. } => ConstantTag::Dynamic,
            ConstantPoolEntry::InvokeDynamic { .. } => ConstantTag::InvokeDynamic,
            ConstantPoolEntry::Module { .. } => ConstantTag::Module,
            ConstantPoolEntry::Package { .. } => ConstantTag::Package,
        })
    }

    /// Short name of the entry kind, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstantPoolEntry::Unusable => "an unusable slot",
            ConstantPoolEntry::Utf8(_) => "Utf8",
            ConstantPoolEntry::Integer(_) => "Integer",
            ConstantPoolEntry::Float(_) => "Float",
            ConstantPoolEntry::Long(_) => "Long",
            ConstantPoolEntry::Double(_) => "Double",
            ConstantPoolEntry::Class { .. } => "Class",
            ConstantPoolEntry::String { .. } => "String",
            ConstantPoolEntry::FieldRef { .. } => "Fieldref",
            ConstantPoolEntry::MethodRef { .. } => "Methodref",
            ConstantPoolEntry::InterfaceMethodRef { .. } => "InterfaceMethodref",
            ConstantPoolEntry::NameAndType { .. } => "NameAndType",
            ConstantPoolEntry::MethodHandle { .. } => "MethodHandle",
            ConstantPoolEntry::MethodType { .. } => "MethodType",
            ConstantPoolEntry::Dynamic { .. } => "Dynamic",
            ConstantPoolEntry::InvokeDynamic { .. } => "InvokeDynamic",
            ConstantPoolEntry::Module { .. } => "Module",
            ConstantPoolEntry::Package { .. } => "Package",
        }
    }
}

/// A pool index that did not resolve to the expected kind of entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("constant pool index {index} is {found}, expected {expected}")]
pub struct PoolError {
    /// The index that failed to resolve
    pub index: u16,
    /// The entry kind the context requires
    pub expected: &'static str,
    /// The entry kind actually present, or `out of range`
    pub found: &'static str,
}

/// Which member table a [`MemberRef`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MemberRefKind {
    /// A `Fieldref`
    Field,
    /// A `Methodref`
    Method,
    /// An `InterfaceMethodref`
    InterfaceMethod,
}

/// A fully resolved field or method reference, borrowing from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'a> {
    /// Which kind of reference entry this came from
    pub kind: MemberRefKind,
    /// Internal name of the owning class
    pub owner: &'a str,
    /// Member name
    pub name: &'a str,
    /// Member descriptor
    pub descriptor: &'a str,
}

/// A resolved `MethodHandle` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodHandleRef<'a> {
    /// Reference kind, 1..=9
    pub reference_kind: u8,
    /// The referenced member
    pub member: MemberRef<'a>,
}

/// The constant pool of one class file, immutable after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolEntry>,
    offsets: Vec<usize>,
}

impl ConstantPool {
    /// Decode `constant_pool_count` and the entries that follow it.
    ///
    /// Only tags and entry layouts are checked here; cross references are checked by
    /// [`ConstantPool::validate`] once the whole pool is known.
    pub(crate) fn parse(parser: &mut Parser) -> Result<Self> {
        let count_offset = parser.offset();
        let count = parser.read_be::<u16>()?;
        if count == 0 {
            return Err(malformed_error!(
                count_offset,
                "expected constant_pool_count >= 1, found 0"
            ));
        }

        // Every entry is at least 3 bytes; the extra slot holds the unusable index 0.
        let capacity = parser.capacity_for(usize::from(count), 3) + 1;
        let mut entries = Vec::with_capacity(capacity);
        let mut offsets = Vec::with_capacity(capacity);
        entries.push(ConstantPoolEntry::Unusable);
        offsets.push(count_offset);

        let mut index = 1u16;
        while index < count {
            let entry_offset = parser.offset();
            let entry = Self::parse_entry(parser, index)?;
            let wide = matches!(
                entry,
                ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_)
            );

            entries.push(entry);
            offsets.push(entry_offset);

            if wide {
                if index + 1 >= count {
                    return Err(malformed_error!(
                        entry_offset,
                        "8-byte constant at index {} needs two slots but the pool has {}",
                        index,
                        count
                    ));
                }
                entries.push(ConstantPoolEntry::Unusable);
                offsets.push(entry_offset);
                index += 2;
            } else {
                index += 1;
            }
        }

        Ok(ConstantPool { entries, offsets })
    }

    fn parse_entry(parser: &mut Parser, index: u16) -> Result<ConstantPoolEntry> {
        let tag_offset = parser.offset();
        let tag_byte = parser.read_be::<u8>()?;
        let Some(tag) = ConstantTag::from_repr(tag_byte) else {
            return Err(malformed_error!(
                tag_offset,
                "invalid constant pool tag {} at index {}",
                tag_byte,
                index
            ));
        };

        Ok(match tag {
            ConstantTag::Utf8 => {
                let length = parser.read_be::<u16>()?;
                let bytes_offset = parser.offset();
                let bytes = parser.read_bytes(usize::from(length))?;
                match decode_modified_utf8(bytes) {
                    Some(text) => ConstantPoolEntry::Utf8(text),
                    None => {
                        return Err(malformed_error!(
                            bytes_offset,
                            "invalid modified UTF-8 in entry {}",
                            index
                        ))
                    }
                }
            }
            ConstantTag::Integer => ConstantPoolEntry::Integer(parser.read_be::<i32>()?),
            ConstantTag::Float => ConstantPoolEntry::Float(parser.read_be::<u32>()?),
            ConstantTag::Long => ConstantPoolEntry::Long(parser.read_be::<i64>()?),
            ConstantTag::Double => ConstantPoolEntry::Double(parser.read_be::<u64>()?),
            ConstantTag::Class => ConstantPoolEntry::Class {
                name_index: parser.read_be::<u16>()?,
            },
            ConstantTag::String => ConstantPoolEntry::String {
                utf8_index: parser.read_be::<u16>()?,
            },
            ConstantTag::FieldRef => ConstantPoolEntry::FieldRef {
                class_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::MethodRef => ConstantPoolEntry::MethodRef {
                class_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::InterfaceMethodRef => ConstantPoolEntry::InterfaceMethodRef {
                class_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::NameAndType => ConstantPoolEntry::NameAndType {
                name_index: parser.read_be::<u16>()?,
                descriptor_index: parser.read_be::<u16>()?,
            },
            ConstantTag::MethodHandle => ConstantPoolEntry::MethodHandle {
                reference_kind: parser.read_be::<u8>()?,
                reference_index: parser.read_be::<u16>()?,
            },
            ConstantTag::MethodType => ConstantPoolEntry::MethodType {
                descriptor_index: parser.read_be::<u16>()?,
            },
            ConstantTag::Dynamic => ConstantPoolEntry::Dynamic {
                bootstrap_method_attr_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::InvokeDynamic => ConstantPoolEntry::InvokeDynamic {
                bootstrap_method_attr_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::Module => ConstantPoolEntry::Module {
                name_index: parser.read_be::<u16>()?,
            },
            ConstantTag::Package => ConstantPoolEntry::Package {
                name_index: parser.read_be::<u16>()?,
            },
        })
    }

    /// Check that every entry's references point at entries of the right kind.
    ///
    /// With `check_descriptors`, every NameAndType and MethodType descriptor is parsed as well.
    pub(crate) fn validate(&self, major: u16, check_descriptors: bool) -> Result<()> {
        for (index, entry) in self.iter() {
            let offset = self.offsets[usize::from(index)];
            let malformed = |err: PoolError| {
                malformed_error!(offset, "entry {} ({}): {}", index, entry.kind_name(), err)
            };

            if let Some(tag) = entry.tag() {
                if major < tag.since_major() {
                    return Err(malformed_error!(
                        offset,
                        "{} constant at index {} requires major version {}, found {}",
                        tag,
                        index,
                        tag.since_major(),
                        major
                    ));
                }
            }

            match entry {
                ConstantPoolEntry::Class { name_index } => {
                    let name = self.utf8(*name_index).map_err(malformed)?;
                    if check_descriptors {
                        check_class_name(name).map_err(|err| err.into_malformed(offset))?;
                    }
                }
                ConstantPoolEntry::String { utf8_index: idx }
                | ConstantPoolEntry::Module { name_index: idx }
                | ConstantPoolEntry::Package { name_index: idx } => {
                    self.utf8(*idx).map_err(malformed)?;
                }
                ConstantPoolEntry::FieldRef { .. }
                | ConstantPoolEntry::MethodRef { .. }
                | ConstantPoolEntry::InterfaceMethodRef { .. } => {
                    let member = self.member_ref(index).map_err(malformed)?;
                    let is_method = member.descriptor.starts_with('(');
                    if is_method == (member.kind == MemberRefKind::Field) {
                        return Err(malformed_error!(
                            offset,
                            "entry {} ({}) has descriptor {:?} of the wrong form",
                            index,
                            entry.kind_name(),
                            member.descriptor
                        ));
                    }
                }
                ConstantPoolEntry::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    self.utf8(*name_index).map_err(malformed)?;
                    let descriptor = self.utf8(*descriptor_index).map_err(malformed)?;
                    if check_descriptors {
                        parse_descriptor(descriptor).map_err(|err| err.into_malformed(offset))?;
                    }
                }
                ConstantPoolEntry::MethodHandle { .. } => {
                    self.method_handle(index, major).map_err(malformed)?;
                }
                ConstantPoolEntry::MethodType { descriptor_index } => {
                    let descriptor = self.utf8(*descriptor_index).map_err(malformed)?;
                    if !descriptor.starts_with('(') {
                        return Err(malformed_error!(
                            offset,
                            "entry {} (MethodType) has non-method descriptor {:?}",
                            index,
                            descriptor
                        ));
                    }
                    if check_descriptors {
                        parse_descriptor(descriptor).map_err(|err| err.into_malformed(offset))?;
                    }
                }
                ConstantPoolEntry::Dynamic {
                    name_and_type_index,
                    ..
                }
                | ConstantPoolEntry::InvokeDynamic {
                    name_and_type_index,
                    ..
                } => {
                    let (_, descriptor) =
                        self.name_and_type(*name_and_type_index).map_err(malformed)?;
                    let wants_method = matches!(entry, ConstantPoolEntry::InvokeDynamic { .. });
                    if descriptor.starts_with('(') != wants_method {
                        return Err(malformed_error!(
                            offset,
                            "entry {} ({}) has descriptor {:?} of the wrong form",
                            index,
                            entry.kind_name(),
                            descriptor
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The `constant_pool_count` value, one more than the highest valid index.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Raw access to an entry; `None` for index 0, unusable slots and out-of-range indices.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&ConstantPoolEntry> {
        match self.entries.get(usize::from(index)) {
            Some(ConstantPoolEntry::Unusable) | None => None,
            Some(entry) => Some(entry),
        }
    }

    /// File offset of the entry's tag byte.
    #[must_use]
    pub fn entry_offset(&self, index: u16) -> Option<usize> {
        self.offsets.get(usize::from(index)).copied()
    }

    /// Iterate over usable entries with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantPoolEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !matches!(entry, ConstantPoolEntry::Unusable))
            // the pool holds at most u16::MAX entries
            .map(|(index, entry)| (index as u16, entry))
    }

    /// Resolve an index to an entry, failing with what was found instead.
    ///
    /// # Errors
    /// Returns [`PoolError`] for index 0, unusable slots and out-of-range indices.
    pub fn entry(
        &self,
        index: u16,
        expected: &'static str,
    ) -> std::result::Result<&ConstantPoolEntry, PoolError> {
        match self.entries.get(usize::from(index)) {
            None => Err(PoolError {
                index,
                expected,
                found: "out of range",
            }),
            Some(ConstantPoolEntry::Unusable) => Err(PoolError {
                index,
                expected,
                found: ConstantPoolEntry::Unusable.kind_name(),
            }),
            Some(entry) => Ok(entry),
        }
    }

    /// Text of a `Utf8` entry.
    ///
    /// # Errors
    /// Returns [`PoolError`] if the index is invalid or not a `Utf8` entry.
    pub fn utf8(&self, index: u16) -> std::result::Result<&str, PoolError> {
        match self.entry(index, "Utf8")? {
            ConstantPoolEntry::Utf8(text) => Ok(text),
            other => Err(mismatch(index, "Utf8", other)),
        }
    }

    /// Internal name of a `Class` entry.
    ///
    /// # Errors
    /// Returns [`PoolError`] if the index is invalid, not a `Class` entry, or its name is not
    /// a `Utf8` entry.
    pub fn class_name(&self, index: u16) -> std::result::Result<&str, PoolError> {
        match self.entry(index, "Class")? {
            ConstantPoolEntry::Class { name_index } => self.utf8(*name_index),
            other => Err(mismatch(index, "Class", other)),
        }
    }

    /// Name and descriptor of a `NameAndType` entry.
    ///
    /// # Errors
    /// Returns [`PoolError`] if the index or its components do not resolve.
    pub fn name_and_type(&self, index: u16) -> std::result::Result<(&str, &str), PoolError> {
        match self.entry(index, "NameAndType")? {
            ConstantPoolEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(mismatch(index, "NameAndType", other)),
        }
    }

    /// Resolve any of `Fieldref`, `Methodref` or `InterfaceMethodref`.
    ///
    /// # Errors
    /// Returns [`PoolError`] if the index or its components do not resolve.
    pub fn member_ref(&self, index: u16) -> std::result::Result<MemberRef<'_>, PoolError> {
        const EXPECTED: &str = "Fieldref, Methodref or InterfaceMethodref";
        let (kind, class_index, nat_index) = match self.entry(index, EXPECTED)? {
            ConstantPoolEntry::FieldRef {
                class_index,
                name_and_type_index,
            } => (MemberRefKind::Field, class_index, name_and_type_index),
            ConstantPoolEntry::MethodRef {
                class_index,
                name_and_type_index,
            } => (MemberRefKind::Method, class_index, name_and_type_index),
            ConstantPoolEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (MemberRefKind::InterfaceMethod, class_index, name_and_type_index),
            other => return Err(mismatch(index, EXPECTED, other)),
        };

        let owner = self.class_name(*class_index)?;
        let (name, descriptor) = self.name_and_type(*nat_index)?;
        Ok(MemberRef {
            kind,
            owner,
            name,
            descriptor,
        })
    }

    /// Resolve a `MethodHandle` entry and check its reference kind against its target.
    ///
    /// Reference kinds 1-4 must target a `Fieldref`, 5 and 8 a `Methodref`, 6 and 7 a
    /// `Methodref` (or an `InterfaceMethodref` from major version 52 on) and 9 an
    /// `InterfaceMethodref`.
    ///
    /// # Errors
    /// Returns [`PoolError`] if the entry or its target do not resolve or do not agree.
    pub fn method_handle(
        &self,
        index: u16,
        major: u16,
    ) -> std::result::Result<MethodHandleRef<'_>, PoolError> {
        let (reference_kind, reference_index) = match self.entry(index, "MethodHandle")? {
            ConstantPoolEntry::MethodHandle {
                reference_kind,
                reference_index,
            } => (*reference_kind, *reference_index),
            other => return Err(mismatch(index, "MethodHandle", other)),
        };

        let member = self.member_ref(reference_index)?;
        let allowed = match reference_kind {
            1..=4 => member.kind == MemberRefKind::Field,
            5 | 8 => member.kind == MemberRefKind::Method,
            6 | 7 => {
                member.kind == MemberRefKind::Method
                    || (major >= 52 && member.kind == MemberRefKind::InterfaceMethod)
            }
            9 => member.kind == MemberRefKind::InterfaceMethod,
            _ => {
                return Err(PoolError {
                    index,
                    expected: "a reference kind between 1 and 9",
                    found: "an unknown reference kind",
                })
            }
        };

        if !allowed {
            return Err(PoolError {
                index: reference_index,
                expected: "a member reference matching the handle's reference kind",
                found: match member.kind {
                    MemberRefKind::Field => "Fieldref",
                    MemberRefKind::Method => "Methodref",
                    MemberRefKind::InterfaceMethod => "InterfaceMethodref",
                },
            });
        }

        Ok(MethodHandleRef {
            reference_kind,
            member,
        })
    }
}

fn mismatch(index: u16, expected: &'static str, found: &ConstantPoolEntry) -> PoolError {
    PoolError {
        index,
        expected,
        found: found.kind_name(),
    }
}

/// Class entries hold either an internal name or an array descriptor.
fn check_class_name(name: &str) -> Result<()> {
    if name.starts_with('[') {
        parse_descriptor(name)?;
        return Ok(());
    }
    if name.is_empty() || name.split('/').any(|segment| segment.is_empty()) {
        return Err(Error::DescriptorSyntax {
            descriptor: name.to_string(),
            position: 0,
            found: name.chars().next(),
            expected: "a class name",
        });
    }
    if let Some(position) = name.find(['.', ';', '[']) {
        return Err(Error::DescriptorSyntax {
            descriptor: name.to_string(),
            position,
            found: name[position..].chars().next(),
            expected: "a class name character",
        });
    }
    Ok(())
}

/// Decode the modified UTF-8 used by class files.
///
/// NUL is encoded as `C0 80` and supplementary characters as surrogate pairs of 3-byte
/// sequences. Unpaired surrogates decode to U+FFFD. Returns `None` for byte sequences that
/// are not valid modified UTF-8.
pub(crate) fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    if bytes.iter().all(|&b| b != 0 && b < 0x80) {
        return String::from_utf8(bytes.to_vec()).ok();
    }

    let continuation = |i: usize| -> Option<u16> {
        let b = *bytes.get(i)?;
        (b & 0xC0 == 0x80).then_some(u16::from(b & 0x3F))
    };

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            0x01..=0x7F => {
                units.push(u16::from(b));
                i += 1;
            }
            0xC0..=0xDF => {
                units.push((u16::from(b & 0x1F) << 6) | continuation(i + 1)?);
                i += 2;
            }
            0xE0..=0xEF => {
                units.push(
                    (u16::from(b & 0x0F) << 12) | (continuation(i + 1)? << 6) | continuation(i + 2)?,
                );
                i += 3;
            }
            _ => return None,
        }
    }

    Some(
        char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}
