//! Class file decoding.
//!
//! Turns the bytes of one `.class` file into a [`DecodedClass`]: version, constant pool,
//! class identity and every field and method with its descriptor and body. Decoding is a
//! single bounds-checked pass; any structural problem is reported as
//! [`crate::Error::MalformedClass`] carrying the byte offset where it was detected.
//!
//! # Key Components
//!
//! - [`decode_class`] / [`decode_class_with`] - Entry points
//! - [`DecodedClass`] - The decoded class, immutable after decoding
//! - [`ConstantPool`] - Typed, validated constant pool with reference resolution helpers
//! - [`DecoderConfig`] - Version bounds and optional validation passes
//!
//! # Examples
//!
//! ```rust,no_run
//! use jarscope::classfile::decode_class;
//!
//! let bytes = std::fs::read("Example.class")?;
//! let class = decode_class(&bytes)?;
//! println!("{} (major {})", class.this_class, class.version.major);
//! for method in &class.methods {
//!     println!("  {}{}", method.name, method.descriptor);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod attributes;
mod config;
mod constpool;
mod decoder;
mod flags;
mod members;

pub use attributes::{names, BootstrapMethod, CodeAttribute, ExceptionHandler, RawAttribute};
pub use config::{
    DecoderConfig, MAX_MAJOR_VERSION, MIN_MAJOR_VERSION, PREVIEW_GATED_MAJOR,
    PREVIEW_MINOR_VERSION,
};
pub use constpool::{
    ConstantPool, ConstantPoolEntry, ConstantTag, MemberRef, MemberRefKind, MethodHandleRef,
    PoolError,
};
pub use decoder::{ClassDecoder, CLASS_MAGIC};
pub use flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
pub use members::{FieldInfo, MethodInfo};

use crate::{
    descriptor::{parse_class_signature, ClassSignature},
    Result,
};

/// Class file format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassVersion {
    /// Major version (52 = Java 8, 61 = Java 17, ...)
    pub major: u16,
    /// Minor version; `0xFFFF` marks preview features
    pub minor: u16,
}

impl ClassVersion {
    /// Whether the class was compiled with preview features enabled.
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.major >= PREVIEW_GATED_MAJOR && self.minor == PREVIEW_MINOR_VERSION
    }
}

/// A fully decoded class file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClass {
    /// Format version
    pub version: ClassVersion,
    /// Validated constant pool
    pub constant_pool: ConstantPool,
    /// Class access flags
    pub access: ClassAccessFlags,
    /// Internal name of this class (`java/lang/String`)
    pub this_class: String,
    /// Internal name of the superclass; `None` for `java/lang/Object` and modules
    pub super_class: Option<String>,
    /// Directly implemented interfaces, in declaration order
    pub interfaces: Vec<String>,
    /// Declared fields, in declaration order
    pub fields: Vec<FieldInfo>,
    /// Declared methods, in declaration order
    pub methods: Vec<MethodInfo>,
    /// Value of the `SourceFile` attribute
    pub source_file: Option<String>,
    /// Value of the class `Signature` attribute
    pub signature: Option<String>,
    /// Entries of the `BootstrapMethods` attribute
    pub bootstrap_methods: Vec<BootstrapMethod>,
    /// Class attributes not interpreted by the decoder
    pub attributes: Vec<RawAttribute>,
}

impl DecodedClass {
    /// Decode a class with the default configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedClass`] if the data is not a well-formed class file.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        decode_class(data)
    }

    /// Find a method by name and descriptor.
    #[must_use]
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| method.name == name && method.descriptor == descriptor)
    }

    /// Find a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Whether this is an interface (or annotation) type.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access.contains(ClassAccessFlags::INTERFACE)
    }

    /// This class's name with `.` separators, as written in Java source.
    #[must_use]
    pub fn java_name(&self) -> String {
        self.this_class.replace('/', ".")
    }

    /// Package portion of the internal name, empty for the default package.
    #[must_use]
    pub fn package(&self) -> &str {
        self.this_class
            .rsplit_once('/')
            .map_or("", |(package, _)| package)
    }

    /// Parse the class's generic signature, if it has one.
    ///
    /// # Errors
    /// Returns [`crate::Error::DescriptorSyntax`] if the signature is malformed.
    pub fn generic_signature(&self) -> Result<Option<ClassSignature>> {
        self.signature
            .as_deref()
            .map(parse_class_signature)
            .transpose()
    }
}

/// Decode a class file with [`DecoderConfig::default`].
///
/// # Errors
/// Returns [`crate::Error::MalformedClass`] if the data is not a well-formed class file.
pub fn decode_class(data: &[u8]) -> Result<DecodedClass> {
    decode_class_with(data, &DecoderConfig::default())
}

/// Decode a class file with an explicit configuration.
///
/// # Errors
/// Returns [`crate::Error::MalformedClass`] if the data is not a well-formed class file
/// under `config`.
pub fn decode_class_with(data: &[u8], config: &DecoderConfig) -> Result<DecodedClass> {
    let class = ClassDecoder::new(data, config).decode()?;
    log::debug!(
        "decoded {} (major {}, {} pool entries, {} methods)",
        class.this_class,
        class.version.major,
        class.constant_pool.count(),
        class.methods.len()
    );
    Ok(class)
}
