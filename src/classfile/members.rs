//! Fields and methods of a decoded class.

use crate::{
    classfile::{
        attributes::{CodeAttribute, RawAttribute},
        flags::{FieldAccessFlags, MethodAccessFlags},
    },
    descriptor::{
        parse_field_signature, parse_method_signature, Descriptor, MethodSignature, TypeSignature,
    },
    Result,
};

/// A field declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Access and property flags
    pub access: FieldAccessFlags,
    /// Field name
    pub name: String,
    /// Raw field descriptor
    pub descriptor: String,
    /// Parsed descriptor
    pub parsed: Descriptor,
    /// Generic signature from the `Signature` attribute
    pub signature: Option<String>,
    /// Attributes not interpreted by the decoder
    pub attributes: Vec<RawAttribute>,
}

impl FieldInfo {
    /// Parse the field's generic signature, if it has one.
    ///
    /// # Errors
    /// Returns [`crate::Error::DescriptorSyntax`] if the signature is malformed.
    pub fn generic_signature(&self) -> Result<Option<TypeSignature>> {
        self.signature
            .as_deref()
            .map(parse_field_signature)
            .transpose()
    }
}

/// A method declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// Access and property flags
    pub access: MethodAccessFlags,
    /// Method name
    pub name: String,
    /// Raw method descriptor
    pub descriptor: String,
    /// Parsed descriptor
    pub parsed: Descriptor,
    /// Method body; absent for abstract and native methods
    pub code: Option<CodeAttribute>,
    /// Generic signature from the `Signature` attribute
    pub signature: Option<String>,
    /// Attributes not interpreted by the decoder
    pub attributes: Vec<RawAttribute>,
}

impl MethodInfo {
    /// `name` followed by `descriptor`, the key that identifies a method within its class.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.descriptor)
    }

    /// Whether the method is a constructor or static initializer.
    #[must_use]
    pub fn is_initializer(&self) -> bool {
        self.name == "<init>" || self.name == "<clinit>"
    }

    /// Whether the method is declared `synchronized`.
    #[must_use]
    pub fn is_synchronized(&self) -> bool {
        self.access.contains(MethodAccessFlags::SYNCHRONIZED)
    }

    /// Parse the method's generic signature, if it has one.
    ///
    /// # Errors
    /// Returns [`crate::Error::DescriptorSyntax`] if the signature is malformed.
    pub fn generic_signature(&self) -> Result<Option<MethodSignature>> {
        self.signature
            .as_deref()
            .map(parse_method_signature)
            .transpose()
    }
}
