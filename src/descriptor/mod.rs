//! Field and method descriptors, and generic signatures.
//!
//! Descriptors are the compact type strings class files use for every field, method and
//! symbolic member reference (`I`, `[Ljava/lang/String;`, `(IJ)V`). This module turns them
//! into [`Descriptor`] trees and back. The grammar is parsed strictly: any deviation yields
//! [`crate::Error::DescriptorSyntax`] naming the offending character and its position, and
//! there is no best-effort mode.
//!
//! The [`signature`] submodule handles the richer generic signature grammar found in
//! `Signature` attributes.
//!
//! # Examples
//!
//! ```rust
//! use jarscope::descriptor::{parse_descriptor, BaseType, Descriptor};
//!
//! let desc = parse_descriptor("([BI)Ljava/lang/String;")?;
//! assert_eq!(
//!     desc.parameters()[1],
//!     Descriptor::Primitive(BaseType::Int)
//! );
//! assert_eq!(desc.to_string(), "([BI)Ljava/lang/String;");
//! # Ok::<(), jarscope::Error>(())
//! ```

mod parser;
pub mod signature;
mod types;

pub use parser::{
    parse_descriptor, parse_field_descriptor, parse_method_descriptor, parse_parameter_list,
    DescriptorParser, MAX_ARRAY_DIMENSIONS,
};
pub use signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSignature, MethodSignature, SimpleClassTypeSignature, TypeArgument, TypeParameter,
    TypeSignature,
};
pub use types::{BaseType, Descriptor};
