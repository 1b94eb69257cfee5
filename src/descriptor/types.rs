//! Type trees produced by the descriptor parser.

use std::fmt;

use strum::{Display, EnumIter};

/// Primitive codes of the descriptor grammar.
///
/// `Void` is only legal as a method return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum BaseType {
    /// `B`
    #[strum(serialize = "byte")]
    Byte,
    /// `C`
    #[strum(serialize = "char")]
    Char,
    /// `D`
    #[strum(serialize = "double")]
    Double,
    /// `F`
    #[strum(serialize = "float")]
    Float,
    /// `I`
    #[strum(serialize = "int")]
    Int,
    /// `J`
    #[strum(serialize = "long")]
    Long,
    /// `S`
    #[strum(serialize = "short")]
    Short,
    /// `Z`
    #[strum(serialize = "boolean")]
    Boolean,
    /// `V`
    #[strum(serialize = "void")]
    Void,
}

impl BaseType {
    /// Maps a descriptor code to its primitive, `None` for anything else.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            'V' => BaseType::Void,
            _ => return None,
        })
    }

    /// The single-character descriptor code.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
            BaseType::Void => 'V',
        }
    }
}

/// A parsed field or method descriptor.
///
/// Arrays collapse all their dimensions into one node whose component is never itself an
/// array. `Display` reproduces the descriptor text exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    /// A primitive type, or `void` in return position
    Primitive(BaseType),
    /// Element type and number of dimensions (1..=255)
    ArrayOf(Box<Descriptor>, u8),
    /// An object type by internal name, e.g. `java/lang/String`
    ObjectType(String),
    /// Ordered parameters and the return type
    MethodType(Vec<Descriptor>, Box<Descriptor>),
}

impl Descriptor {
    /// Returns `true` for method descriptors.
    #[must_use]
    pub fn is_method(&self) -> bool {
        matches!(self, Descriptor::MethodType(..))
    }

    /// Returns `true` for the `V` return type.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Descriptor::Primitive(BaseType::Void))
    }

    /// Parameters of a method descriptor; empty for field descriptors.
    #[must_use]
    pub fn parameters(&self) -> &[Descriptor] {
        match self {
            Descriptor::MethodType(params, _) => params,
            _ => &[],
        }
    }

    /// Return type of a method descriptor.
    #[must_use]
    pub fn return_type(&self) -> Option<&Descriptor> {
        match self {
            Descriptor::MethodType(_, ret) => Some(ret),
            _ => None,
        }
    }

    /// Internal name of the object type this descriptor denotes, looking through arrays.
    #[must_use]
    pub fn element_object(&self) -> Option<&str> {
        match self {
            Descriptor::ObjectType(name) => Some(name.as_str()),
            Descriptor::ArrayOf(element, _) => element.element_object(),
            _ => None,
        }
    }

    /// All object types mentioned anywhere in the descriptor, in order of appearance.
    #[must_use]
    pub fn object_types(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_object_types(&mut out);
        out
    }

    fn collect_object_types<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Descriptor::Primitive(_) => {}
            Descriptor::ObjectType(name) => out.push(name),
            Descriptor::ArrayOf(element, _) => element.collect_object_types(out),
            Descriptor::MethodType(params, ret) => {
                for param in params {
                    param.collect_object_types(out);
                }
                ret.collect_object_types(out);
            }
        }
    }

    /// Name a type the way a type-name oriented tool would: the object internal name, or the
    /// descriptor text for primitives and arrays.
    #[must_use]
    pub fn internal_name(&self) -> String {
        match self {
            Descriptor::ObjectType(name) => name.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Primitive(base) => write!(f, "{}", base.code()),
            Descriptor::ArrayOf(element, dimensions) => {
                for _ in 0..*dimensions {
                    f.write_str("[")?;
                }
                write!(f, "{element}")
            }
            Descriptor::ObjectType(name) => write!(f, "L{name};"),
            Descriptor::MethodType(params, ret) => {
                f.write_str("(")?;
                for param in params {
                    write!(f, "{param}")?;
                }
                write!(f, "){ret}")
            }
        }
    }
}
