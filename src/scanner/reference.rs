use bitflags::bitflags;
use strum::{Display, EnumIter, IntoEnumIterator};

/// How an instruction uses the entity it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceKind {
    /// `invokevirtual`
    InvokeVirtual,
    /// `invokeinterface`
    InvokeInterface,
    /// `invokestatic`
    InvokeStatic,
    /// `invokespecial` (constructors, private and super calls)
    InvokeSpecial,
    /// `getfield`
    GetField,
    /// `putfield`
    PutField,
    /// `getstatic`
    GetStatic,
    /// `putstatic`
    PutStatic,
    /// `new`
    NewInstance,
    /// `instanceof`
    InstanceOf,
    /// `checkcast`
    CheckCast,
    /// Class literal (`ldc`), `anewarray` or `multianewarray`
    TypeUse,
    /// `invokedynamic`; owner is the bootstrap method's class
    InvokeDynamic,
    /// A `MethodHandle` constant, loaded directly or passed to a bootstrap method
    MethodHandle,
}

impl ReferenceKind {
    /// Whether the reference is a method invocation, including `invokedynamic`.
    #[must_use]
    pub fn is_invoke(self) -> bool {
        matches!(
            self,
            ReferenceKind::InvokeVirtual
                | ReferenceKind::InvokeInterface
                | ReferenceKind::InvokeStatic
                | ReferenceKind::InvokeSpecial
                | ReferenceKind::InvokeDynamic
        )
    }

    /// Whether the reference is a field read or write.
    #[must_use]
    pub fn is_field_access(self) -> bool {
        matches!(
            self,
            ReferenceKind::GetField
                | ReferenceKind::PutField
                | ReferenceKind::GetStatic
                | ReferenceKind::PutStatic
        )
    }

    /// Whether the reference names only a type, with empty member name and descriptor.
    #[must_use]
    pub fn is_type_only(self) -> bool {
        matches!(
            self,
            ReferenceKind::NewInstance
                | ReferenceKind::InstanceOf
                | ReferenceKind::CheckCast
                | ReferenceKind::TypeUse
        )
    }
}

bitflags! {
    /// A set of [`ReferenceKind`] values, used to restrict which references a pattern accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ReferenceKinds: u16 {
        /// [`ReferenceKind::InvokeVirtual`]
        const INVOKE_VIRTUAL = 1 << 0;
        /// [`ReferenceKind::InvokeInterface`]
        const INVOKE_INTERFACE = 1 << 1;
        /// [`ReferenceKind::InvokeStatic`]
        const INVOKE_STATIC = 1 << 2;
        /// [`ReferenceKind::InvokeSpecial`]
        const INVOKE_SPECIAL = 1 << 3;
        /// [`ReferenceKind::GetField`]
        const GET_FIELD = 1 << 4;
        /// [`ReferenceKind::PutField`]
        const PUT_FIELD = 1 << 5;
        /// [`ReferenceKind::GetStatic`]
        const GET_STATIC = 1 << 6;
        /// [`ReferenceKind::PutStatic`]
        const PUT_STATIC = 1 << 7;
        /// [`ReferenceKind::NewInstance`]
        const NEW_INSTANCE = 1 << 8;
        /// [`ReferenceKind::InstanceOf`]
        const INSTANCE_OF = 1 << 9;
        /// [`ReferenceKind::CheckCast`]
        const CHECK_CAST = 1 << 10;
        /// [`ReferenceKind::TypeUse`]
        const TYPE_USE = 1 << 11;
        /// [`ReferenceKind::InvokeDynamic`]
        const INVOKE_DYNAMIC = 1 << 12;
        /// [`ReferenceKind::MethodHandle`]
        const METHOD_HANDLE = 1 << 13;

        /// Every statically dispatched or interface call
        const INVOKES = Self::INVOKE_VIRTUAL.bits()
            | Self::INVOKE_INTERFACE.bits()
            | Self::INVOKE_STATIC.bits()
            | Self::INVOKE_SPECIAL.bits();
        /// Every field read or write
        const FIELD_ACCESS = Self::GET_FIELD.bits()
            | Self::PUT_FIELD.bits()
            | Self::GET_STATIC.bits()
            | Self::PUT_STATIC.bits();
        /// Every reference that names only a type
        const TYPE_REFERENCES = Self::NEW_INSTANCE.bits()
            | Self::INSTANCE_OF.bits()
            | Self::CHECK_CAST.bits()
            | Self::TYPE_USE.bits();
    }
}

impl ReferenceKinds {
    /// Whether `kind` is a member of this set.
    #[must_use]
    pub fn contains_kind(self, kind: ReferenceKind) -> bool {
        self.contains(Self::from(kind))
    }

    /// Iterate over the kinds in this set, in declaration order.
    pub fn kinds(self) -> impl Iterator<Item = ReferenceKind> {
        ReferenceKind::iter().filter(move |kind| self.contains_kind(*kind))
    }
}

impl From<ReferenceKind> for ReferenceKinds {
    fn from(kind: ReferenceKind) -> Self {
        match kind {
            ReferenceKind::InvokeVirtual => Self::INVOKE_VIRTUAL,
            ReferenceKind::InvokeInterface => Self::INVOKE_INTERFACE,
            ReferenceKind::InvokeStatic => Self::INVOKE_STATIC,
            ReferenceKind::InvokeSpecial => Self::INVOKE_SPECIAL,
            ReferenceKind::GetField => Self::GET_FIELD,
            ReferenceKind::PutField => Self::PUT_FIELD,
            ReferenceKind::GetStatic => Self::GET_STATIC,
            ReferenceKind::PutStatic => Self::PUT_STATIC,
            ReferenceKind::NewInstance => Self::NEW_INSTANCE,
            ReferenceKind::InstanceOf => Self::INSTANCE_OF,
            ReferenceKind::CheckCast => Self::CHECK_CAST,
            ReferenceKind::TypeUse => Self::TYPE_USE,
            ReferenceKind::InvokeDynamic => Self::INVOKE_DYNAMIC,
            ReferenceKind::MethodHandle => Self::METHOD_HANDLE,
        }
    }
}

impl FromIterator<ReferenceKind> for ReferenceKinds {
    fn from_iter<I: IntoIterator<Item = ReferenceKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, kind| set | Self::from(kind))
    }
}

/// A named entity referenced from bytecode, borrowed from the class's constant pool.
///
/// Type-only references ([`ReferenceKind::is_type_only`]) carry an empty `name` and
/// `descriptor`. Array types are reduced to their element class, so `[Ljava/lang/String;`
/// is reported as `java/lang/String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolicReference<'c> {
    /// Internal name of the referenced (or owning) class
    pub owner: &'c str,
    /// Member name, empty for type references
    pub name: &'c str,
    /// Member descriptor, empty for type references
    pub descriptor: &'c str,
    /// How the instruction uses the reference
    pub kind: ReferenceKind,
}

impl<'c> SymbolicReference<'c> {
    /// A member reference.
    #[must_use]
    pub fn member(kind: ReferenceKind, owner: &'c str, name: &'c str, descriptor: &'c str) -> Self {
        SymbolicReference {
            owner,
            name,
            descriptor,
            kind,
        }
    }

    /// A type-only reference.
    #[must_use]
    pub fn type_only(kind: ReferenceKind, owner: &'c str) -> Self {
        SymbolicReference {
            owner,
            name: "",
            descriptor: "",
            kind,
        }
    }
}

impl std::fmt::Display for SymbolicReference<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(f, "{} {}", self.kind, self.owner)
        } else {
            write!(f, "{} {}.{}{}", self.kind, self.owner, self.name, self.descriptor)
        }
    }
}
