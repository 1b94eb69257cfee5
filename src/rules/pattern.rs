use std::fmt;

use crate::{
    descriptor::{parse_descriptor, parse_parameter_list},
    scanner::{ReferenceKind, ReferenceKinds, SymbolicReference},
    Error, Result,
};

/// Matches the owner class of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerMatcher {
    /// Exact internal name, e.g. `okhttp3/Call`
    Exact(String),
    /// Every owner whose internal name starts with the prefix, e.g. `okhttp3/`
    Prefix(String),
}

impl OwnerMatcher {
    /// Parse the textual form: a trailing `*` makes a prefix matcher.
    ///
    /// ```rust
    /// use jarscope::rules::OwnerMatcher;
    ///
    /// assert_eq!(OwnerMatcher::parse("okhttp3/*"), OwnerMatcher::Prefix("okhttp3/".into()));
    /// assert_eq!(OwnerMatcher::parse("okhttp3/Call"), OwnerMatcher::Exact("okhttp3/Call".into()));
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.strip_suffix('*') {
            Some(prefix) => OwnerMatcher::Prefix(prefix.to_string()),
            None => OwnerMatcher::Exact(text.to_string()),
        }
    }

    /// Whether `owner` is accepted.
    #[must_use]
    pub fn matches(&self, owner: &str) -> bool {
        match self {
            OwnerMatcher::Exact(name) => owner == name,
            OwnerMatcher::Prefix(prefix) => owner.starts_with(prefix.as_str()),
        }
    }
}

impl fmt::Display for OwnerMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerMatcher::Exact(name) => f.write_str(name),
            OwnerMatcher::Prefix(prefix) => write!(f, "{prefix}*"),
        }
    }
}

impl From<&str> for OwnerMatcher {
    fn from(text: &str) -> Self {
        OwnerMatcher::parse(text)
    }
}

/// Matches the member name of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberMatcher {
    /// Exact member name
    Exact(String),
    /// Any member, including the empty name of type references
    Any,
}

impl MemberMatcher {
    /// Whether `name` is accepted.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            MemberMatcher::Exact(expected) => name == expected,
            MemberMatcher::Any => true,
        }
    }
}

/// Matches the member descriptor of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorMatcher {
    /// Exact descriptor text
    Exact(String),
    /// Fixed parameter list such as `(Ljava/lang/String;I)`, any return type
    AnyReturn(String),
    /// Any descriptor, including the empty descriptor of type references
    Any,
}

impl DescriptorMatcher {
    /// Whether `descriptor` is accepted.
    #[must_use]
    pub fn matches(&self, descriptor: &str) -> bool {
        match self {
            DescriptorMatcher::Exact(expected) => descriptor == expected,
            DescriptorMatcher::AnyReturn(parameters) => descriptor
                .strip_prefix(parameters.as_str())
                .is_some_and(|return_type| !return_type.is_empty()),
            DescriptorMatcher::Any => true,
        }
    }
}

/// One entry of a rule catalog.
///
/// A pattern matches a [`SymbolicReference`] when its owner, member name and descriptor
/// matchers all accept, and the reference kind is in `kinds` if a filter is set.
///
/// # Examples
///
/// ```rust
/// use jarscope::{
///     rules::SignaturePattern,
///     scanner::{ReferenceKind, ReferenceKinds, SymbolicReference},
/// };
///
/// let pattern = SignaturePattern::method("R1", "okhttp3/Call", "execute", "()Lokhttp3/Response;");
/// let call = SymbolicReference::member(
///     ReferenceKind::InvokeInterface,
///     "okhttp3/Call",
///     "execute",
///     "()Lokhttp3/Response;",
/// );
/// assert!(pattern.matches(&call));
///
/// let virtual_only = pattern.with_kinds(ReferenceKinds::INVOKE_VIRTUAL);
/// assert!(!virtual_only.matches(&call));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignaturePattern {
    /// Rule this pattern reports findings for
    pub rule_id: String,
    /// Owner class matcher
    pub owner: OwnerMatcher,
    /// Member name matcher
    pub member: MemberMatcher,
    /// Member descriptor matcher
    pub descriptor: DescriptorMatcher,
    /// Accepted reference kinds; `None` accepts every kind
    pub kinds: Option<ReferenceKinds>,
}

impl SignaturePattern {
    /// A pattern accepting every reference to `owner`, with any member and descriptor.
    ///
    /// A string owner is read with [`OwnerMatcher::parse`], so `okhttp3/*` is a prefix.
    #[must_use]
    pub fn new(rule_id: impl Into<String>, owner: impl Into<OwnerMatcher>) -> Self {
        SignaturePattern {
            rule_id: rule_id.into(),
            owner: owner.into(),
            member: MemberMatcher::Any,
            descriptor: DescriptorMatcher::Any,
            kinds: None,
        }
    }

    /// Exact owner, member name and descriptor.
    #[must_use]
    pub fn method(rule_id: impl Into<String>, owner: &str, name: &str, descriptor: &str) -> Self {
        Self::new(rule_id, OwnerMatcher::Exact(owner.to_string()))
            .with_member(name)
            .with_descriptor(descriptor)
    }

    /// Every reference to any class in `package` (internal form, `/` separated) or below.
    #[must_use]
    pub fn package(rule_id: impl Into<String>, package: &str) -> Self {
        let prefix = if package.ends_with('/') {
            package.to_string()
        } else {
            format!("{package}/")
        };
        Self::new(rule_id, OwnerMatcher::Prefix(prefix))
    }

    /// Calls through exactly the interface `owner`.
    ///
    /// Implementations of the interface are not resolved; only `invokeinterface` against
    /// the interface type itself is accepted.
    #[must_use]
    pub fn interface_call(rule_id: impl Into<String>, owner: &str, name: &str) -> Self {
        Self::new(rule_id, OwnerMatcher::Exact(owner.to_string()))
            .with_member(name)
            .with_kinds(ReferenceKinds::INVOKE_INTERFACE)
    }

    /// Restrict the member name.
    #[must_use]
    pub fn with_member(mut self, name: &str) -> Self {
        self.member = MemberMatcher::Exact(name.to_string());
        self
    }

    /// Restrict the descriptor to an exact string.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: &str) -> Self {
        self.descriptor = DescriptorMatcher::Exact(descriptor.to_string());
        self
    }

    /// Restrict the parameter list, leaving the return type open.
    ///
    /// Accepts a full method descriptor too; anything after `)` is dropped.
    #[must_use]
    pub fn with_any_return(mut self, parameters: &str) -> Self {
        let parameters = match parameters.find(')') {
            Some(end) => &parameters[..=end],
            None => parameters,
        };
        self.descriptor = DescriptorMatcher::AnyReturn(parameters.to_string());
        self
    }

    /// Restrict the accepted reference kinds.
    #[must_use]
    pub fn with_kinds(mut self, kinds: ReferenceKinds) -> Self {
        self.kinds = Some(kinds);
        self
    }

    /// Whether a reference kind passes the kind filter.
    #[must_use]
    pub fn accepts_kind(&self, kind: ReferenceKind) -> bool {
        self.kinds.map_or(true, |kinds| kinds.contains_kind(kind))
    }

    /// Whether this pattern matches `reference`.
    #[must_use]
    pub fn matches(&self, reference: &SymbolicReference) -> bool {
        self.accepts_kind(reference.kind)
            && self.owner.matches(reference.owner)
            && self.member.matches(reference.name)
            && self.descriptor.matches(reference.descriptor)
    }

    /// Check that the pattern is well formed.
    ///
    /// # Errors
    /// Returns [`Error::Catalog`] naming the rule if the rule id is empty, the owner is not an
    /// internal name (or a non-empty prefix of one), the member name is not a valid
    /// unqualified name, a descriptor does not parse, or the kind filter is empty.
    pub fn validate(&self) -> Result<()> {
        if self.rule_id.trim().is_empty() {
            return Err(self.invalid("empty rule id"));
        }

        match &self.owner {
            OwnerMatcher::Exact(name) => {
                if name.is_empty() || name.split('/').any(str::is_empty) {
                    return Err(self.invalid(format!("owner {name:?} is not an internal name")));
                }
                check_internal_chars(name).map_err(|msg| self.invalid(msg))?;
            }
            OwnerMatcher::Prefix(prefix) => {
                if prefix.is_empty() {
                    return Err(self.invalid("empty owner prefix"));
                }
                check_internal_chars(prefix).map_err(|msg| self.invalid(msg))?;
            }
        }

        if let MemberMatcher::Exact(name) = &self.member {
            let special = name == "<init>" || name == "<clinit>";
            if name.is_empty() || (!special && name.contains(['.', ';', '[', '/', '<', '>'])) {
                return Err(self.invalid(format!("member name {name:?} is not a valid name")));
            }
        }

        match &self.descriptor {
            DescriptorMatcher::Exact(descriptor) => {
                parse_descriptor(descriptor)
                    .map_err(|err| self.invalid(format!("invalid descriptor: {err}")))?;
            }
            DescriptorMatcher::AnyReturn(parameters) => {
                parse_parameter_list(parameters)
                    .map_err(|err| self.invalid(format!("invalid parameter list: {err}")))?;
            }
            DescriptorMatcher::Any => {}
        }

        if self.kinds.is_some_and(|kinds| kinds.is_empty()) {
            return Err(self.invalid("reference kind filter accepts nothing"));
        }

        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::Catalog {
            rule_id: self.rule_id.clone(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SignaturePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule_id, self.owner)?;
        if let MemberMatcher::Exact(name) = &self.member {
            write!(f, ".{name}")?;
        }
        match &self.descriptor {
            DescriptorMatcher::Exact(descriptor) => f.write_str(descriptor)?,
            DescriptorMatcher::AnyReturn(parameters) => write!(f, "{parameters}*")?,
            DescriptorMatcher::Any => {}
        }
        if let Some(kinds) = self.kinds {
            let names: Vec<String> = kinds.kinds().map(|kind| kind.to_string()).collect();
            write!(f, " [{}]", names.join(","))?;
        }
        Ok(())
    }
}

fn check_internal_chars(name: &str) -> std::result::Result<(), String> {
    match name.find(['.', ';', '[']) {
        Some(position) => Err(format!(
            "owner {name:?} has {:?} at position {position}; use internal names like java/lang/String",
            &name[position..=position]
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(kind: ReferenceKind, owner: &'static str, name: &'static str, desc: &'static str) -> SymbolicReference<'static> {
        SymbolicReference::member(kind, owner, name, desc)
    }

    #[test]
    fn exact_method_pattern() {
        let pattern = SignaturePattern::method("R1", "okhttp3/Call", "execute", "()Lokhttp3/Response;");
        assert!(pattern.validate().is_ok());
        assert!(pattern.matches(&call(
            ReferenceKind::InvokeVirtual,
            "okhttp3/Call",
            "execute",
            "()Lokhttp3/Response;"
        )));
        assert!(!pattern.matches(&call(
            ReferenceKind::InvokeVirtual,
            "okhttp3/Call",
            "enqueue",
            "(Lokhttp3/Callback;)V"
        )));
        assert!(!pattern.matches(&call(
            ReferenceKind::InvokeVirtual,
            "okhttp3/CallX",
            "execute",
            "()Lokhttp3/Response;"
        )));
    }

    #[test]
    fn any_return_tolerates_return_variance() {
        let pattern = SignaturePattern::new("R2", OwnerMatcher::parse("com/mongodb/client/MongoCollection"))
            .with_member("find")
            .with_any_return("(Lorg/bson/conversions/Bson;)Lcom/mongodb/client/FindIterable;");
        assert_eq!(
            pattern.descriptor,
            DescriptorMatcher::AnyReturn("(Lorg/bson/conversions/Bson;)".into())
        );
        assert!(pattern.validate().is_ok());

        let owner = "com/mongodb/client/MongoCollection";
        assert!(pattern.matches(&call(
            ReferenceKind::InvokeInterface,
            owner,
            "find",
            "(Lorg/bson/conversions/Bson;)Lcom/mongodb/client/FindIterable;"
        )));
        assert!(pattern.matches(&call(
            ReferenceKind::InvokeInterface,
            owner,
            "find",
            "(Lorg/bson/conversions/Bson;)Ljava/lang/Object;"
        )));
        assert!(!pattern.matches(&call(ReferenceKind::InvokeInterface, owner, "find", "()V")));
    }

    #[test]
    fn package_pattern_matches_types_and_members() {
        let pattern = SignaturePattern::package("R3", "io/grpc");
        assert_eq!(pattern.owner, OwnerMatcher::Prefix("io/grpc/".into()));
        assert!(pattern.matches(&SymbolicReference::type_only(
            ReferenceKind::NewInstance,
            "io/grpc/ManagedChannelBuilder"
        )));
        assert!(pattern.matches(&call(
            ReferenceKind::InvokeStatic,
            "io/grpc/stub/ClientCalls",
            "blockingUnaryCall",
            "()V"
        )));
        assert!(!pattern.matches(&SymbolicReference::type_only(
            ReferenceKind::NewInstance,
            "io/grpcx/Thing"
        )));
    }

    #[test]
    fn type_reference_needs_open_member() {
        let pattern = SignaturePattern::method("R4", "java/util/List", "size", "()I");
        assert!(!pattern.matches(&SymbolicReference::type_only(
            ReferenceKind::CheckCast,
            "java/util/List"
        )));
    }

    #[test]
    fn interface_call_only_through_interface() {
        let pattern = SignaturePattern::interface_call("R5", "java/sql/Connection", "prepareStatement");
        let desc = "(Ljava/lang/String;)Ljava/sql/PreparedStatement;";
        assert!(pattern.matches(&call(
            ReferenceKind::InvokeInterface,
            "java/sql/Connection",
            "prepareStatement",
            desc
        )));
        assert!(!pattern.matches(&call(
            ReferenceKind::InvokeVirtual,
            "java/sql/Connection",
            "prepareStatement",
            desc
        )));
        assert!(!pattern.matches(&call(
            ReferenceKind::InvokeVirtual,
            "org/h2/jdbc/JdbcConnection",
            "prepareStatement",
            desc
        )));
    }

    #[test]
    fn validation_failures() {
        let cases = [
            SignaturePattern::method("", "a/B", "c", "()V"),
            SignaturePattern::method("R", "java.lang.String", "length", "()I"),
            SignaturePattern::method("R", "a//B", "c", "()V"),
            SignaturePattern::new("R", OwnerMatcher::Prefix(String::new())),
            SignaturePattern::method("R", "a/B", "c.d", "()V"),
            SignaturePattern::method("R", "a/B", "c", "(V"),
            SignaturePattern::new("R", OwnerMatcher::parse("a/B")).with_any_return("I"),
            SignaturePattern::new("R", OwnerMatcher::parse("a/B")).with_kinds(ReferenceKinds::empty()),
        ];
        for pattern in cases {
            assert!(
                matches!(pattern.validate(), Err(Error::Catalog { .. })),
                "{pattern} should be rejected"
            );
        }

        assert!(SignaturePattern::method("R", "a/B", "<init>", "()V").validate().is_ok());
        assert!(SignaturePattern::method("R", "a/B", "CONSTANT", "I").validate().is_ok());
    }

    #[test]
    fn pattern_display() {
        let pattern = SignaturePattern::interface_call("R5", "java/sql/Connection", "close");
        assert_eq!(pattern.to_string(), "R5: java/sql/Connection.close [invoke_interface]");
        let pattern = SignaturePattern::package("R3", "io/grpc").with_any_return("(I)");
        assert_eq!(pattern.to_string(), "R3: io/grpc/*(I)*");
    }
}
