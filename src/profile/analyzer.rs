use crate::{
    classfile::{DecodedClass, MemberRef, MethodInfo, PoolError},
    descriptor::parse_method_descriptor,
    disassembler::{opcodes, FlowType},
    scanner::malformed_code,
    Error, Result,
};

/// Thresholds and name filters for method profiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Owner name suffixes that mark a call as a client call
    pub client_suffixes: Vec<String>,
    /// Method names never profiled
    pub excluded_names: Vec<String>,
    /// Method name prefixes never profiled
    pub excluded_prefixes: Vec<String>,
    /// Invocations at or above which a method is flagged
    pub call_threshold: usize,
    /// Jumps and switches at or above which a method is flagged
    pub branch_threshold: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            client_suffixes: vec!["Client".into(), "Repository".into()],
            excluded_names: ["<init>", "<clinit>", "toString", "hashCode", "equals"]
                .map(String::from)
                .to_vec(),
            excluded_prefixes: Vec::new(),
            call_threshold: 10,
            branch_threshold: 5,
        }
    }
}

impl ProfileConfig {
    /// The default configuration, additionally skipping accessors and lambda bodies.
    #[must_use]
    pub fn accessors_excluded() -> Self {
        ProfileConfig {
            excluded_prefixes: ["get", "set", "is", "lambda$"].map(String::from).to_vec(),
            ..Self::default()
        }
    }

    /// Whether the method `name` is skipped.
    #[must_use]
    pub fn excludes(&self, name: &str) -> bool {
        self.excluded_names.iter().any(|excluded| excluded == name)
            || self
                .excluded_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    fn client_suffix<'s>(&'s self, owner: &str) -> Option<&'s str> {
        self.client_suffixes
            .iter()
            .map(String::as_str)
            .find(|suffix| owner.ends_with(suffix))
    }
}

/// Instrumentation-relevant facts about one method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodProfile {
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Declared `synchronized` or contains `monitorenter`
    pub synchronized: bool,
    /// Number of invoke instructions, `invokedynamic` included
    pub call_count: usize,
    /// Number of jumps and switches
    pub branch_count: usize,
    /// Client calls made, as `owner.name`
    pub client_calls: Vec<String>,
}

impl MethodProfile {
    /// Whether the method deserves instrumentation under `config`.
    #[must_use]
    pub fn is_flagged(&self, config: &ProfileConfig) -> bool {
        self.synchronized
            || !self.client_calls.is_empty()
            || self.call_count >= config.call_threshold
            || self.branch_count >= config.branch_threshold
    }
}

/// Profiles of the methods of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassProfile {
    /// Internal name of the class
    pub class_name: String,
    /// Profiled methods in declaration order; excluded names are absent
    pub methods: Vec<MethodProfile>,
}

impl ClassProfile {
    /// Names of the flagged methods, sorted and without duplicates (overloads share a name).
    #[must_use]
    pub fn flagged_methods(&self, config: &ProfileConfig) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .methods
            .iter()
            .filter(|method| method.is_flagged(config))
            .map(|method| method.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Profile every non-excluded method of `class`.
///
/// Methods without a body are profiled from their flags alone. A class whose own name ends
/// with a client suffix never reports client calls for that suffix.
///
/// # Errors
/// Returns [`Error::MalformedCode`] or [`Error::CorruptReference`] if a method body cannot be
/// walked.
pub fn profile_class(class: &DecodedClass, config: &ProfileConfig) -> Result<ClassProfile> {
    let methods = class
        .methods
        .iter()
        .filter(|method| !config.excludes(&method.name))
        .map(|method| profile_method(class, method, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(ClassProfile {
        class_name: class.this_class.clone(),
        methods,
    })
}

fn profile_method(
    class: &DecodedClass,
    method: &MethodInfo,
    config: &ProfileConfig,
) -> Result<MethodProfile> {
    let mut profile = MethodProfile {
        name: method.name.clone(),
        descriptor: method.descriptor.clone(),
        synchronized: method.is_synchronized(),
        call_count: 0,
        branch_count: 0,
        client_calls: Vec::new(),
    };

    let Some(code) = &method.code else {
        return Ok(profile);
    };

    let mut offset = 0;
    for instruction in code.instructions() {
        let instruction = instruction.map_err(|err| malformed_code(method, offset, err))?;
        offset = instruction.next_offset();

        match instruction.flow_type {
            FlowType::ConditionalBranch
            | FlowType::UnconditionalBranch
            | FlowType::Subroutine
            | FlowType::Switch => profile.branch_count += 1,
            FlowType::Call => {
                profile.call_count += 1;
                if instruction.opcode == opcodes::INVOKEDYNAMIC {
                    continue;
                }
                let Some(index) = instruction.pool_index() else {
                    continue;
                };
                let member = class.constant_pool.member_ref(index).map_err(|err| {
                    corrupt(method, instruction.offset, &err)
                })?;
                if let Some(call) = client_call(class, &member, config) {
                    if !profile.client_calls.contains(&call) {
                        profile.client_calls.push(call);
                    }
                }
            }
            _ if instruction.opcode == opcodes::MONITORENTER => profile.synchronized = true,
            _ => {}
        }
    }

    Ok(profile)
}

/// `owner.name` if the call goes to a client-like owner and is not a builder step.
fn client_call(class: &DecodedClass, member: &MemberRef, config: &ProfileConfig) -> Option<String> {
    let suffix = config.client_suffix(member.owner)?;
    if class.this_class.ends_with(suffix) {
        return None;
    }

    let return_type = parse_method_descriptor(member.descriptor)
        .ok()?
        .return_type()?
        .internal_name();
    if return_type == member.owner
        || return_type.ends_with(suffix)
        || return_type.ends_with("Builder")
    {
        return None;
    }
    Some(format!("{}.{}", member.owner, member.name))
}

fn corrupt(method: &MethodInfo, offset: u32, err: &PoolError) -> Error {
    Error::CorruptReference {
        method: method.key(),
        offset,
        index: err.index,
        expected: err.expected,
        found: err.found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classfile::decode_class,
        disassembler::opcodes::*,
        test::{Bytecode, ClassBuilder},
    };

    #[test]
    fn exclusions() {
        let config = ProfileConfig::default();
        assert!(config.excludes("<init>"));
        assert!(config.excludes("hashCode"));
        assert!(!config.excludes("getName"));

        let accessors = ProfileConfig::accessors_excluded();
        assert!(accessors.excludes("getName"));
        assert!(accessors.excludes("lambda$run$0"));
        assert!(!accessors.excludes("process"));
    }

    #[test]
    fn synchronized_by_flag_or_monitor() {
        let monitor = Bytecode::new()
            .op(ALOAD_0)
            .op(MONITORENTER)
            .op(ALOAD_0)
            .op(MONITOREXIT)
            .op(RETURN)
            .build();
        let plain = Bytecode::new().op(RETURN).build();
        let bytes = ClassBuilder::new("com/acme/Lock")
            .method(0x0001, "guarded", "()V", monitor)
            .method(0x0021, "declared", "()V", plain.clone())
            .method(0x0001, "plain", "()V", plain)
            .build();
        let class = decode_class(&bytes).unwrap();
        let config = ProfileConfig::default();
        let profile = profile_class(&class, &config).unwrap();

        let synchronized: Vec<_> = profile
            .methods
            .iter()
            .map(|method| (method.name.as_str(), method.synchronized))
            .collect();
        assert_eq!(
            synchronized,
            [("guarded", true), ("declared", true), ("plain", false)]
        );
        assert_eq!(profile.flagged_methods(&config), ["declared", "guarded"]);
    }

    #[test]
    fn counts_calls_and_branches() {
        let mut builder = ClassBuilder::new("com/acme/Busy");
        let target = builder.method_ref("com/acme/Util", "step", "()V");
        let mut code = Bytecode::new();
        for _ in 0..10 {
            code = code.op_u16(INVOKESTATIC, target);
        }
        // ifeq +3 ; goto +3 ; return
        code = code.op(ICONST_0).op_u16(IFEQ, 3).op_u16(GOTO, 3).op(RETURN);
        let bytes = builder.method(0x0009, "work", "()V", code.build()).build();

        let class = decode_class(&bytes).unwrap();
        let config = ProfileConfig::default();
        let profile = profile_class(&class, &config).unwrap();
        let work = &profile.methods[0];
        assert_eq!(work.call_count, 10);
        assert_eq!(work.branch_count, 2);
        assert!(work.is_flagged(&config));

        let relaxed = ProfileConfig {
            call_threshold: 11,
            ..ProfileConfig::default()
        };
        assert!(!work.is_flagged(&relaxed));
    }

    #[test]
    fn client_call_heuristics() {
        let mut builder = ClassBuilder::new("com/acme/OrderService");
        let fetch = builder.method_ref("com/acme/HttpClient", "fetch", "()Ljava/lang/String;");
        let chain = builder.method_ref("com/acme/HttpClient", "timeout", "(I)Lcom/acme/HttpClient;");
        let build = builder.method_ref(
            "com/acme/HttpClient",
            "newBuilder",
            "()Lcom/acme/HttpClient$Builder;",
        );
        let save = builder.interface_method_ref("com/acme/OrderRepository", "save", "(Ljava/lang/Object;)V");

        let calls = Bytecode::new()
            .op_u16(INVOKESTATIC, fetch)
            .op(POP)
            .op(RETURN)
            .build();
        let builders = Bytecode::new()
            .op(ICONST_0)
            .op_u16(INVOKESTATIC, chain)
            .op(POP)
            .op_u16(INVOKESTATIC, build)
            .op(POP)
            .op(RETURN)
            .build();
        let repository = Bytecode::new()
            .op(ALOAD_0)
            .op(ALOAD_0)
            .invokeinterface(save, 2)
            .op(RETURN)
            .build();
        let bytes = builder
            .method(0x0001, "load", "()V", calls)
            .method(0x0001, "configure", "()V", builders)
            .method(0x0001, "store", "()V", repository)
            .build();

        let class = decode_class(&bytes).unwrap();
        let profile = profile_class(&class, &ProfileConfig::default()).unwrap();
        let clients: Vec<_> = profile
            .methods
            .iter()
            .map(|method| (method.name.as_str(), method.client_calls.clone()))
            .collect();
        assert_eq!(
            clients,
            [
                ("load", vec!["com/acme/HttpClient.fetch".to_string()]),
                ("configure", vec![]),
                ("store", vec!["com/acme/OrderRepository.save".to_string()]),
            ]
        );
    }

    #[test]
    fn client_classes_do_not_report_their_own_suffix() {
        let mut builder = ClassBuilder::new("com/acme/RetryingClient");
        let fetch = builder.method_ref("com/acme/HttpClient", "fetch", "()Ljava/lang/String;");
        let code = Bytecode::new().op_u16(INVOKESTATIC, fetch).op(POP).op(RETURN).build();
        let bytes = builder.method(0x0001, "load", "()V", code).build();

        let class = decode_class(&bytes).unwrap();
        let profile = profile_class(&class, &ProfileConfig::default()).unwrap();
        assert!(profile.methods[0].client_calls.is_empty());
    }

    #[test]
    fn excluded_methods_are_not_profiled() {
        let code = Bytecode::new().op(RETURN).build();
        let bytes = ClassBuilder::new("A")
            .method(0x0021, "<init>", "()V", code.clone())
            .method(0x0021, "toString", "()Ljava/lang/String;", code)
            .build();
        let class = decode_class(&bytes).unwrap();
        assert!(profile_class(&class, &ProfileConfig::default())
            .unwrap()
            .methods
            .is_empty());
    }
}
