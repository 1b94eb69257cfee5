//! End-to-end scans of small hand-built class files.

mod common;

use common::{service_class, Bytecode, ClassBuilder};
use jarscope::{
    disassembler::opcodes::*,
    engine::{scan_class, CancellationToken, ClassInput, ScanConfig, ScanEngine},
    report::FileOutcome,
    rules::{RuleCatalog, SignaturePattern},
    scanner::{ReferenceKind, ReferenceKinds},
    Error,
};

fn okhttp_rule() -> SignaturePattern {
    SignaturePattern::method("R1", "okhttp3/Call", "execute", "()Lokhttp3/Response;")
}

#[test]
fn single_invokevirtual_yields_one_finding() {
    let catalog = RuleCatalog::new([okhttp_rule()]).unwrap();
    let inputs = [ClassInput::new(
        "app.jar!/com/acme/Service.class",
        service_class("com/acme/Service"),
    )];

    let report = ScanEngine::new(&catalog).run(&inputs).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.total_findings(), 1);
    let finding = &report.findings_for("R1")[0];
    assert_eq!(finding.file, "app.jar!/com/acme/Service.class");
    assert_eq!(finding.class_name, "com/acme/Service");
    assert_eq!(finding.method, "fetch");
    assert_eq!(finding.offset, 1);
    assert_eq!(finding.reference.kind, ReferenceKind::InvokeVirtual);
    assert_eq!(finding.reference.owner, "okhttp3/Call");
}

#[test]
fn empty_catalog_yields_nothing() {
    let catalog = RuleCatalog::empty();
    let inputs = [ClassInput::new(
        "app.jar!/com/acme/Service.class",
        service_class("com/acme/Service"),
    )];

    let report = ScanEngine::new(&catalog).run(&inputs).unwrap();

    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.total_findings(), 0);
    assert!(report.errors.is_empty());
}

#[test]
fn three_byte_input_is_malformed_at_zero() {
    let outcome = scan_class(
        "short.class",
        &[0xCA, 0xFE, 0xBA],
        &RuleCatalog::new([okhttp_rule()]).unwrap(),
        &ScanConfig::default(),
        &CancellationToken::new(),
    );

    match outcome {
        FileOutcome::Failed(failure) => {
            assert_eq!(failure.file, "short.class");
            assert!(matches!(
                failure.error,
                Error::MalformedClass { offset: 0, .. }
            ));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn shaded_duplicates_are_kept_apart() {
    let catalog = RuleCatalog::new([okhttp_rule()]).unwrap();
    let inputs = [
        ClassInput::new("lib-a.jar!/com/example/Foo.class", service_class("com/example/Foo")),
        ClassInput::new("lib-b.jar!/com/example/Foo.class", service_class("com/example/Foo")),
    ];

    let report = ScanEngine::new(&catalog).run(&inputs).unwrap();

    let files: Vec<_> = report
        .findings_for("R1")
        .iter()
        .map(|finding| (finding.file.as_str(), finding.class_name.as_str()))
        .collect();
    assert_eq!(
        files,
        [
            ("lib-a.jar!/com/example/Foo.class", "com/example/Foo"),
            ("lib-b.jar!/com/example/Foo.class", "com/example/Foo"),
        ]
    );
}

#[test]
fn one_reference_matches_many_rules() {
    let catalog = RuleCatalog::new([
        okhttp_rule(),
        SignaturePattern::new("okhttp-any", "okhttp3/*"),
        SignaturePattern::new("call-any", "okhttp3/Call").with_any_return("()"),
        SignaturePattern::new("unrelated", "retrofit2/*"),
    ])
    .unwrap();
    let inputs = [ClassInput::new("Service.class", service_class("com/acme/Service"))];

    let report = ScanEngine::new(&catalog).run(&inputs).unwrap();

    assert_eq!(
        report.matched_rules().collect::<Vec<_>>(),
        ["R1", "call-any", "okhttp-any"]
    );
    assert!(report.findings_for("unrelated").is_empty());
}

#[test]
fn package_type_and_field_rules() {
    let catalog = RuleCatalog::new([
        SignaturePattern::package("reflection", "java/lang/reflect"),
        SignaturePattern::new("stdout", "java/lang/System")
            .with_member("out")
            .with_kinds(ReferenceKinds::GET_STATIC),
        SignaturePattern::interface_call("repository", "com/acme/OrderRepository", "find"),
    ])
    .unwrap();
    let inputs = [ClassInput::new("Service.class", service_class("com/acme/Service"))];

    let report = ScanEngine::new(&catalog).run(&inputs).unwrap();

    let summary: Vec<_> = report
        .findings
        .values()
        .flatten()
        .map(|finding| (finding.rule_id.as_str(), finding.method.as_str(), finding.offset))
        .collect();
    assert_eq!(
        summary,
        [
            ("reflection", "lookup", 1),
            ("repository", "lookup", 11),
            ("stdout", "lookup", 5),
        ]
    );
}

#[test]
fn lambda_call_sites_are_reported() {
    let mut builder = ClassBuilder::new("com/acme/Lambdas");
    let metafactory = builder.method_ref(
        "java/lang/invoke/LambdaMetafactory",
        "metafactory",
        "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;",
    );
    let bootstrap = builder.method_handle(6, metafactory);
    let erased = builder.method_type("()V");
    let target = builder.method_ref("com/acme/Lambdas", "lambda$run$0", "()V");
    let implementation = builder.method_handle(6, target);
    let call_site = builder.invoke_dynamic(
        bootstrap,
        &[erased, implementation, erased],
        "run",
        "()Ljava/lang/Runnable;",
    );
    let code = Bytecode::new()
        .invokedynamic(call_site)
        .op(POP)
        .op(RETURN)
        .build();
    let bytes = builder.method(0x0009, "start", "()V", code).build();

    let catalog = RuleCatalog::new([
        SignaturePattern::new("lambdas", "java/lang/invoke/LambdaMetafactory")
            .with_kinds(ReferenceKinds::INVOKE_DYNAMIC),
        SignaturePattern::new("self", "com/acme/Lambdas").with_kinds(ReferenceKinds::METHOD_HANDLE),
    ])
    .unwrap();
    let report = ScanEngine::new(&catalog)
        .run(&[ClassInput::new("Lambdas.class", bytes)])
        .unwrap();

    let lambda = &report.findings_for("lambdas")[0];
    assert_eq!(lambda.reference.name, "run");
    assert_eq!(lambda.reference.descriptor, "()Ljava/lang/Runnable;");
    let handle = &report.findings_for("self")[0];
    assert_eq!(handle.reference.name, "lambda$run$0");
    assert_eq!(handle.offset, 0);
}
