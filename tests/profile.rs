//! Instrumentation planning over scanned classes.

mod common;

use common::{Bytecode, ClassBuilder};
use jarscope::{
    disassembler::opcodes::*,
    engine::{ClassInput, ScanConfig, ScanEngine},
    profile::ProfileConfig,
    rules::RuleCatalog,
};

fn order_service() -> Vec<u8> {
    let mut builder = ClassBuilder::new("com/acme/OrderService");
    let find = builder.interface_method_ref(
        "com/acme/OrderRepository",
        "find",
        "(Ljava/lang/String;)Lcom/acme/Order;",
    );
    let new_builder = builder.method_ref(
        "com/acme/HttpClient",
        "newBuilder",
        "()Lcom/acme/HttpClient$Builder;",
    );
    let name = builder.string("orders");

    let place_order = Bytecode::new()
        .op(ALOAD_0)
        .op(ACONST_NULL)
        .invokeinterface(find, 2)
        .op(POP)
        .op(RETURN)
        .build();
    let mut compute = Bytecode::new();
    for _ in 0..5 {
        compute = compute.op(ILOAD_1).op_u16(IFEQ, 3);
    }
    let compute = compute.op(ICONST_0).op(IRETURN).build();
    let get_name = Bytecode::new().op_u8(LDC, name as u8).op(ARETURN).build();
    let configure = Bytecode::new()
        .op_u16(INVOKESTATIC, new_builder)
        .op(POP)
        .op(RETURN)
        .build();
    let to_string = Bytecode::new().op_u8(LDC, name as u8).op(ARETURN).build();

    builder
        .method(0x0001, "placeOrder", "()V", place_order)
        .method(0x0001, "compute", "(I)I", compute)
        .method(0x0021, "getName", "()Ljava/lang/String;", get_name)
        .method(0x0001, "configure", "()V", configure)
        .method(0x0001, "toString", "()Ljava/lang/String;", to_string)
        .build()
}

fn order_client() -> Vec<u8> {
    let mut builder = ClassBuilder::new("com/acme/OrderClient");
    let send = builder.method_ref("com/acme/HttpClient", "send", "()Ljava/lang/String;");
    let code = Bytecode::new()
        .op_u16(INVOKESTATIC, send)
        .op(POP)
        .op(RETURN)
        .build();
    builder.method(0x0001, "submit", "()V", code).build()
}

fn inputs() -> Vec<ClassInput> {
    vec![
        ClassInput::new("app.jar!/com/acme/OrderService.class", order_service()),
        ClassInput::new("app.jar!/com/acme/OrderClient.class", order_client()),
    ]
}

#[test]
fn profiles_are_attached_per_file() {
    let catalog = RuleCatalog::empty();
    let config = ScanConfig::default().with_profile(ProfileConfig::default());
    let report = ScanEngine::new(&catalog).with_config(config).run(&inputs()).unwrap();

    assert_eq!(report.profiles.len(), 2);
    assert_eq!(report.profiles[0].profile.class_name, "com/acme/OrderClient");

    let service = &report.profiles[1].profile;
    let methods: Vec<_> = service.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, ["placeOrder", "compute", "getName", "configure"]);

    let place_order = &service.methods[0];
    assert_eq!(place_order.call_count, 1);
    assert_eq!(place_order.client_calls, ["com/acme/OrderRepository.find"]);
    assert_eq!(service.methods[1].branch_count, 5);
    assert!(service.methods[2].synchronized);
    assert!(service.methods[3].client_calls.is_empty());
}

#[test]
fn plan_renders_flagged_methods() {
    let catalog = RuleCatalog::empty();
    let profile = ProfileConfig::default();
    let report = ScanEngine::new(&catalog)
        .with_config(ScanConfig::sequential().with_profile(profile.clone()))
        .run(&inputs())
        .unwrap();

    let plan = report.instrumentation_plan(&profile);
    assert_eq!(plan.len(), 1);
    assert_eq!(
        plan.include_value(),
        "com.acme.OrderService[compute,getName,placeOrder];"
    );
}

#[test]
fn accessor_preset_skips_getters() {
    let catalog = RuleCatalog::empty();
    let profile = ProfileConfig::accessors_excluded();
    let report = ScanEngine::new(&catalog)
        .with_config(ScanConfig::default().with_profile(profile.clone()))
        .run(&inputs())
        .unwrap();

    assert_eq!(
        report.instrumentation_plan(&profile).include_value(),
        "com.acme.OrderService[compute,placeOrder];"
    );
}
