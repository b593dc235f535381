#![allow(unused_imports)]
#![allow(unused_variables)]

mod common;

use common::{fixture, quiet_session, Fixture};
use p4lower_core::{
    DeclKind, Direction, ExprId, MethodSignature, Program, Statement, Type, TypeDeclId,
};
use p4lower_emit::{
    call_convention, CallConvention, Category, ExprMode, LoweringConfig, LoweringError,
    LoweringSession,
};
use pretty_assertions::assert_eq;

/// A path to `name`, declared as an extern instance of type `ty`.
fn instance(f: &mut Fixture, name: &str, ty: Type) -> ExprId {
    let decl = f.builder.declare(
        name,
        DeclKind::Instance {
            ty,
            args: vec![],
        },
    );
    f.builder.path(decl).unwrap()
}

fn counter(f: &mut Fixture) -> TypeDeclId {
    f.builder.extern_type(
        "counter",
        &[],
        vec![
            MethodSignature::new("count").param("index", Direction::In, Type::bits(32)),
            MethodSignature::new("count_two")
                .param("index", Direction::In, Type::bits(32))
                .param("amount", Direction::In, Type::bits(32)),
        ],
    )
}

#[test]
fn test_calling_conventions_table() {
    assert_eq!(call_convention("counter", "count"), CallConvention::DEFAULT);
    assert_eq!(call_convention("meter", "execute_meter").type_param_positions, &[1]);
    assert_eq!(call_convention("direct_meter", "read").type_param_positions, &[0]);
    assert_eq!(call_convention("register", "write").type_param_positions, &[1]);
    assert_eq!(
        call_convention("register", "read").param_reformat,
        Some(&["register_{0}*", "{1}*", "{2}"][..])
    );
    assert!(!call_convention("Digest", "pack").fold_type_args);
}

#[test]
fn test_counter_call_on_global_instance() {
    let mut f = fixture();
    let counter = counter(&mut f);
    let receiver = instance(&mut f, "port_counter", Type::Extern(counter));
    let index = f.builder.constant(Type::bits(32), 5);
    let call = f
        .builder
        .method_call(receiver, "count", vec![index], Type::Void);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), Some(f.ingress))
        .unwrap();
    assert_eq!(
        fragment.pre,
        vec!["extern void extern_counter_count(uint32_t, uint32_t);".to_string()]
    );
    assert_eq!(
        fragment.text,
        "extern_counter_count(global_smem.port_counter, (uint32_t)5);"
    );
}

#[test]
fn test_local_instance_is_reached_through_local_vars() {
    let mut f = fixture();
    let counter = counter(&mut f);
    let decl = f.builder.declare(
        "local_counter",
        DeclKind::Instance {
            ty: Type::Extern(counter),
            args: vec![],
        },
    );
    f.builder.add_local(f.ingress, decl).unwrap();
    let receiver = f.builder.path(decl).unwrap();
    let index = f.builder.constant(Type::bits(32), 1);
    let call = f
        .builder
        .method_call(receiver, "count", vec![index], Type::Void);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), Some(f.ingress))
        .unwrap();
    assert!(fragment
        .text
        .starts_with("extern_counter_count(local_vars->local_counter, "));
}

#[test]
fn test_too_many_arguments_is_an_arity_error() {
    let mut f = fixture();
    let counter = counter(&mut f);
    let receiver = instance(&mut f, "c", Type::Extern(counter));
    let index = f.builder.constant(Type::bits(32), 1);
    let amount = f.builder.constant(Type::bits(32), 2);
    let call = f
        .builder
        .method_call(receiver, "count_two", vec![index, amount], Type::Void);
    let program = f.builder.build().unwrap();

    let mut session = quiet_session();
    let err = session
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap_err();
    assert!(matches!(err, LoweringError::InvalidArity(_)), "{}", err);
    let recorded: Vec<_> = session.diagnostics().errors().collect();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].category, Category::InvalidArity);
}

#[test]
fn test_register_read_on_specialized_instance() {
    let mut f = fixture();
    let register = f.builder.extern_type(
        "register",
        &["T"],
        vec![MethodSignature::new("read")
            .param("result", Direction::Out, Type::Var("T".to_string()))
            .param("index", Direction::In, Type::bits(32))],
    );
    let reg_ty = Type::Specialized {
        base: register,
        args: vec![Type::bits(32)],
    };
    let receiver = instance(&mut f, "reg", reg_ty);
    let result = f.builder.variable("res", Type::bits(32));
    let result = f.builder.path(result).unwrap();
    let index = f.builder.constant(Type::bits(32), 7);
    let call = f
        .builder
        .method_call(receiver, "read", vec![result, index], Type::Void);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap();
    assert_eq!(
        fragment.text,
        "extern_register_read_uint32_t(&(global_smem.reg), &(global_smem.res), (uint32_t)7);"
    );
    assert_eq!(
        fragment.pre.last().map(String::as_str),
        Some("extern void extern_register_read_uint32_t(register_uint32_t*, uint32_t*, uint32_t);")
    );
    assert!(fragment
        .pre
        .contains(&"memcpy(&(global_smem.reg), &var_1, sizeof(uint32_t));".to_string()));
}

fn writer_extern(f: &mut Fixture, direction: Direction, ty: Type) -> ExprId {
    let hasher = f.builder.extern_type(
        "hasher",
        &[],
        vec![MethodSignature::new("get").param("result", direction, ty)],
    );
    instance(f, "h", Type::Extern(hasher))
}

#[test]
fn test_out_field_argument_is_written_back() {
    let mut f = fixture();
    let receiver = writer_extern(&mut f, Direction::Out, Type::bits(16));
    let port = f.builder.field(f.meta, "port").unwrap();
    let call = f.builder.method_call(receiver, "get", vec![port], Type::Void);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap();
    let tmp = format!("value_{}", port);
    assert_eq!(
        fragment.pre,
        vec![
            format!("uint16_t {};", tmp),
            "extern void extern_hasher_get(uint16_t, uint16_t);".to_string(),
        ]
    );
    assert_eq!(
        fragment.text,
        format!("extern_hasher_get(global_smem.h, &{});", tmp)
    );
    assert_eq!(
        fragment.post,
        vec![format!(
            "set_field((fldT[]){{{{pd, header_instance_all_metadatas, field_metadata_t_port}}}}, 0, {}, 16);",
            tmp
        )]
    );
}

#[test]
fn test_inout_field_argument_is_prefilled() {
    let mut f = fixture();
    let receiver = writer_extern(&mut f, Direction::InOut, Type::bits(16));
    let port = f.builder.field(f.meta, "port").unwrap();
    let call = f.builder.method_call(receiver, "get", vec![port], Type::Void);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap();
    let tmp = format!("value_{}", port);
    assert_eq!(
        fragment.pre[1],
        format!(
            "{} = (GET_INT32_AUTO_PACKET(pd, header_instance_all_metadatas, field_metadata_t_port));",
            tmp
        )
    );
    assert_eq!(fragment.post.len(), 1);
}

#[test]
fn test_wide_out_field_goes_through_a_byte_buffer() {
    let mut f = fixture();
    let receiver = writer_extern(&mut f, Direction::Out, Type::bits(48));
    let dst = f.builder.field(f.ethernet, "dstAddr").unwrap();
    let call = f.builder.method_call(receiver, "get", vec![dst], Type::Void);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap();
    let tmp = format!("value_{}", dst);
    assert_eq!(fragment.pre[0], format!("uint8_t {}[6];", tmp));
    assert_eq!(
        fragment.text,
        format!("extern_hasher_get(global_smem.h, {});", tmp)
    );
    assert_eq!(
        fragment.post,
        vec![format!(
            "MODIFY_BYTEBUF_BYTEBUF_PACKET(pd, header_instance_ethernet, field_ethernet_t_dstAddr, {}, 6);",
            tmp
        )]
    );
}

#[test]
fn test_method_on_non_extern_is_unresolved() {
    let mut f = fixture();
    let value = f.builder.named_path("x", Type::bits(8));
    let call = f.builder.method_call(value, "frobnicate", vec![], Type::Void);
    let program = f.builder.build().unwrap();

    let mut session = quiet_session();
    let err = session
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap_err();
    assert!(matches!(err, LoweringError::UnresolvedExtern(_)));
    assert_eq!(
        session.diagnostics().errors().next().map(|d| d.category),
        Some(Category::UnresolvedExtern)
    );
}

#[test]
fn test_missing_extern_method_is_unresolved() {
    let mut f = fixture();
    let counter = counter(&mut f);
    let receiver = instance(&mut f, "c", Type::Extern(counter));
    let call = f.builder.method_call(receiver, "reset", vec![], Type::Void);
    let program = f.builder.build().unwrap();

    let err = quiet_session()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap_err();
    assert!(err.to_string().contains("counter has no method reset"), "{}", err);
}

#[test]
fn test_free_function_gets_standard_parameters() {
    let mut f = fixture();
    let sig = MethodSignature::new("mark")
        .param("len", Direction::In, Type::bits(16))
        .param("meta", Direction::InOut, Type::Struct(f.metadata_t));
    let mark = f.builder.declare("mark", DeclKind::Function(sig));
    let method = f.builder.path(mark).unwrap();
    let total_len = f.builder.field(f.ipv4, "totalLen").unwrap();
    let meta = f.builder.header_ref(f.meta).unwrap();
    let call = f.builder.call(method, vec![total_len, meta], Type::Void);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap();
    assert_eq!(
        fragment.pre,
        vec![
            "extern void mark(uint16_t, packet_descriptor_t* pd, lookup_table_t** tables);"
                .to_string()
        ]
    );
    assert_eq!(
        fragment.text,
        "mark(handle(header_desc_ins(pd, header_instance_ipv4), field_instance_ipv4_totalLen), pd, tables);"
    );
}

#[test]
fn test_undeclared_function_without_arguments() {
    let mut f = fixture();
    let method = f.builder.named_path("mark_to_drop", Type::Void);
    let call = f.builder.call(method, vec![], Type::Void);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap();
    assert_eq!(
        fragment.pre,
        vec![
            "extern void mark_to_drop(packet_descriptor_t* pd, lookup_table_t** tables);"
                .to_string()
        ]
    );
    assert_eq!(fragment.text, "mark_to_drop(pd, tables);");
}

#[test]
fn test_undeclared_function_with_arguments_is_unresolved() {
    let mut f = fixture();
    let method = f.builder.named_path("mystery", Type::Void);
    let arg = f.builder.constant(Type::bits(8), 1);
    let call = f.builder.call(method, vec![arg], Type::Void);
    let program = f.builder.build().unwrap();

    let err = quiet_session()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap_err();
    assert!(matches!(err, LoweringError::UnresolvedExtern(_)));
}

/// `digest<mac_learn_digest_t>(1, {ethernet.srcAddr, meta.port})`
fn digest_call(f: &mut Fixture) -> ExprId {
    let digest_t = f.builder.struct_type("mac_learn_digest_t", vec![]);
    let method = f.builder.named_path("digest", Type::Void);
    let receiver = f.builder.constant(Type::bits(32), 1);
    let src = f.builder.field(f.ethernet, "srcAddr").unwrap();
    let port = f.builder.field(f.meta, "port").unwrap();
    let list = f.builder.list(vec![src, port]);
    f.builder.call_generic(
        method,
        vec![Type::Struct(digest_t)],
        vec![receiver, list],
        Type::Void,
    )
}

#[test]
fn test_digest_statement_builds_field_list() {
    let mut f = fixture();
    let call = digest_call(&mut f);
    let program = f.builder.build().unwrap();

    let fragment = quiet_session()
        .lower_statement(&program, &Statement::call(call), Some(f.ingress))
        .unwrap();
    let list = format!("digest_fields_{}", call);
    assert_eq!(
        fragment.text,
        format!(
            "generate_digest(bg,\"mac_learn_digest_t\",(uint32_t)1,&{});",
            list
        )
    );
    assert_eq!(fragment.pre.len(), 2);
    assert!(fragment.pre[0].starts_with("#ifdef T4P4S_NO_CONTROL_PLANE"));
    insta::assert_snapshot!(fragment.pre[1].replace(&list, "L"), @r"
    struct type_field_list L;
    L.fields_quantity = 2;
    L.field_offsets = malloc(sizeof(uint8_t*)*L.fields_quantity);
    L.field_widths = malloc(sizeof(uint8_t*)*L.fields_quantity);
    L.field_offsets[0] = (uint8_t*) field_desc(pd, field_instance_ethernet_srcAddr).byte_addr;
    L.field_widths[0]  =            field_desc(pd, field_instance_ethernet_srcAddr).bitwidth;
    L.field_offsets[1] = (uint8_t*) field_desc(pd, field_instance_meta_port).byte_addr;
    L.field_widths[1]  =            field_desc(pd, field_instance_meta_port).bitwidth;
    ");
    assert_eq!(fragment.post, vec!["sleep_millis(300);".to_string()]);
}

#[test]
fn test_digest_expression_uses_configured_delay() {
    let mut f = fixture();
    let call = digest_call(&mut f);
    let program = f.builder.build().unwrap();

    let mut session = LoweringSession::new(LoweringConfig {
        digest_sleep_millis: 50,
        emit_debug_traces: false,
        ..LoweringConfig::default()
    });
    let fragment = session
        .lower_expression(&program, call, Some(f.ingress), ExprMode::VALUE)
        .unwrap();
    let digest = format!("digest_{}", call);
    assert_eq!(
        fragment.text,
        format!("send_digest(bg, {}, (uint32_t)1)", digest)
    );
    assert_eq!(
        fragment.pre[1],
        format!(
            "ctrl_plane_digest {0} = create_digest(bg, \"mac_learn_digest_t\");\nadd_digest_field({0}, field_desc(pd, field_instance_ethernet_srcAddr).byte_addr, 48);\nadd_digest_field({0}, field_desc(pd, field_instance_meta_port).byte_addr, 16);",
            digest
        )
    );
    assert_eq!(fragment.post, vec!["sleep_millis(50);".to_string()]);
}

#[test]
fn test_digest_traces_when_enabled() {
    let mut f = fixture();
    let call = digest_call(&mut f);
    let program = f.builder.build().unwrap();

    let fragment = LoweringSession::default()
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap();
    let traces: Vec<&str> = fragment
        .pre
        .iter()
        .map(String::as_str)
        .filter(|l| l.starts_with("dbg_bytes") || l.starts_with("debug"))
        .collect();
    assert_eq!(traces.len(), 3);
    assert!(traces[0].contains("Sending digest"));
}

#[test]
fn test_digest_without_type_argument() {
    let mut f = fixture();
    let method = f.builder.named_path("digest", Type::Void);
    let receiver = f.builder.constant(Type::bits(32), 1);
    let call = f.builder.call(method, vec![receiver], Type::Void);
    let program = f.builder.build().unwrap();

    let mut session = quiet_session();
    let err = session
        .lower_statement(&program, &Statement::call(call), None)
        .unwrap_err();
    assert!(matches!(err, LoweringError::InvalidArity(_)));
    assert_eq!(session.diagnostics().len(), 1);
}
