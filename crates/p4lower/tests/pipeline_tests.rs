#![allow(unused_imports)]
#![allow(unused_variables)]

use p4lower::core::{BinaryOp, Field};
use p4lower::{
    load_program, save_program, LoweringConfig, LoweringSession, ProgramBuilder, Statement, Type,
};
use pretty_assertions::assert_eq;

/// `@atomic { if (hdr.ipv4.isValid()) { hdr.ipv4.ttl = hdr.ipv4.ttl - 1; } }` in ingress.
#[test]
fn test_lower_control_body_from_saved_program() {
    let mut builder = ProgramBuilder::new();
    let ipv4_t = builder.header_type(
        "ipv4_t",
        vec![
            Field::new("ttl", Type::bits(8)),
            Field::new("protocol", Type::bits(8)),
        ],
    );
    let ipv4 = builder.header_instance("ipv4", ipv4_t);
    let ingress = builder.control("ingress", "ingress_t");

    let header = builder.header_ref(ipv4).unwrap();
    let valid = builder.method_call(header, "isValid", vec![], Type::Bool);
    let ttl_dst = builder.field(ipv4, "ttl").unwrap();
    let ttl_src = builder.field(ipv4, "ttl").unwrap();
    let one = builder.constant(Type::bits(8), 1);
    let decremented = builder.binary(BinaryOp::Sub, ttl_src, one);
    let program = builder.build().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("program.json");
    save_program(&program, &path).unwrap();
    let program = load_program(&path).unwrap();

    let body = Statement::atomic(vec![Statement::if_then(
        valid,
        Statement::assign(ttl_dst, decremented),
        None,
    )]);

    let mut session = LoweringSession::new(LoweringConfig {
        emit_debug_traces: false,
        ..LoweringConfig::default()
    });
    let fragment = session
        .lower_statement(&program, &body, Some(ingress))
        .unwrap();

    assert!(!session.diagnostics().has_errors());
    assert_eq!(
        fragment.render(),
        [
            "LOCK(&ingress_t_lock)",
            "if( (pd->headers[header_instance_ipv4].pointer != NULL) ) {",
            "    set_field((fldT[]){{pd, header_instance_ipv4, field_ipv4_t_ttl}}, 0, (0xff&((GET_INT32_AUTO_PACKET(pd, header_instance_ipv4, field_ipv4_t_ttl))+(256-(uint8_t)1))), 8);",
            "} else {",
            "    ;",
            "}",
            "UNLOCK(&ingress_t_lock)",
        ]
        .join("\n")
    );
}
