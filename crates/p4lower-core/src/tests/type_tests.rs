use crate::builder::ProgramBuilder;
use crate::declarations::{Direction, MethodSignature};
use crate::types::{Field, Type};

#[test]
fn test_bit_and_int_helpers() {
    let b = Type::bits(16);
    let i = Type::int(32);

    assert!(b.is_unsigned_bits());
    assert!(!b.is_signed_bits());
    assert!(i.is_signed_bits());
    assert_eq!(b.width(), Some(16));
    assert_eq!(Type::varbits(320).width(), Some(320));
    assert_eq!(Type::Bool.width(), None);
}

#[test]
fn test_primitive_classification() {
    assert!(Type::Bool.is_primitive());
    assert!(Type::bits(32).is_primitive());
    assert!(!Type::bits(48).is_primitive());
    assert!(!Type::varbits(8).is_primitive());
}

#[test]
fn test_type_display() {
    assert_eq!(Type::bits(9).to_string(), "bit<9>");
    assert_eq!(Type::int(8).to_string(), "int<8>");
    assert_eq!(Type::varbits(64).to_string(), "varbit<64>");
    assert_eq!(
        Type::Tuple(vec![Type::bits(8), Type::Bool]).to_string(),
        "tuple<bit<8>, bool>"
    );
}

#[test]
fn test_header_widths() {
    let mut builder = ProgramBuilder::new();
    let opts = builder.header_type(
        "ipv4_options_t",
        vec![
            Field::new("kind", Type::bits(8)),
            Field::new("len", Type::bits(8)),
            Field::new("data", Type::varbits(320)),
        ],
    );
    let program = builder.build().unwrap();
    let decl = program.type_decl(opts).unwrap();

    assert_eq!(decl.bit_width(), 336);
    assert_eq!(decl.byte_width(), 42);
    assert_eq!(decl.fixed_bit_width(), 16);
    assert_eq!(decl.field_index("data"), Some(2));
    assert!(decl.fields()[2].is_varwidth());
}

#[test]
fn test_extern_method_lookup() {
    let mut builder = ProgramBuilder::new();
    let counter = builder.extern_type(
        "counter",
        &[],
        vec![MethodSignature::new("count").param("index", Direction::In, Type::bits(32))],
    );
    let program = builder.build().unwrap();
    let decl = program.type_decl(counter).unwrap();

    assert!(decl.is_extern());
    let count = decl.method("count").unwrap();
    assert_eq!(count.params.len(), 1);
    assert!(count.params[0].direction.is_in());
    assert!(decl.method("missing").is_none());
}

#[test]
fn test_enum_member_c_names() {
    let mut builder = ProgramBuilder::new();
    let color = builder.enum_type("Color", &["RED", "GREEN"]);
    let program = builder.build().unwrap();
    let decl = program.type_decl(color).unwrap();

    assert_eq!(decl.c_name(), Some("enum_Color"));
    assert_eq!(decl.enum_member("GREEN").unwrap().c_name, "enum_Color_GREEN");
    assert!(decl.is_enum_like());
}
