// Copyright (c) 2016-2021 Fabian Schuiki

//! Binding and evaluation of member accesses.

mod common;
use common::*;
use sable_svlog::member::{bind_member_access, bind_member_access_syntax};

fn declare_class<'t>(comp: &Compilation<'t>, name: &str) -> Type<'t> {
    let id = NodeId::alloc();
    let members = vec![
        comp.class_property(id, "x", &INT_TYPE, Visibility::Public, RandMode::Rand),
        comp.class_property(id, "y", &INT_TYPE, Visibility::Public, RandMode::None),
        comp.class_property(id, "secret", &INT_TYPE, Visibility::Local, RandMode::None),
        comp.class_property(id, "prot", &INT_TYPE, Visibility::Protected, RandMode::None),
        comp.symbol(
            "count",
            SymbolKind::ClassProperty {
                ty: &INT_TYPE,
                lifetime: Lifetime::Static,
                visibility: Visibility::Public,
                rand_mode: RandMode::None,
                owner: id,
            },
        ),
        comp.method(Some(id), "get", &INT_TYPE, false, vec![]),
        comp.method(Some(id), "set", &VOID_TYPE, false, vec![("v", &INT_TYPE, false)]),
        comp.symbol("c", SymbolKind::ConstraintBlock { is_static: false }),
        comp.symbol("T", SymbolKind::TypeAlias { ty: &INT_TYPE }),
        comp.symbol(
            "RED",
            SymbolKind::EnumValue {
                ty: &INT_TYPE,
                value: SvInt::from_i32(2),
            },
        ),
    ];
    comp.class_type(id, name, None, members)
}

#[test]
fn unpacked_struct_fields() {
    init_logging();
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.struct_type(false, false, &[("a", &INT_TYPE), ("b", &BYTE_TYPE)]);
    let b = ConstantValue::Integer(SvInt::from_u64(8, 2, true));
    param(&comp, "s", ty, ConstantValue::Elements(vec![int(1), b.clone()]));
    let mut ctx = EvalContext::default();

    let e = bind(&comp, &ident("s").member("a"));
    assert!(matches!(e.kind, ExprKind::MemberAccess(..)));
    assert_eq!(e.eval(&mut ctx).unwrap(), int(1));
    let e = bind(&comp, &ident("s").member("b"));
    assert!(e.ty.is_equivalent(&BYTE_TYPE));
    assert_eq!(e.eval(&mut ctx).unwrap(), b);
    assert!(codes(&comp).is_empty());
}

#[test]
fn packed_struct_fields() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let nibble = comp.vector_type(Domain::TwoValued, false, 3, 0);
    let octet = comp.vector_type(Domain::TwoValued, false, 7, 0);
    let ty = comp.struct_type(true, false, &[("a", octet), ("b", nibble)]);
    assert_eq!(ty.bit_width(), 12);
    param(&comp, "s", ty, bits(12, 0xa5b));
    let mut ctx = EvalContext::default();

    let e = bind(&comp, &ident("s").member("a"));
    assert_eq!(as_u64(&e.eval(&mut ctx).unwrap()), Some(0xa5));
    let e = bind(&comp, &ident("s").member("b"));
    assert_eq!(as_u64(&e.eval(&mut ctx).unwrap()), Some(0xb));

    // Selections compose with member accesses.
    let e = bind(&comp, &ident("s").member("a").index(ExprSyntax::int(0)));
    assert_eq!(as_u64(&e.eval(&mut ctx).unwrap()), Some(1));
    assert!(codes(&comp).is_empty());
}

#[test]
fn unknown_and_invalid_members() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.struct_type(false, false, &[("a", &INT_TYPE)]);
    comp.declare_var("s", ty);
    comp.declare_var("i", &INT_TYPE);

    assert!(bind(&comp, &ident("s").member("zz")).is_bad());
    assert!(bind(&comp, &ident("i").member("foo")).is_bad());
    assert_eq!(
        codes(&comp),
        vec![DiagCode::UnknownMember, DiagCode::InvalidMemberAccess]
    );
}

#[test]
fn empty_member_name() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.struct_type(false, false, &[("a", &INT_TYPE)]);
    comp.declare_var("s", ty);
    let cx = comp.bind_context();
    let s = bind_expr(&cx, &ident("s"));

    let e = bind_member_access(&cx, s, "", INVALID_SPAN, None, None, INVALID_SPAN);
    assert!(e.is_bad());
    assert!(codes(&comp).is_empty());
}

#[test]
fn fields_are_not_callable() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.struct_type(false, false, &[("a", &INT_TYPE)]);
    comp.declare_var("s", ty);
    let cx = comp.bind_context();

    assert!(bind(&comp, &ident("s").member("a").call(vec![])).is_bad());
    assert_eq!(codes(&comp), vec![DiagCode::ExpressionNotCallable]);

    // A stray `with` clause only warrants a warning.
    let name = Spanned::new("a".to_string(), INVALID_SPAN);
    let with = ExprSyntax::int(1);
    let e = bind_member_access_syntax(&cx, &ident("s"), &name, None, Some(&with), INVALID_SPAN);
    assert!(!e.is_bad());
    assert_eq!(comp.diagnostics()[1].get_severity(), Severity::Warning);
    assert_eq!(
        comp.diagnostics()[1].get_code(),
        Some(DiagCode::UnexpectedWithClause)
    );
}

#[test]
fn class_properties() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = declare_class(&comp, "C");
    comp.declare_var("obj", ty);

    let e = bind(&comp, &ident("obj").member("x"));
    assert!(!e.is_bad());
    assert!(e.ty.is_equivalent(&INT_TYPE));
    assert_eq!(e.get_symbol_reference().map(|s| s.name), Some("x"));
    assert!(codes(&comp).is_empty());
}

#[test]
fn class_member_visibility() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let base = declare_class(&comp, "C");
    let derived = comp.class_type(NodeId::alloc(), "D", Some(base), vec![]);
    comp.declare_var("obj", base);
    let outside = comp.bind_context();

    // Visibility violations are reported, but binding carries on.
    assert!(!bind_expr(&outside, &ident("obj").member("secret")).is_bad());
    assert!(!bind_expr(&outside, &ident("obj").member("prot")).is_bad());
    assert_eq!(
        codes(&comp),
        vec![DiagCode::LocalMemberAccess, DiagCode::ProtectedMemberAccess]
    );
    comp.take_diagnostics();

    let inside = outside.within_class(base.get_class_def().unwrap());
    bind_expr(&inside, &ident("obj").member("secret"));
    bind_expr(&inside, &ident("obj").member("prot"));
    assert!(codes(&comp).is_empty());

    let subclass = outside.within_class(derived.get_class_def().unwrap());
    bind_expr(&subclass, &ident("obj").member("prot"));
    assert!(codes(&comp).is_empty());
    bind_expr(&subclass, &ident("obj").member("secret"));
    assert_eq!(codes(&comp), vec![DiagCode::LocalMemberAccess]);
}

#[test]
fn automatic_members_need_procedural_code() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = declare_class(&comp, "C");
    comp.declare_var("obj", ty);

    assert!(bind_continuous(&comp, &ident("obj").member("x")).is_bad());
    let cx = comp.bind_context().with_flags(BindFlags::ASSERTION_EXPR);
    assert!(bind_expr(&cx, &ident("obj").member("x")).is_bad());
    assert_eq!(
        codes(&comp),
        vec![
            DiagCode::DynamicNotProcedural,
            DiagCode::ClassMemberInAssertion
        ]
    );

    // Static properties are fine anywhere.
    assert!(!bind_continuous(&comp, &ident("obj").member("count")).is_bad());
    assert_eq!(codes(&comp).len(), 2);
}

#[test]
fn class_methods() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = declare_class(&comp, "C");
    comp.declare_var("obj", ty);

    let e = bind(&comp, &ident("obj").member("get").call(vec![]));
    assert!(matches!(e.kind, ExprKind::Call(..)));
    assert!(e.ty.is_equivalent(&INT_TYPE));
    let e = bind(&comp, &ident("obj").member("get"));
    assert!(matches!(e.kind, ExprKind::Call(..)));
    let e = bind(
        &comp,
        &ident("obj").member("set").call(vec![ExprSyntax::int(1)]),
    );
    assert!(e.ty.is_void());
    assert!(codes(&comp).is_empty());

    assert!(bind(&comp, &ident("obj").member("set").call(vec![])).is_bad());
    assert!(bind(
        &comp,
        &ident("obj")
            .member("get")
            .call_with(vec![], ExprSyntax::int(1))
    )
    .is_bad());
    assert_eq!(
        codes(&comp),
        vec![DiagCode::TooFewArguments, DiagCode::WithClauseNotAllowed]
    );
}

#[test]
fn class_non_value_members() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = declare_class(&comp, "C");
    comp.declare_var("obj", ty);
    let mut ctx = EvalContext::default();

    let e = bind(&comp, &ident("obj").member("RED"));
    assert!(matches!(e.kind, ExprKind::NamedValue(..)));
    assert_eq!(e.eval(&mut ctx).unwrap(), int(2));

    let e = bind(&comp, &ident("obj").member("c"));
    assert!(e.ty.is_void());
    let e = bind(
        &comp,
        &ident("obj").member("c").member("constraint_mode").call(vec![]),
    );
    assert!(e.ty.is_equivalent(&INT_TYPE));
    assert!(codes(&comp).is_empty());

    assert!(bind(&comp, &ident("obj").member("T")).is_bad());
    assert!(bind(&comp, &ident("obj").member("missing")).is_bad());
    assert_eq!(
        codes(&comp),
        vec![DiagCode::InvalidClassAccess, DiagCode::UnknownMember]
    );
}

#[test]
fn rand_mode_only_on_random_members() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = declare_class(&comp, "C");
    comp.declare_var("obj", ty);

    let e = bind(
        &comp,
        &ident("obj").member("x").member("rand_mode").call(vec![]),
    );
    assert!(!e.is_bad());
    assert!(e.ty.is_equivalent(&INT_TYPE));
    let e = bind(
        &comp,
        &ident("obj")
            .member("x")
            .member("rand_mode")
            .call(vec![ExprSyntax::int(0)]),
    );
    assert!(e.ty.is_void());
    assert!(codes(&comp).is_empty());

    assert!(bind(
        &comp,
        &ident("obj").member("y").member("rand_mode").call(vec![])
    )
    .is_bad());
    assert_eq!(codes(&comp), vec![DiagCode::InvalidMemberAccess]);
}

#[test]
fn class_with_bad_base() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.class_type(NodeId::alloc(), "E", Some(&ERROR_TYPE), vec![]);
    comp.declare_var("obj", ty);

    assert!(bind(&comp, &ident("obj").member("x")).is_bad());
    assert!(codes(&comp).is_empty());
}

#[test]
fn covergroup_members() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let bin = comp.symbol("low", SymbolKind::CoverageBin);
    let cp = comp.symbol("cp", SymbolKind::Coverpoint { body: vec![bin] });
    let ty = comp.covergroup_type("cg_t", vec![cp]);
    comp.declare_var("cg", ty);

    let e = bind(&comp, &ident("cg").member("cp"));
    assert!(e.ty.is_void());
    let e = bind(&comp, &ident("cg").member("cp").member("low"));
    assert!(e.ty.is_void());
    assert_eq!(e.get_symbol_reference().map(|s| s.name), Some("low"));
    let e = bind(
        &comp,
        &ident("cg").member("cp").member("get_coverage").call(vec![]),
    );
    assert!(matches!(e.kind, ExprKind::Call(..)));
    assert!(e.ty.is_equivalent(&REAL_TYPE));
    assert!(codes(&comp).is_empty());

    assert!(bind_continuous(&comp, &ident("cg").member("cp")).is_bad());
    assert!(bind(&comp, &ident("cg").member("cp").member("high")).is_bad());
    assert_eq!(
        codes(&comp),
        vec![DiagCode::DynamicNotProcedural, DiagCode::UnknownMember]
    );
}

#[test]
fn tagged_union_inactive_member() {
    init_logging();
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.union_type(false, true, &[("i", &INT_TYPE), ("b", &BYTE_TYPE)]);
    let value = ConstantValue::Union(Box::new(UnionValue {
        active: Some(0),
        value: int(7),
    }));
    param(&comp, "u", ty, value);
    let mut ctx = EvalContext::default();

    let e = bind(&comp, &ident("u").member("i"));
    assert_eq!(e.eval(&mut ctx).unwrap(), int(7));
    let e = bind(&comp, &ident("u").member("b"));
    assert!(e.eval(&mut ctx).is_err());
    assert_eq!(
        eval_diags(&ctx),
        vec![(Severity::Error, Some(DiagCode::ConstEvalTaggedUnion))]
    );
}

#[test]
fn union_common_initial_sequence() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let a = comp.struct_type(false, false, &[("x", &INT_TYPE), ("y", &BYTE_TYPE)]);
    let b = comp.struct_type(false, false, &[("p", &INT_TYPE), ("q", &INT_TYPE)]);
    let ty = comp.union_type(false, false, &[("a", a), ("b", b)]);
    let active = ConstantValue::Elements(vec![
        int(7),
        ConstantValue::Integer(SvInt::from_u64(8, 3, true)),
    ]);
    let value = ConstantValue::Union(Box::new(UnionValue {
        active: Some(0),
        value: active.clone(),
    }));
    param(&comp, "u", ty, value);
    let mut ctx = EvalContext::default();

    let e = bind(&comp, &ident("u").member("a"));
    assert_eq!(e.eval(&mut ctx).unwrap(), active);
    // Only the leading `int` is shared; the rest of `b` is defaulted.
    let e = bind(&comp, &ident("u").member("b"));
    assert_eq!(
        e.eval(&mut ctx).unwrap(),
        ConstantValue::Elements(ints(&[7, 0]))
    );
    assert!(eval_diags(&ctx).is_empty());
}

#[test]
fn packed_unions() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let nibble = comp.vector_type(Domain::TwoValued, false, 3, 0);
    let octet = comp.vector_type(Domain::TwoValued, false, 7, 0);
    let plain = comp.union_type(true, false, &[("a", nibble), ("b", octet)]);
    let tagged = comp.union_type(true, true, &[("a", nibble), ("b", octet)]);
    assert_eq!(plain.bit_width(), 8);
    assert_eq!(tagged.bit_width(), 9);
    param(&comp, "p", plain, bits(8, 0xa5));
    param(&comp, "t", tagged, bits(9, 0x15a));
    let mut ctx = EvalContext::default();

    let e = bind(&comp, &ident("p").member("a"));
    assert_eq!(as_u64(&e.eval(&mut ctx).unwrap()), Some(0x5));
    let e = bind(&comp, &ident("p").member("b"));
    assert_eq!(as_u64(&e.eval(&mut ctx).unwrap()), Some(0xa5));

    // The tag bit selects `b`.
    let e = bind(&comp, &ident("t").member("b"));
    assert_eq!(as_u64(&e.eval(&mut ctx).unwrap()), Some(0x5a));
    assert!(eval_diags(&ctx).is_empty());
    let e = bind(&comp, &ident("t").member("a"));
    assert!(e.eval(&mut ctx).is_err());
    assert_eq!(
        eval_diags(&ctx),
        vec![(Severity::Error, Some(DiagCode::ConstEvalTaggedUnion))]
    );
}
