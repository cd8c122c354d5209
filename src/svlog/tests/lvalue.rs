// Copyright (c) 2016-2021 Fabian Schuiki

//! Selections and member accesses as targets of constant assignments.

mod common;
use common::*;

/// Evaluate `target` as an lvalue and store `value` into it.
fn assign<'t>(comp: &Compilation<'t>, ctx: &mut EvalContext, target: &ExprSyntax, value: ConstantValue) {
    let e = bind(comp, target);
    let lval = e.eval_lvalue(ctx).unwrap();
    lval.store(ctx, value);
}

#[test]
fn packed_slice_round_trip() {
    init_logging();
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.vector_type(Domain::TwoValued, false, 7, 0);
    let mut ctx = EvalContext::default();
    let v = local(&comp, &mut ctx, "v", ty, bits(8, 0));

    assign(&comp, &mut ctx, &slice("v", 5, 2), bits(4, 0b1011));
    assert_eq!(ctx.find_local(v.id), Some(&bits(8, 0b0010_1100)));

    let e = bind(&comp, &slice("v", 5, 2));
    let lval = e.eval_lvalue(&mut ctx).unwrap();
    assert_eq!(lval.load(&ctx), bits(4, 0b1011));
    assert_eq!(e.eval(&mut ctx).unwrap(), bits(4, 0b1011));

    assign(&comp, &mut ctx, &index("v", 7), bits(1, 1));
    assert_eq!(ctx.find_local(v.id), Some(&bits(8, 0b1010_1100)));
    assert!(eval_diags(&ctx).is_empty());
}

#[test]
fn unpacked_array_elements() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let byte = comp.vector_type(Domain::TwoValued, false, 7, 0);
    let ty = comp.unpacked_array_type(byte, 0, 1);
    let mut ctx = EvalContext::default();
    let a = local(
        &comp,
        &mut ctx,
        "a",
        ty,
        ConstantValue::Elements(vec![bits(8, 0), bits(8, 0)]),
    );

    assign(&comp, &mut ctx, &index("a", 1), bits(8, 0x42));
    // A bit slice of an element.
    let target = index("a", 0).range(
        RangeSelectionKind::Simple,
        ExprSyntax::int(3),
        ExprSyntax::int(0),
    );
    assign(&comp, &mut ctx, &target, bits(4, 0xf));
    assert_eq!(
        ctx.find_local(a.id),
        Some(&ConstantValue::Elements(vec![bits(8, 0x0f), bits(8, 0x42)]))
    );
}

#[test]
fn string_characters() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let mut ctx = EvalContext::default();
    let s = local(&comp, &mut ctx, "s", &STRING_TYPE, ConstantValue::Str("abc".into()));

    let ch = |c: u8| ConstantValue::Integer(SvInt::from_u64(8, c as u64, true));
    assign(&comp, &mut ctx, &index("s", 0), ch(b'x'));
    assert_eq!(ctx.find_local(s.id), Some(&ConstantValue::Str("xbc".into())));
    // Writing a zero character is ignored.
    assign(&comp, &mut ctx, &index("s", 1), ch(0));
    assert_eq!(ctx.find_local(s.id), Some(&ConstantValue::Str("xbc".into())));

    // Characters outside the ASCII range are kept as single bytes.
    assign(&comp, &mut ctx, &index("s", 0), ch(0xff));
    assert_eq!(
        ctx.find_local(s.id),
        Some(&ConstantValue::Str(vec![0xff, b'b', b'c']))
    );
    assert_eq!(bind(&comp, &index("s", 0)).eval(&mut ctx).unwrap(), ch(0xff));
    assert_eq!(ctx.find_local(s.id).map(|v| v.size()), Some(3));

    // Single bits of a character can be written.
    assign(&comp, &mut ctx, &index("s", 1).index(ExprSyntax::int(0)), bits(1, 1));
    assert_eq!(
        ctx.find_local(s.id),
        Some(&ConstantValue::Str(vec![0xff, b'c', b'c']))
    );
    assert!(eval_diags(&ctx).is_empty());
}

#[test]
fn queue_write_past_end_appends() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.queue_type(&INT_TYPE, 0);
    let mut ctx = EvalContext::default();
    let q = local(&comp, &mut ctx, "q", ty, ConstantValue::Queue(ints(&[1, 2, 3])));

    assign(&comp, &mut ctx, &index("q", 3), int(4));
    assert_eq!(
        ctx.find_local(q.id),
        Some(&ConstantValue::Queue(ints(&[1, 2, 3, 4])))
    );
    assign(&comp, &mut ctx, &ident("q").index(ExprSyntax::unbounded()), int(9));
    assert_eq!(
        ctx.find_local(q.id),
        Some(&ConstantValue::Queue(ints(&[1, 2, 3, 9])))
    );
    assert!(eval_diags(&ctx).is_empty());
}

#[test]
fn dynamic_write_out_of_bounds_is_ignored() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.dynamic_array_type(&INT_TYPE);
    let mut ctx = EvalContext::default();
    let d = local(&comp, &mut ctx, "d", ty, ConstantValue::Elements(ints(&[1, 2])));

    assign(&comp, &mut ctx, &index("d", 5), int(9));
    assert_eq!(
        ctx.find_local(d.id),
        Some(&ConstantValue::Elements(ints(&[1, 2])))
    );
    assert_eq!(
        eval_diags(&ctx),
        vec![(Severity::Warning, Some(DiagCode::ConstEvalDynamicArrayIndex))]
    );
}

#[test]
fn associative_write_creates_entry() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.associative_array_type(&INT_TYPE, Some(&STRING_TYPE));
    let mut ctx = EvalContext::default();
    let m = local(
        &comp,
        &mut ctx,
        "m",
        ty,
        ConstantValue::Map(Box::new(AssociativeMap::new())),
    );

    let key = ident("m").index(ExprSyntax::string("k"));
    assign(&comp, &mut ctx, &key, int(7));
    let map = ctx.find_local(m.id).and_then(|v| v.as_map()).unwrap();
    assert_eq!(map.get(&MapKey::Str("k".into())), Some(&int(7)));
    assert_eq!(bind(&comp, &key).eval(&mut ctx).unwrap(), int(7));
    assert!(eval_diags(&ctx).is_empty());
}

#[test]
fn struct_members() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let unpacked = comp.struct_type(false, false, &[("a", &INT_TYPE), ("b", &INT_TYPE)]);
    let nibble = comp.vector_type(Domain::TwoValued, false, 3, 0);
    let packed = comp.struct_type(true, false, &[("hi", nibble), ("lo", nibble)]);
    let mut ctx = EvalContext::default();
    let s = local(&comp, &mut ctx, "s", unpacked, ConstantValue::Elements(ints(&[1, 2])));
    let p = local(&comp, &mut ctx, "p", packed, bits(8, 0));

    assign(&comp, &mut ctx, &ident("s").member("b"), int(3));
    assert_eq!(
        ctx.find_local(s.id),
        Some(&ConstantValue::Elements(ints(&[1, 3])))
    );

    assign(&comp, &mut ctx, &ident("p").member("hi"), bits(4, 0xa));
    assign(&comp, &mut ctx, &ident("p").member("lo"), bits(4, 0x5));
    assert_eq!(ctx.find_local(p.id), Some(&bits(8, 0xa5)));
}

#[test]
fn union_write_switches_member() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.union_type(false, false, &[("i", &INT_TYPE), ("s", &STRING_TYPE)]);
    let mut ctx = EvalContext::default();
    let u = local(&comp, &mut ctx, "u", ty, ty.default_value());

    assign(&comp, &mut ctx, &ident("u").member("s"), ConstantValue::Str("hi".into()));
    assert_eq!(
        ctx.find_local(u.id).and_then(|v| v.as_union()).cloned(),
        Some(UnionValue {
            active: Some(1),
            value: ConstantValue::Str("hi".into()),
        })
    );
}

#[test]
fn tagged_union_write_to_inactive_member() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.union_type(false, true, &[("i", &INT_TYPE), ("s", &STRING_TYPE)]);
    let mut ctx = EvalContext::default();
    let u = local(
        &comp,
        &mut ctx,
        "u",
        ty,
        ConstantValue::Union(Box::new(UnionValue {
            active: Some(0),
            value: int(3),
        })),
    );

    assign(&comp, &mut ctx, &ident("u").member("i"), int(5));
    assert_eq!(
        ctx.find_local(u.id).and_then(|v| v.as_union()).map(|u| u.value.clone()),
        Some(int(5))
    );

    let e = bind(&comp, &ident("u").member("s"));
    assert!(e.eval_lvalue(&mut ctx).is_err());
    assert_eq!(
        eval_diags(&ctx),
        vec![(Severity::Error, Some(DiagCode::ConstEvalTaggedUnion))]
    );
}

#[test]
fn parameters_are_not_writable() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let ty = comp.vector_type(Domain::TwoValued, false, 7, 0);
    param(&comp, "P", ty, bits(8, 3));
    let mut ctx = EvalContext::default();

    let e = bind(&comp, &index("P", 0));
    assert_eq!(e.eval(&mut ctx).unwrap(), bits(1, 1));
    assert!(e.eval_lvalue(&mut ctx).is_err());
    assert_eq!(
        eval_diags(&ctx),
        vec![(Severity::Error, Some(DiagCode::ConstEvalNonConstVariable))]
    );
}
