// Copyright (c) 2016-2021 Fabian Schuiki

//! Debug dumps of bound selections.

mod common;
use common::*;
use pretty_assertions::assert_eq;
use sable_svlog::serialize::{AstSerializer, DumpValue};

fn keys(dump: &DumpValue) -> Vec<&'static str> {
    match dump {
        DumpValue::Object(fields) => fields.iter().map(|(k, _)| *k).collect(),
        _ => vec![],
    }
}

#[test]
fn named_value_json() {
    init_logging();
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    comp.declare_var("v", comp.vector_type(Domain::FourValued, false, 7, 0));

    let dump = AstSerializer::new().serialize(bind(&comp, &ident("v")));
    assert_eq!(
        serde_json::to_string(&dump).unwrap(),
        r#"{"kind":"named value","type":"logic [7:0]","symbol":"v"}"#
    );
}

#[test]
fn range_select_fields() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    comp.declare_var("v", comp.vector_type(Domain::FourValued, false, 7, 0));

    let e = bind(
        &comp,
        &ident("v").range(
            RangeSelectionKind::IndexedDown,
            ExprSyntax::int(7),
            ExprSyntax::int(2),
        ),
    );
    let dump = AstSerializer::new().serialize(e);
    assert_eq!(
        keys(&dump),
        vec!["kind", "type", "selectionKind", "value", "left", "right"]
    );
    assert_eq!(dump.get("type").and_then(|v| v.as_str()), Some("logic [7:6]"));
    assert_eq!(
        dump.get("selectionKind").and_then(|v| v.as_str()),
        Some("IndexedDown")
    );
    assert_eq!(
        dump.get("value")
            .and_then(|v| v.get("symbol"))
            .and_then(|v| v.as_str()),
        Some("v")
    );
}

#[test]
fn member_access_and_calls() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    let nibble = comp.vector_type(Domain::TwoValued, false, 3, 0);
    comp.declare_var("s", comp.struct_type(true, false, &[("hi", nibble), ("lo", nibble)]));
    comp.declare_var("q", comp.queue_type(&INT_TYPE, 0));

    let ser = AstSerializer::new();
    let dump = ser.serialize(bind(&comp, &ident("s").member("lo")));
    assert_eq!(keys(&dump), vec!["kind", "type", "member", "value"]);
    assert_eq!(dump.get("member").and_then(|v| v.as_str()), Some("lo"));

    let dump = ser.serialize(bind(&comp, &ident("q").member("size").call(vec![])));
    assert_eq!(keys(&dump), vec!["kind", "type", "subroutine", "arguments"]);
    assert_eq!(dump.get("subroutine").and_then(|v| v.as_str()), Some("size"));
    match dump.get("arguments") {
        Some(DumpValue::List(args)) => {
            assert_eq!(args.len(), 1);
            assert_eq!(args[0].get("symbol").and_then(|v| v.as_str()), Some("q"));
        }
        other => panic!("expected an argument list, got {:?}", other),
    }
}

#[test]
fn spans_on_request() {
    let arena = GlobalArenas::default();
    let comp = Compilation::new(&arena);
    comp.declare_var("v", &INT_TYPE);

    let e = bind(&comp, &index("v", 0));
    let ser = AstSerializer {
        include_spans: true,
    };
    let dump = ser.serialize(e);
    assert_eq!(keys(&dump), vec!["kind", "type", "span", "value", "selector"]);
    assert_eq!(dump.get("kind").and_then(|v| v.as_str()), Some("element select"));
}
