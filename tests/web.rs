#![cfg(target_arch = "wasm32")]

use netgraph::NetgraphEngine;
use wasm_bindgen::JsError;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn ok<T>(result: Result<T, JsError>) -> T {
    result.unwrap_or_else(|_| panic!("engine call failed"))
}

fn empty_engine() -> NetgraphEngine {
    let config = r#"{"sample":{"nodes":0}}"#.to_string();
    ok(NetgraphEngine::new(Some(config)))
}

#[wasm_bindgen_test]
fn starts_with_sample_network() {
    let engine = ok(NetgraphEngine::new(None));
    assert_eq!(engine.positions().length(), 24);
}

#[wasm_bindgen_test]
fn edits_and_queries_through_js_surface() {
    let mut engine = empty_engine();
    for id in ["a", "b", "c"] {
        ok(engine.add_node(Some(id.to_string()), id, Some("router".to_string())));
    }
    assert!(ok(engine.toggle_edge("a", "b")));
    ok(engine.toggle_cell(1, 2));

    let path = ok(engine.shortest_path("a", "c")).expect("path");
    assert!(path.contains(r#"["a","b","c"]"#));
    assert!(ok(engine.shortest_path("a", "zzz")).is_none());

    ok(engine.layout("hierarchical"));
    assert_eq!(engine.positions().length(), 6);
    assert!(ok(engine.matrix()).contains(r#""matrix":[[0,1,0],[0,0,1],[0,0,0]]"#));
}

#[wasm_bindgen_test]
fn import_export_round_trip() {
    let mut engine = empty_engine();
    ok(engine.import_matrix(b"0,3,1\n3,0,0\n1,0,0\n"));
    let csv = String::from_utf8(engine.export_matrix()).unwrap();
    assert!(csv.starts_with(",Variable 1,Variable 2,Variable 3\n"));

    let json = ok(engine.export_json());
    let mut other = empty_engine();
    ok(other.import_json(&json));
    assert_eq!(ok(other.snapshot()), ok(engine.snapshot()));
}

#[wasm_bindgen_test]
fn micmac_scores_and_kind_colours() {
    let mut engine = empty_engine();
    assert!(ok(engine.micmac_scores()).is_none());
    ok(engine.import_matrix(b"0,3,1\n3,0,0\n1,0,0\n"));
    let scores = ok(engine.micmac_scores()).expect("scores");
    assert!(scores.contains(r#""var_0":{"incoming":4.0,"outgoing":4.0}"#));

    assert_eq!(NetgraphEngine::kind_color("router"), "#ef4444");
    assert_eq!(
        NetgraphEngine::kind_color("mainframe"),
        NetgraphEngine::kind_color("unknown")
    );
}
