//! Fuzz target for HTML-safe JSON output.
//!
//! Escaped documents must stay valid JSON, decode back to the input, and
//! carry no bare `<`, `>`, `(`, `)` or `#`.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;

#[derive(Debug, Arbitrary)]
struct FuzzDocument {
    text: String,
    list: Vec<String>,
    map: BTreeMap<String, String>,
}

fuzz_target!(|doc: FuzzDocument| {
    let value = serde_json::json!({
        "text": doc.text,
        "list": doc.list,
        "map": doc.map,
    });

    let out = bulwark_xss::escape::to_string(&value).expect("serializing a json value");
    let bare = out
        .replace("&#40;", "")
        .replace("&#41;", "")
        .replace("&#35;", "");
    assert!(!bare.contains(['<', '>', '(', ')', '#']), "{out}");

    let decoded: serde_json::Value = serde_json::from_str(&out).expect("escaped output is json");
    assert_eq!(decoded["list"].as_array().map(Vec::len), Some(doc.list.len()));
});
