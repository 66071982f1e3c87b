//! Fuzz target for request parameter parsing and the sanitizing view.
//!
//! Arbitrary query strings and form bodies go through the same path the
//! filter uses; the view must keep every name and value count.

#![no_main]

use arbitrary::Arbitrary;
use bulwark_core::{HttpRequest, ParameterSource};
use bulwark_xss::XssFilter;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    target: String,
    form: Vec<u8>,
}

fuzz_target!(|data: FuzzRequest| {
    let target = format!("/{}", data.target);
    let Ok(req) = HttpRequest::from_target("POST", &target) else {
        return;
    };
    let Ok(req) = req.with_form_body(data.form) else {
        return;
    };

    let raw = req.parameter_map();
    let wrapped = XssFilter::default().wrap_request(req);
    let sanitized = wrapped.parameter_map();

    assert_eq!(raw.len(), sanitized.len());
    for (name, values) in &raw {
        assert_eq!(sanitized.get(name).map(Vec::len), Some(values.len()));
        assert_eq!(
            wrapped.parameter_values(name).map(|v| v.len()),
            Some(values.len())
        );
    }
});
