//! Integration tests for common Bulwark workflows.
//!
//! These tests drive the filter through the middleware chain the way an
//! application would.

use bulwark::prelude::*;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Sanitized Parameter Reads
// =============================================================================

#[tokio::test]
async fn test_comment_form_is_sanitized() {
    init_tracing();

    let mut chain = MiddlewareChain::new();
    chain.use_middleware(XssFilter::new(
        XssConfig::default().with_suspicious_parameter_logging(true),
    ));

    let req = HttpRequest::new("POST", "/comments")
        .with_form_body(
            b"author=Zo%C3%AB&body=%3Cp%3EGreat+%3Cb%3Epost%3C%2Fb%3E%3C%2Fp%3E%3Cscript%3Esteal()%3C%2Fscript%3E"
                .to_vec(),
        )
        .unwrap();

    let response = chain
        .apply(
            req,
            handler(|req: HttpRequest| async move {
                let author = req.parameter("author").unwrap_or_default();
                let body = req.parameter("body").unwrap_or_default();
                Ok(HttpResponse::html(format!("<h2>{author}</h2>{body}")))
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.text(), "<h2>Zoë</h2><p>Great <b>post</b></p>");
    assert_eq!(
        response.headers.get("X-XSS-Protection"),
        Some(&"1; mode=block".to_string())
    );
}

#[tokio::test]
async fn test_report_endpoint_round_trip() {
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(XssFilter::default());

    let req = HttpRequest::from_target("GET", "/api/xss-test?input=%3Ci%3Eok%3C%2Fi%3E%3Cimg+src%3Dx+onerror%3Dalert(1)%3E")
        .unwrap();

    let response = chain
        .apply(
            req,
            handler(|req: HttpRequest| async move {
                let original = req.raw_parameter("input").unwrap_or_default();
                let message = req.parameter("input").unwrap_or_default();
                HtmlSafeJson(SanitizationReport::new(original, message)).into_response()
            }),
        )
        .await
        .unwrap();

    let text = response.text();
    assert!(!text.contains('<'));

    let report: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(report["isSanitized"], true);
    assert!(report["original"].as_str().unwrap().contains("onerror"));
    assert!(!report["message"].as_str().unwrap().contains("onerror"));
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_disabled_filter_passes_raw_values() {
    let config = XssConfig::from_vars([("BULWARK_XSS_ENABLED", "false")]).unwrap();

    let mut chain = MiddlewareChain::new();
    chain.use_middleware(XssFilter::new(config));

    let req = HttpRequest::from_target("GET", "/?q=%3Cscript%3E").unwrap();
    let response = chain
        .apply(
            req,
            handler(|req: HttpRequest| async move {
                Ok(HttpResponse::ok().with_body(req.parameter("q").unwrap_or_default().into_bytes()))
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.text(), "<script>");
}

#[test]
fn test_shared_policy_wrapper() {
    let raw: RequestParameters = [("name", "<u>ann</u><iframe></iframe>")].into_iter().collect();
    let params = SanitizingParameters::new(Arc::new(raw), XssSanitizer::default());

    assert_eq!(params.parameter("name").as_deref(), Some("<u>ann</u>"));
}
