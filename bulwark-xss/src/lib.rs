//! # Bulwark XSS Protection
//!
//! Cross-Site Scripting (XSS) protection for Bulwark applications.
//!
//! ## Features
//!
//! - ✅ **Allow-list HTML Policy** - Composable rule sets under a fixed deny list
//! - ✅ **Value Classification** - Markup goes to the cleaner, text to the encoder
//! - ✅ **Sanitizing Parameters** - Drop-in [`ParameterSource`](bulwark_core::ParameterSource) view
//! - ✅ **HTML-safe JSON** - `serde_json` formatter escaping `< > ( ) #`
//! - ✅ **Middleware Integration** - [`XssFilter`] wraps every request
//! - ✅ **Protection Headers** - X-XSS-Protection, X-Content-Type-Options
//!
//! ## Quick Start
//!
//! ```rust
//! use bulwark_xss::{XssConfig, XssFilter, XssSanitizer};
//!
//! // Create middleware
//! let filter = XssFilter::new(XssConfig::default());
//!
//! // Markup is cleaned against the policy
//! let sanitizer = XssSanitizer::default();
//! assert_eq!(sanitizer.sanitize("<b>hello</b><script>alert(1)</script>"), "<b>hello</b>");
//!
//! // Text is encoded
//! assert_eq!(sanitizer.sanitize("Tom & Jerry"), "Tom &amp; Jerry");
//! ```
//!
//! ## Sanitizing request parameters
//!
//! ```rust
//! use bulwark_core::{HttpRequest, MiddlewareChain, HttpResponse, handler};
//! use bulwark_xss::XssFilter;
//!
//! # tokio_test::block_on(async {
//! let mut chain = MiddlewareChain::new();
//! chain.use_middleware(XssFilter::default());
//!
//! let req = HttpRequest::from_target("GET", "/?name=%3Ci%3Eann%3C%2Fi%3E%3Ciframe%3E").unwrap();
//! let response = chain
//!     .apply(req, handler(|req: HttpRequest| async move {
//!         Ok(HttpResponse::html(req.parameter("name").unwrap_or_default()))
//!     }))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(response.text(), "<i>ann</i>");
//! # });
//! ```
//!
//! ## Custom policies
//!
//! ```rust
//! use bulwark_xss::{HtmlPolicy, RuleSet};
//!
//! let policy = HtmlPolicy::from_rule_sets([RuleSet::Formatting, RuleSet::Links]);
//! assert_eq!(
//!     policy.clean(r#"<a href="https://example.com">x</a><img src="a.png">"#),
//!     r#"<a href="https://example.com" rel="nofollow">x</a>"#
//! );
//!
//! // Disallowed elements lose against every allow rule
//! let policy = HtmlPolicy::builder()
//!     .allow_elements(["script", "b"])
//!     .disallow_elements(["script"])
//!     .build();
//! assert!(!policy.allows_element("script"));
//! ```
//!
//! ## HTML-safe JSON
//!
//! ```rust
//! use bulwark_xss::{SanitizationReport, escape};
//!
//! let report = SanitizationReport::new("<b>x</b>", "<b>x</b>");
//! let json = escape::to_string(&report).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"original":"&lt;b&gt;x&lt;/b&gt;","message":"&lt;b&gt;x&lt;/b&gt;","isSanitized":true}"#
//! );
//! ```

pub mod accessor;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod filter;
pub mod observer;
pub mod policy;
pub mod report;
pub mod sanitizer;

pub use accessor::SanitizingParameters;
pub use classifier::{Classification, classify};
pub use config::XssConfig;
pub use encoder::encode_for_html;
pub use error::{Result, XssError};
pub use escape::{EscapeTable, HtmlSafeFormatter, HtmlSafeJson};
pub use filter::XssFilter;
pub use observer::{NoopObserver, SanitizeEvent, SanitizeObserver, TracingObserver};
pub use policy::{HtmlPolicy, PolicyBuilder, RuleSet};
pub use report::SanitizationReport;
pub use sanitizer::{Sanitized, XssSanitizer};
