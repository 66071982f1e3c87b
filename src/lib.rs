// Bulwark - request sanitization middleware for Rust
//
// Cleans request parameters against an allow-list HTML policy before they
// reach handlers, and writes JSON that stays inert when rendered as HTML.

// Re-export core functionality
pub use bulwark_core::*;

// Re-export optional crates
#[cfg(feature = "xss")]
pub use bulwark_xss;

/// Commonly used types
pub mod prelude {
    pub use crate::{
        Error, HandlerFn, HttpRequest, HttpResponse, Json, Middleware, MiddlewareChain, Next,
        ParameterSource, RequestParameters, handler,
    };

    #[cfg(feature = "xss")]
    pub use bulwark_xss::{
        HtmlPolicy, HtmlSafeJson, RuleSet, SanitizationReport, SanitizingParameters, XssConfig,
        XssFilter, XssSanitizer,
    };
}
