//! # Bulwark Core
//!
//! Request and response types, the read-only [`ParameterSource`] contract and
//! the async middleware chain that the Bulwark security middleware plugs into.
//!
//! ```rust
//! use bulwark_core::{HttpRequest, ParameterSource, RequestParameters};
//!
//! let req = HttpRequest::from_target("GET", "/search?q=rust&tag=a&tag=b").unwrap();
//! assert_eq!(req.parameter("q").as_deref(), Some("rust"));
//! assert_eq!(req.parameter_values("tag").unwrap().len(), 2);
//!
//! let params = RequestParameters::from_form(b"name=bob").unwrap();
//! assert_eq!(params.parameter("name").as_deref(), Some("bob"));
//! ```

pub mod error;
pub mod http;
pub mod middleware;
pub mod params;

pub use error::Error;
pub use http::{HttpRequest, HttpResponse, Json};
pub use middleware::{HandlerFn, Middleware, MiddlewareChain, Next, handler};
pub use params::{ParameterMap, ParameterSource, RequestParameters};
