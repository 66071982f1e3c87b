use crate::accessor::SanitizingParameters;
use crate::config::XssConfig;
use crate::observer::{SanitizeObserver, TracingObserver};
use crate::sanitizer::XssSanitizer;
use async_trait::async_trait;
use bulwark_core::{Error, HttpRequest, HttpResponse, Middleware, Next};
use std::sync::Arc;
use tracing::{debug, error, info};

/// XSS protection middleware
///
/// Swaps each request's parameter source for a [`SanitizingParameters`]
/// view before handing it on. Handlers read sanitized values through the
/// usual `parameter*` accessors; the raw values stay reachable only through
/// the wrapper.
#[derive(Clone)]
pub struct XssFilter {
    config: Arc<XssConfig>,
    sanitizer: XssSanitizer,
    observer: Arc<dyn SanitizeObserver>,
}

impl XssFilter {
    /// Create a filter with the policy named by `config.rule_sets`.
    pub fn new(config: XssConfig) -> Self {
        let sanitizer = XssSanitizer::new(config.build_policy());
        Self::with_sanitizer(config, sanitizer)
    }

    /// Create with a prebuilt sanitizer; `config.rule_sets` is ignored.
    pub fn with_sanitizer(config: XssConfig, sanitizer: XssSanitizer) -> Self {
        info!(
            enabled = config.enabled,
            rule_sets = config.rule_sets.len(),
            excluded_paths = config.exclude_paths.len(),
            "XSS filter initialized"
        );
        let observer: Arc<dyn SanitizeObserver> =
            Arc::new(TracingObserver::new().with_values(config.log_values));
        Self {
            config: Arc::new(config),
            sanitizer,
            observer,
        }
    }

    /// Replace the per-value event sink.
    pub fn with_observer(mut self, observer: Arc<dyn SanitizeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &XssConfig {
        &self.config
    }

    pub fn sanitizer(&self) -> &XssSanitizer {
        &self.sanitizer
    }

    /// Check if request needs XSS protection
    pub fn needs_protection(&self, request: &HttpRequest) -> bool {
        self.config.enabled
            && !self
                .config
                .exclude_paths
                .iter()
                .any(|excluded| request.path.starts_with(excluded.as_str()))
    }

    /// Put a sanitizing view in front of the request's parameters.
    pub fn wrap_request(&self, request: HttpRequest) -> HttpRequest {
        let view = SanitizingParameters::new(request.parameter_source(), self.sanitizer.clone())
            .with_observer(Arc::clone(&self.observer));
        request.with_parameter_source(Arc::new(view))
    }

    /// Debug-log every raw parameter value containing `<` or `>`.
    pub fn log_suspicious_parameters(&self, request: &HttpRequest) {
        for (name, values) in request.parameter_map() {
            for value in values.iter().filter(|v| v.contains(['<', '>'])) {
                debug!(
                    method = %request.method,
                    path = %request.path,
                    parameter = %name,
                    value = %value,
                    "Request parameter contains markup characters"
                );
            }
        }
    }

    /// Add XSS protection headers to response
    pub fn add_protection_headers(&self, response: HttpResponse) -> HttpResponse {
        response
            .with_header("X-XSS-Protection", "1; mode=block")
            .with_header("X-Content-Type-Options", "nosniff")
    }
}

impl Default for XssFilter {
    fn default() -> Self {
        Self::with_sanitizer(XssConfig::default(), XssSanitizer::default())
    }
}

#[async_trait]
impl Middleware for XssFilter {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        if !self.needs_protection(&req) {
            debug!(method = %req.method, path = %req.path, "XSS filter skipped");
            return next(req).await;
        }

        let method = req.method.clone();
        let path = req.path.clone();
        debug!(method = %method, path = %path, "XSS filter processing request");

        if self.config.log_suspicious_parameters {
            self.log_suspicious_parameters(&req);
        }

        match next(self.wrap_request(req)).await {
            Ok(response) => {
                debug!(method = %method, path = %path, status = response.status, "XSS filter completed");
                if self.config.protection_headers {
                    Ok(self.add_protection_headers(response))
                } else {
                    Ok(response)
                }
            }
            Err(e) => {
                error!(method = %method, path = %path, error = %e, "Request failed behind XSS filter");
                Err(e)
            }
        }
    }
}
