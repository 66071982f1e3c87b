// HTTP request and response types

use crate::params::{ParameterMap, ParameterSource, RequestParameters};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP request wrapper
///
/// Parameters are read through a replaceable [`ParameterSource`]. Middleware
/// can substitute the source seen by downstream handlers without touching the
/// raw values.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
    parameters: Arc<dyn ParameterSource>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            path_params: HashMap::new(),
            parameters: Arc::new(RequestParameters::new()),
        }
    }

    /// Build a request from a raw target such as `/search?q=x`.
    pub fn from_target(method: impl Into<String>, target: &str) -> Result<Self, crate::Error> {
        match target.split_once('?') {
            Some((path, query)) => Ok(Self::new(method, path)
                .with_parameters(RequestParameters::from_query(query)?)),
            None => Ok(Self::new(method, target)),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Attach a URL-encoded form body. Its fields are appended to the
    /// query parameters already present.
    pub fn with_form_body(mut self, body: Vec<u8>) -> Result<Self, crate::Error> {
        let mut params = RequestParameters::new();
        params.extend(flatten(self.parameters.parameter_map()));
        params.extend_from_form(&body)?;

        self.headers
            .insert("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string());
        self.body = body;
        self.parameters = Arc::new(params);
        Ok(self)
    }

    pub fn with_parameters(self, parameters: RequestParameters) -> Self {
        self.with_parameter_source(Arc::new(parameters))
    }

    /// Replace the parameter source seen by everything downstream.
    pub fn with_parameter_source(mut self, source: Arc<dyn ParameterSource>) -> Self {
        self.parameters = source;
        self
    }

    /// The parameter source currently in effect.
    pub fn parameter_source(&self) -> Arc<dyn ParameterSource> {
        Arc::clone(&self.parameters)
    }

    /// Get the first value of a request parameter
    pub fn parameter(&self, name: &str) -> Option<String> {
        self.parameters.parameter(name)
    }

    /// Get the first value of a request parameter as it arrived
    pub fn raw_parameter(&self, name: &str) -> Option<String> {
        self.parameters.raw_parameter(name)
    }

    /// Get every value of a request parameter
    pub fn parameter_values(&self, name: &str) -> Option<Vec<String>> {
        self.parameters.parameter_values(name)
    }

    /// Get all request parameters
    pub fn parameter_map(&self) -> ParameterMap {
        self.parameters.parameter_map()
    }

    /// Get a header value, ignoring ASCII case of the name
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Parse the request body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, crate::Error> {
        serde_json::from_slice(&self.body).map_err(|e| crate::Error::Deserialization(e.to_string()))
    }

    /// Get a path parameter by name
    pub fn param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("path_params", &self.path_params)
            .finish_non_exhaustive()
    }
}

fn flatten(map: ParameterMap) -> impl Iterator<Item = (String, String)> {
    map.into_iter()
        .flat_map(|(name, values)| values.into_iter().map(move |v| (name.clone(), v)))
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn bad_request() -> Self {
        Self::new(400)
    }

    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    /// HTML response with `text/html; charset=utf-8`
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, crate::Error> {
        self.body =
            serde_json::to_vec(value).map_err(|e| crate::Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Body as UTF-8 text, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// JSON response helper
#[derive(Debug)]
pub struct Json<T: Serialize>(pub T);

impl<T: Serialize> Json<T> {
    pub fn into_response(self) -> Result<HttpResponse, crate::Error> {
        HttpResponse::ok().with_json(&self.0)
    }
}
