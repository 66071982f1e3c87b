//! Request parameters and the read-only parameter source contract.
//!
//! Parameters are multi-valued, servlet style: a name may appear several
//! times in the query string and in an `application/x-www-form-urlencoded`
//! body, and every occurrence is kept in arrival order.

use crate::Error;
use std::collections::HashMap;

/// All parameters of a request, keyed by name.
pub type ParameterMap = HashMap<String, Vec<String>>;

/// Read surface over a request's parameters.
///
/// Implementations never require write access to the underlying data. Every
/// call returns fresh owned values so that adapters can substitute derived
/// values without holding on to them.
pub trait ParameterSource: Send + Sync {
    /// First value of the named parameter, if any.
    fn parameter(&self, name: &str) -> Option<String>;

    /// All values of the named parameter in arrival order, if any.
    fn parameter_values(&self, name: &str) -> Option<Vec<String>>;

    /// Every parameter name with its values.
    fn parameter_map(&self) -> ParameterMap;

    /// First value as it arrived, before any adapter transformed it.
    fn raw_parameter(&self, name: &str) -> Option<String> {
        self.parameter(name)
    }
}

/// Raw parameters as parsed from the query string and form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    values: ParameterMap,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string. A leading `?` is ignored.
    pub fn from_query(query: &str) -> Result<Self, Error> {
        let mut params = Self::new();
        params.extend_from_query(query)?;
        Ok(params)
    }

    /// Parse a URL-encoded form body.
    pub fn from_form(body: &[u8]) -> Result<Self, Error> {
        let mut params = Self::new();
        params.extend_from_form(body)?;
        Ok(params)
    }

    /// Append the pairs of a query string.
    pub fn extend_from_query(&mut self, query: &str) -> Result<(), Error> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| Error::BadRequest(format!("Failed to parse query string: {}", e)))?;
        self.extend(pairs);
        Ok(())
    }

    /// Append the pairs of a URL-encoded form body.
    pub fn extend_from_form(&mut self, body: &[u8]) -> Result<(), Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| Error::BadRequest(format!("Failed to parse form data: {}", e)))?;
        self.extend(pairs);
        Ok(())
    }

    /// Append a single value to a parameter.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Number of distinct parameter names.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> Extend<(K, V)> for RequestParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl ParameterSource for RequestParameters {
    fn parameter(&self, name: &str) -> Option<String> {
        self.values.get(name).and_then(|v| v.first()).cloned()
    }

    fn parameter_values(&self, name: &str) -> Option<Vec<String>> {
        self.values.get(name).cloned()
    }

    fn parameter_map(&self) -> ParameterMap {
        self.values.clone()
    }
}
