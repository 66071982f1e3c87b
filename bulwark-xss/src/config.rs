//! Filter configuration.
//!
//! Loaded from TOML, from `BULWARK_XSS_*` environment variables, or built in
//! code:
//!
//! ```rust
//! use bulwark_xss::{RuleSet, XssConfig};
//!
//! let config = XssConfig::from_toml_str(r#"
//!     rule_sets = ["formatting", "links"]
//!     exclude_paths = ["/webhooks"]
//! "#).unwrap();
//!
//! assert_eq!(config.rule_sets, vec![RuleSet::Formatting, RuleSet::Links]);
//! assert!(config.enabled);
//! ```

use crate::error::{Result, XssError};
use crate::policy::{HtmlPolicy, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Prefix for environment variables read by [`XssConfig::from_env`].
pub const ENV_PREFIX: &str = "BULWARK_XSS_";

/// XSS filter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XssConfig {
    /// Wrap request parameters at all
    pub enabled: bool,

    /// Named rule sets composed into the HTML policy
    pub rule_sets: Vec<RuleSet>,

    /// Path prefixes passed through without sanitization
    pub exclude_paths: Vec<String>,

    /// Debug-log raw parameters that contain `<` or `>`
    pub log_suspicious_parameters: bool,

    /// Include original and sanitized values in per-value log events
    pub log_values: bool,

    /// Add `X-XSS-Protection` and `X-Content-Type-Options` to responses
    pub protection_headers: bool,
}

impl XssConfig {
    pub fn new() -> Self {
        Self {
            enabled: true,
            rule_sets: RuleSet::ALL.to_vec(),
            exclude_paths: Vec::new(),
            log_suspicious_parameters: false,
            log_values: false,
            protection_headers: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_rule_sets(mut self, sets: impl IntoIterator<Item = RuleSet>) -> Self {
        self.rule_sets = sets.into_iter().collect();
        self
    }

    pub fn with_exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.exclude_paths = paths;
        self
    }

    pub fn with_suspicious_parameter_logging(mut self, enable: bool) -> Self {
        self.log_suspicious_parameters = enable;
        self
    }

    pub fn with_value_logging(mut self, enable: bool) -> Self {
        self.log_values = enable;
        self
    }

    pub fn with_protection_headers(mut self, enable: bool) -> Self {
        self.protection_headers = enable;
        self
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Read `BULWARK_XSS_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load a `.env` file into the environment first, then read it.
    ///
    /// With no path, a `.env` in the current directory is used if present.
    pub fn from_dotenv(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            dotenvy::from_path(path)
                .map_err(|e| XssError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        } else {
            dotenvy::dotenv().ok();
        }
        Self::from_env()
    }

    /// Apply `BULWARK_XSS_*` pairs on top of the defaults. Other keys are
    /// ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::new();
        for (key, value) in vars {
            let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match field {
                "ENABLED" => config.enabled = parse_bool(field, value)?,
                "RULE_SETS" => {
                    config.rule_sets = split_list(value)
                        .map(|name| name.parse::<RuleSet>().map_err(XssError::Config))
                        .collect::<Result<_>>()?;
                }
                "EXCLUDE_PATHS" => config.exclude_paths = split_list(value).map(String::from).collect(),
                "LOG_SUSPICIOUS_PARAMETERS" => {
                    config.log_suspicious_parameters = parse_bool(field, value)?
                }
                "LOG_VALUES" => config.log_values = parse_bool(field, value)?,
                "PROTECTION_HEADERS" => config.protection_headers = parse_bool(field, value)?,
                _ => {}
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot describe a working filter.
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = self.exclude_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(XssError::config(format!(
                "exclude path '{}' must start with '/'",
                path
            )));
        }
        Ok(())
    }

    /// The HTML policy named by `rule_sets`. Naming every rule set yields
    /// the process-wide [`HtmlPolicy::shared`] instance.
    pub fn build_policy(&self) -> Arc<HtmlPolicy> {
        let wanted: BTreeSet<RuleSet> = self.rule_sets.iter().copied().collect();
        if wanted.len() == RuleSet::ALL.len() {
            return HtmlPolicy::shared();
        }
        Arc::new(HtmlPolicy::from_rule_sets(wanted))
    }
}

impl Default for XssConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(XssError::config(format!(
            "{}{} expects a boolean, got '{}'",
            ENV_PREFIX, field, value
        ))),
    }
}
