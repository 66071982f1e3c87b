use crate::classifier::classify;
use serde::{Deserialize, Serialize};

/// Outcome of sanitizing one input, as returned to API clients.
///
/// `is_sanitized` is derived from the output alone: the result still carries
/// live markup (literal `<` and `>`) and no encoded brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizationReport {
    pub original: String,
    pub message: String,
    #[serde(rename = "isSanitized")]
    pub is_sanitized: bool,
}

impl SanitizationReport {
    pub fn new(original: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            original: original.into(),
            is_sanitized: was_sanitized(&message),
            message,
        }
    }
}

/// True when `output` looks like cleaned markup rather than encoded text.
pub fn was_sanitized(output: &str) -> bool {
    classify(output).is_html() && !output.contains("&lt;") && !output.contains("&gt;")
}
