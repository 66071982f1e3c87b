use crate::classifier::{Classification, classify};
use crate::encoder::encode_for_html;
use crate::policy::HtmlPolicy;
use std::borrow::Cow;
use std::sync::Arc;

/// Routes a single value to the allow-list cleaner or the plain encoder.
///
/// Cloning is cheap: the policy is shared, never copied.
#[derive(Debug, Clone)]
pub struct XssSanitizer {
    policy: Arc<HtmlPolicy>,
}

/// Result of sanitizing one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized<'a> {
    pub value: Cow<'a, str>,
    /// `None` when the input was empty and passed through untouched
    pub classification: Option<Classification>,
}

impl XssSanitizer {
    /// Create a sanitizer sharing the given policy
    pub fn new(policy: Arc<HtmlPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Arc<HtmlPolicy> {
        &self.policy
    }

    /// Sanitize one value, reporting which path was taken.
    pub fn sanitize_value<'a>(&self, value: &'a str) -> Sanitized<'a> {
        if value.is_empty() {
            return Sanitized {
                value: Cow::Borrowed(value),
                classification: None,
            };
        }

        let classification = classify(value);
        let value = match classification {
            Classification::Html => Cow::Owned(self.policy.clean(value)),
            Classification::Plain => encode_for_html(value),
        };
        Sanitized {
            value,
            classification: Some(classification),
        }
    }

    /// Clean HTML values with the policy and encode everything else.
    pub fn sanitize<'a>(&self, value: &'a str) -> Cow<'a, str> {
        self.sanitize_value(value).value
    }

    /// Absent values stay absent.
    pub fn sanitize_option(&self, value: Option<&str>) -> Option<String> {
        value.map(|v| self.sanitize(v).into_owned())
    }
}

impl Default for XssSanitizer {
    fn default() -> Self {
        Self::new(HtmlPolicy::shared())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RuleSet;

    #[test]
    fn test_sanitize_script_tag() {
        let sanitizer = XssSanitizer::default();
        let dirty = r#"<p>Hello</p><script>alert('XSS')</script>"#;
        let clean = sanitizer.sanitize(dirty);

        assert!(!clean.contains("script"));
        assert_eq!(clean, "<p>Hello</p>");
    }

    #[test]
    fn test_sanitize_onclick_attribute() {
        let sanitizer = XssSanitizer::default();
        let dirty = "<a href=\"#\" onclick=\"alert('XSS')\">Click</a>";
        let clean = sanitizer.sanitize(dirty);

        assert!(!clean.contains("onclick"));
        assert!(clean.contains("Click"));
    }

    #[test]
    fn test_plain_text_path() {
        let sanitizer = XssSanitizer::default();
        let result = sanitizer.sanitize_value("plain text");

        assert_eq!(result.value, "plain text");
        assert_eq!(result.classification, Some(Classification::Plain));
    }

    #[test]
    fn test_plain_path_encodes() {
        let sanitizer = XssSanitizer::default();
        assert_eq!(sanitizer.sanitize("x < 3 & y"), "x &lt; 3 &amp; y");
        assert_eq!(sanitizer.sanitize("it's"), "it&#39;s");
    }

    #[test]
    fn test_html_path_cleans() {
        let sanitizer = XssSanitizer::default();
        let result = sanitizer.sanitize_value("<b>bold</b><iframe src=x></iframe>");

        assert_eq!(result.value, "<b>bold</b>");
        assert_eq!(result.classification, Some(Classification::Html));
    }

    #[test]
    fn test_empty_and_absent_pass_through() {
        let sanitizer = XssSanitizer::default();
        let result = sanitizer.sanitize_value("");

        assert_eq!(result.value, "");
        assert_eq!(result.classification, None);
        assert_eq!(sanitizer.sanitize_option(None), None);
        assert_eq!(sanitizer.sanitize_option(Some("")), Some(String::new()));
    }

    #[test]
    fn test_custom_policy() {
        let strict = XssSanitizer::new(Arc::new(HtmlPolicy::from_rule_sets([RuleSet::Formatting])));
        let clean = strict.sanitize(r#"<div><p><strong>Bold</strong></p></div>"#);

        assert!(!clean.contains("<div>"));
        assert_eq!(clean, "<strong>Bold</strong>");
    }

    #[test]
    fn test_clones_share_policy() {
        let sanitizer = XssSanitizer::default();
        let clone = sanitizer.clone();

        assert!(Arc::ptr_eq(sanitizer.policy(), clone.policy()));
    }
}
