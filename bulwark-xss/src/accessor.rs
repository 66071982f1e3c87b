//! Sanitizing view over a request's parameters.

use crate::observer::{NoopObserver, SanitizeEvent, SanitizeObserver};
use crate::sanitizer::XssSanitizer;
use bulwark_core::{ParameterMap, ParameterSource};
use std::fmt;
use std::sync::Arc;

/// [`ParameterSource`] adapter that sanitizes every value it hands out.
///
/// Nothing is cached: each read goes back to the raw source and re-derives
/// the sanitized value. The raw source is never written to.
#[derive(Clone)]
pub struct SanitizingParameters {
    source: Arc<dyn ParameterSource>,
    sanitizer: XssSanitizer,
    observer: Arc<dyn SanitizeObserver>,
}

impl SanitizingParameters {
    pub fn new(source: Arc<dyn ParameterSource>, sanitizer: XssSanitizer) -> Self {
        Self {
            source,
            sanitizer,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report each sanitized value to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn SanitizeObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The unsanitized source being wrapped.
    pub fn raw(&self) -> &Arc<dyn ParameterSource> {
        &self.source
    }

    pub fn sanitizer(&self) -> &XssSanitizer {
        &self.sanitizer
    }

    fn sanitize(&self, name: &str, raw: &str) -> String {
        let result = self.sanitizer.sanitize_value(raw);
        if let Some(classification) = result.classification {
            self.observer.on_sanitized(&SanitizeEvent {
                parameter: name,
                classification,
                original: raw,
                sanitized: &result.value,
            });
        }
        result.value.into_owned()
    }

    fn sanitize_all(&self, name: &str, values: Vec<String>) -> Vec<String> {
        values.iter().map(|v| self.sanitize(name, v)).collect()
    }
}

impl ParameterSource for SanitizingParameters {
    fn parameter(&self, name: &str) -> Option<String> {
        self.source
            .parameter(name)
            .map(|raw| self.sanitize(name, &raw))
    }

    fn parameter_values(&self, name: &str) -> Option<Vec<String>> {
        self.source
            .parameter_values(name)
            .map(|values| self.sanitize_all(name, values))
    }

    fn parameter_map(&self) -> ParameterMap {
        self.source
            .parameter_map()
            .into_iter()
            .map(|(name, values)| {
                let values = self.sanitize_all(&name, values);
                (name, values)
            })
            .collect()
    }

    fn raw_parameter(&self, name: &str) -> Option<String> {
        self.source.raw_parameter(name)
    }
}

impl fmt::Debug for SanitizingParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizingParameters")
            .field("sanitizer", &self.sanitizer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classification;
    use bulwark_core::RequestParameters;
    use std::sync::Mutex;

    fn wrap(pairs: &[(&str, &str)]) -> SanitizingParameters {
        let raw: RequestParameters = pairs.iter().copied().collect();
        SanitizingParameters::new(Arc::new(raw), XssSanitizer::default())
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, Classification)>>);

    impl SanitizeObserver for Recorder {
        fn on_sanitized(&self, event: &SanitizeEvent<'_>) {
            self.0
                .lock()
                .unwrap()
                .push((event.parameter.to_string(), event.classification));
        }
    }

    #[test]
    fn test_single_value() {
        let params = wrap(&[("comment", "<b>hi</b><script>x()</script>"), ("q", "a&b")]);

        assert_eq!(params.parameter("comment").as_deref(), Some("<b>hi</b>"));
        assert_eq!(params.parameter("q").as_deref(), Some("a&amp;b"));
        assert_eq!(params.parameter("missing"), None);
    }

    #[test]
    fn test_multi_value_preserves_order_and_count() {
        let params = wrap(&[("tag", "<i>one</i>"), ("tag", "two"), ("tag", ""), ("tag", "x>y")]);
        let values = params.parameter_values("tag").unwrap();

        assert_eq!(values, vec!["<i>one</i>", "two", "", "x&gt;y"]);
        assert_eq!(params.parameter_values("missing"), None);
    }

    #[test]
    fn test_map_preserves_keys() {
        let params = wrap(&[("a", "<script>1</script>"), ("b", "ok"), ("b", "<u>x</u>")]);
        let raw = params.raw().parameter_map();
        let map = params.parameter_map();

        assert_eq!(map.len(), raw.len());
        assert_eq!(map["a"], vec![""]);
        assert_eq!(map["b"], vec!["ok", "<u>x</u>"]);
    }

    #[test]
    fn test_raw_source_untouched() {
        let params = wrap(&[("a", "<script>1</script>")]);
        let _ = params.parameter_map();

        assert_eq!(
            params.raw().parameter("a").as_deref(),
            Some("<script>1</script>")
        );
    }

    #[test]
    fn test_raw_parameter_bypasses_sanitizing() {
        let params = wrap(&[("a", "<b>x</b><script>1</script>")]);

        assert_eq!(params.parameter("a").as_deref(), Some("<b>x</b>"));
        assert_eq!(
            params.raw_parameter("a").as_deref(),
            Some("<b>x</b><script>1</script>")
        );
        assert_eq!(params.raw_parameter("missing"), None);
    }

    #[test]
    fn test_observer_sees_each_value() {
        let recorder = Arc::new(Recorder::default());
        let params = wrap(&[("h", "<b>x</b>"), ("p", "plain"), ("e", "")])
            .with_observer(recorder.clone());

        params.parameter("h");
        params.parameter("p");
        params.parameter("e");

        let events = recorder.0.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                ("h".to_string(), Classification::Html),
                ("p".to_string(), Classification::Plain),
            ]
        );
    }

    #[test]
    fn test_no_caching() {
        let recorder = Arc::new(Recorder::default());
        let params = wrap(&[("q", "x")]).with_observer(recorder.clone());

        params.parameter("q");
        params.parameter("q");

        assert_eq!(recorder.0.lock().unwrap().len(), 2);
    }
}
