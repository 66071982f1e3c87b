//! Side channel for per-value sanitization events.
//!
//! The sanitizer itself never logs; the accessor reports each transformed
//! value to a [`SanitizeObserver`] instead.

use crate::classifier::Classification;
use tracing::debug;

/// One value passing through the accessor.
#[derive(Debug, Clone, Copy)]
pub struct SanitizeEvent<'a> {
    pub parameter: &'a str,
    pub classification: Classification,
    pub original: &'a str,
    pub sanitized: &'a str,
}

impl SanitizeEvent<'_> {
    pub fn changed(&self) -> bool {
        self.original != self.sanitized
    }
}

pub trait SanitizeObserver: Send + Sync {
    fn on_sanitized(&self, event: &SanitizeEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SanitizeObserver for NoopObserver {
    fn on_sanitized(&self, _event: &SanitizeEvent<'_>) {}
}

/// Emits a `debug` event per value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver {
    include_values: bool,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record the original and sanitized values. Raw values can hold
    /// personal data, so this is off by default.
    pub fn with_values(mut self, include: bool) -> Self {
        self.include_values = include;
        self
    }
}

impl SanitizeObserver for TracingObserver {
    fn on_sanitized(&self, event: &SanitizeEvent<'_>) {
        if self.include_values {
            debug!(
                parameter = %event.parameter,
                classification = ?event.classification,
                changed = event.changed(),
                original = %event.original,
                sanitized = %event.sanitized,
                "Sanitized request parameter"
            );
        } else {
            debug!(
                parameter = %event.parameter,
                classification = ?event.classification,
                changed = event.changed(),
                "Sanitized request parameter"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_changed() {
        let event = SanitizeEvent {
            parameter: "q",
            classification: Classification::Plain,
            original: "a&b",
            sanitized: "a&amp;b",
        };
        assert!(event.changed());

        let same = SanitizeEvent {
            sanitized: "a&b",
            ..event
        };
        assert!(!same.changed());
    }

    #[test]
    fn test_observers_accept_events() {
        let event = SanitizeEvent {
            parameter: "q",
            classification: Classification::Html,
            original: "<b>x</b>",
            sanitized: "<b>x</b>",
        };

        NoopObserver.on_sanitized(&event);
        TracingObserver::new().on_sanitized(&event);
        TracingObserver::new().with_values(true).on_sanitized(&event);
    }
}
