//! Observability for the query engine
//!
//! - Structured JSON logging to stderr
//! - Monotonic counters
//! - Begin/complete scopes around queries and lookups
//!
//! Observability is read-only: nothing here changes query results.
//!
//! ```ignore
//! use objquery::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! let scope = ObservationScope::with_fields("QUERY", &[("space_id", "space1")]);
//! log_event_with_fields(Event::BatchFetched, &[("size", "500")]);
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, QueryMetrics};
pub use scope::{ObservationScope, Timer};

/// Log an event without fields
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log an event with fields
///
/// Degradation events go out at WARN, everything else at INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_degradation() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event(Event::QueryCancelled);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::StoreLoaded, &[("records", "12")]);
    }
}
