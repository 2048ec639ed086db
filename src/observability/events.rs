//! Observable events
//!
//! Events are explicit and typed; scope events (`QUERY_BEGIN`, ...) are
//! derived from scope names instead.

use std::fmt;

/// Observable events emitted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Engine configuration loaded
    ConfigLoaded,
    /// Store snapshot loaded
    StoreLoaded,
    /// A filter leaf referenced a relation the store does not know
    FilterRelationUnknown,
    /// A status/tag filter value did not resolve to any option
    FilterOptionUnresolved,
    /// One identifier batch fetched from the store
    BatchFetched,
    /// A synthetic date record passed filters and was spliced in
    SyntheticRecordAdded,
    /// Query aborted by cancellation or deadline
    QueryCancelled,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreLoaded => "STORE_LOADED",
            Event::FilterRelationUnknown => "FILTER_RELATION_UNKNOWN",
            Event::FilterOptionUnresolved => "FILTER_OPTION_UNRESOLVED",
            Event::BatchFetched => "BATCH_FETCHED",
            Event::SyntheticRecordAdded => "SYNTHETIC_RECORD_ADDED",
            Event::QueryCancelled => "QUERY_CANCELLED",
        }
    }

    /// Degradation events are logged at WARN
    pub fn is_degradation(&self) -> bool {
        matches!(
            self,
            Event::FilterRelationUnknown | Event::FilterOptionUnresolved | Event::QueryCancelled
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
