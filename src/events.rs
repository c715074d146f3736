//! Structured search lifecycle events
//!
//! Events are emitted through `tracing` under the `cinesearch::events`
//! target with an `event` field naming the stage. Formatting is left to
//! whichever subscriber the host installs.

/// Target every lifecycle event is emitted under
pub const EVENT_TARGET: &str = "cinesearch::events";

/// Stages of one search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    RequestReceived,
    DescriptorBuilt,
    EngineDispatched,
    ResultShaped,
    SearchFailed,
}

impl SearchEvent {
    pub const ALL: [SearchEvent; 5] = [
        SearchEvent::RequestReceived,
        SearchEvent::DescriptorBuilt,
        SearchEvent::EngineDispatched,
        SearchEvent::ResultShaped,
        SearchEvent::SearchFailed,
    ];

    /// Value of the `event` field
    pub fn name(&self) -> &'static str {
        match self {
            SearchEvent::RequestReceived => "request_received",
            SearchEvent::DescriptorBuilt => "descriptor_built",
            SearchEvent::EngineDispatched => "engine_dispatched",
            SearchEvent::ResultShaped => "result_shaped",
            SearchEvent::SearchFailed => "search_failed",
        }
    }
}
