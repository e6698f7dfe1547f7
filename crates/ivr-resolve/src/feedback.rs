//! Learning-feedback sink for resolution outcomes.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use ivr_model::FieldMappingSet;

/// Fire-and-forget sink recording whether a resolved mapping led to a
/// successful submission. Implementations must never block or fail the
/// caller; a lost event is acceptable, a stalled resolution is not.
pub trait FeedbackSink: Send + Sync {
    fn record_outcome(
        &self,
        manufacturer: &str,
        mappings: &FieldMappingSet,
        submission_succeeded: bool,
    );
}

impl<S: FeedbackSink + ?Sized> FeedbackSink for std::sync::Arc<S> {
    fn record_outcome(
        &self,
        manufacturer: &str,
        mappings: &FieldMappingSet,
        submission_succeeded: bool,
    ) {
        (**self).record_outcome(manufacturer, mappings, submission_succeeded);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl FeedbackSink for NoopFeedback {
    fn record_outcome(
        &self,
        _manufacturer: &str,
        _mappings: &FieldMappingSet,
        _submission_succeeded: bool,
    ) {
    }
}

/// One recorded feedback event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub manufacturer: String,
    pub target_fields: Vec<String>,
    pub submission_succeeded: bool,
    pub recorded_at: DateTime<Utc>,
}

/// In-memory sink, mainly for tests and local inspection. Only target
/// field names are retained, never resolved values.
#[derive(Debug, Default)]
pub struct MemoryFeedback {
    events: Mutex<Vec<FeedbackEvent>>,
}

impl MemoryFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.lock().expect("feedback lock poisoned").clone()
    }
}

impl FeedbackSink for MemoryFeedback {
    fn record_outcome(
        &self,
        manufacturer: &str,
        mappings: &FieldMappingSet,
        submission_succeeded: bool,
    ) {
        let event = FeedbackEvent {
            manufacturer: manufacturer.to_string(),
            target_fields: mappings.keys().cloned().collect(),
            submission_succeeded,
            recorded_at: Utc::now(),
        };
        self.events
            .lock()
            .expect("feedback lock poisoned")
            .push(event);
    }
}
