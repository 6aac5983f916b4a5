//! Event sink trait and implementations.

use crate::core::PipelineEvent;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, Level};

/// Trait for sinks that receive controller events.
///
/// A sink is handed to each controller at construction; there is no
/// process-wide default.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event: &PipelineEvent);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &PipelineEvent) {}
}

/// A sink that writes events through `tracing`.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a logging sink at the given level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log_event(&self, event: &PipelineEvent) {
        let data = event.data_value();
        if self.level == Level::DEBUG {
            debug!(
                event_type = %event.event_type,
                event_data = %data,
                "Event: {}", event.event_type
            );
        } else {
            info!(
                event_type = %event.event_type,
                event_data = %data,
                "Event: {}", event.event_type
            );
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &PipelineEvent) {
        self.log_event(event);
    }
}

/// A sink that keeps every event in memory.
///
/// Backs the test harness, which asserts on the recorded event order.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<PipelineEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.read().clone()
    }

    /// Returns the event types in emission order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .map(|event| event.event_type.clone())
            .collect()
    }

    /// Number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Drops all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events whose type starts with `type_prefix`.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<PipelineEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.event_type.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &PipelineEvent) {
        self.events.write().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpEventSink;
        sink.emit(&PipelineEvent::branch_cleared()).await;
        sink.emit(&PipelineEvent::completed(3)).await;
    }

    #[tokio::test]
    async fn test_logging_sink() {
        let sink = LoggingEventSink::debug();
        sink.emit(&PipelineEvent::generated("A", 1.5, 40)).await;
        LoggingEventSink::info().emit(&PipelineEvent::branch_cleared()).await;
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(&PipelineEvent::input_submitted("Input", 12)).await;
        sink.emit(&PipelineEvent::approved("Input", Some("A"))).await;

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.event_types(), vec!["input.submitted", "stage.approved"]);
    }

    #[tokio::test]
    async fn test_collecting_sink_filter_and_clear() {
        let sink = CollectingEventSink::new();
        sink.emit(&PipelineEvent::generated("A", 1.0, 10)).await;
        sink.emit(&PipelineEvent::approved("A", None)).await;
        sink.emit(&PipelineEvent::branch_cleared()).await;

        assert_eq!(sink.events_of_type("stage.").len(), 2);
        assert_eq!(sink.events_of_type("branch.").len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
