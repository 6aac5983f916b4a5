//! Event sinks for controller transitions.
//!
//! Every controller operation that changes state emits a
//! [`PipelineEvent`](crate::core::PipelineEvent) to the sink the controller
//! was built with.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
