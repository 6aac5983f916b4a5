//! Test assertions for pipeline state.

use crate::core::StageRecord;
use crate::events::CollectingEventSink;
use crate::state::PipelineState;

/// Asserts that the log holds `cursor` or `cursor + 1` records.
pub fn assert_log_cursor_coupling(state: &PipelineState) {
    let (len, cursor) = (state.log().len(), state.cursor());
    assert!(
        len == cursor || len == cursor + 1,
        "log length {len} is not coupled to cursor {cursor}"
    );
}

/// Asserts that the log's stage names match `catalog_names` in order.
pub fn assert_log_in_catalog_order(state: &PipelineState, catalog_names: &[&str]) {
    let logged: Vec<&str> = state.log().iter().map(StageRecord::stage_name).collect();
    assert!(
        logged.len() <= catalog_names.len() && logged == catalog_names[..logged.len()],
        "log {logged:?} is not a prefix of the catalog {catalog_names:?}"
    );
}

/// Asserts the record at `position` has the given stage name and response.
pub fn assert_record(state: &PipelineState, position: usize, stage_name: &str, response: &str) {
    let record = state
        .record(position)
        .unwrap_or_else(|| panic!("no record at position {position}; log has {}", state.log().len()));
    assert_eq!(record.stage_name(), stage_name, "stage name at position {position}");
    assert_eq!(record.response(), response, "response at position {position}");
}

/// Asserts the sink received exactly `expected` event types, in order.
pub fn assert_event_types(sink: &CollectingEventSink, expected: &[&str]) {
    let actual = sink.event_types();
    assert_eq!(actual, expected, "Expected events {expected:?}, got {actual:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupling_holds_for_fresh_state() {
        let state = PipelineState::new();
        assert_log_cursor_coupling(&state);
        assert_log_in_catalog_order(&state, &["Input", "A"]);
    }

    #[test]
    #[should_panic(expected = "no record at position 0")]
    fn test_assert_record_missing() {
        assert_record(&PipelineState::new(), 0, "Input", "");
    }
}
