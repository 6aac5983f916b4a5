//! Utility functions for identifiers and timestamps.

pub mod timestamps;

pub use timestamps::{format_iso8601, iso_timestamp, now_utc, Timestamp};

use uuid::Uuid;

/// Generates a new UUID v4.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uuid_is_valid() {
        let id = generate_uuid();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.contains(':'));
    }
}
