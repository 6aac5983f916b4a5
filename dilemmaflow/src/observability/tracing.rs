//! Tracing subscriber setup and span timing.

use std::sync::Once;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Filter used when neither `RUST_LOG` nor an explicit directive is given.
pub const DEFAULT_LOG_FILTER: &str = "dilemmaflow=info";

/// Installs the global tracing subscriber.
///
/// `filter` takes `EnvFilter` directive syntax; an invalid directive falls
/// back to [`DEFAULT_LOG_FILTER`]. With `json` set, events are written as
/// JSON lines. Calling this more than once is a no-op, and an already
/// installed subscriber from elsewhere is left in place.
pub fn init_tracing(filter: &str, json: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let result = if json {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_target(true))
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(filter)
                .try_init()
        };

        if let Err(error) = result {
            tracing::debug!(%error, "tracing subscriber already installed");
        }
    });
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}
