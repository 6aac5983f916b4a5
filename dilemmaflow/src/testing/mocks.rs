//! Mock generation backends for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::backend::GenerationBackend;
use crate::errors::GenerationError;

/// A backend that replays queued answers and records every prompt.
///
/// When the queue is empty it answers `"Generated output {n}"`, where `n`
/// is the 1-based call number.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    queue: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    /// Creates a backend with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that answers with `responses` in order.
    #[must_use]
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        for response in responses {
            backend.push_response(response);
        }
        backend
    }

    /// Queues a successful answer.
    pub fn push_response(&self, response: impl Into<String>) {
        self.queue.lock().push_back(Ok(response.into()));
    }

    /// Queues a failure.
    pub fn push_error(&self, error: GenerationError) {
        self.queue.lock().push_back(Err(error));
    }

    /// Number of `generate` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Every prompt received, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// The most recent prompt.
    #[must_use]
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let call = {
            let mut prompts = self.prompts.lock();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        self.queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Generated output {call}")))
    }
}

/// A backend that always fails with the same error.
#[derive(Debug)]
pub struct FailingBackend {
    error: GenerationError,
    calls: Mutex<usize>,
}

impl FailingBackend {
    /// Creates a backend failing with `error`.
    #[must_use]
    pub fn new(error: GenerationError) -> Self {
        Self {
            error,
            calls: Mutex::new(0),
        }
    }

    /// A backend that answers with no usable text.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(GenerationError::EmptyResponse)
    }

    /// Number of `generate` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl Default for FailingBackend {
    fn default() -> Self {
        Self::new(GenerationError::Request("backend unavailable".to_string()))
    }
}

#[async_trait]
impl GenerationBackend for FailingBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        *self.calls.lock() += 1;
        Err(self.error.clone())
    }
}
