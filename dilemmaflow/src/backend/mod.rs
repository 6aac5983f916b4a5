//! Text generation backends.
//!
//! The controller talks to a model only through [`GenerationBackend`]. A
//! backend answers one prompt with one block of text; it knows nothing about
//! stages or sessions.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiBackend;

use crate::errors::GenerationError;
use async_trait::async_trait;

/// A prompt-in, text-out generation service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generates text for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] when the service cannot be reached,
    /// rejects the request, or answers without usable text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Normalizes a backend answer: blank text counts as no text.
pub(crate) fn usable_text(result: Result<String, GenerationError>) -> Result<String, GenerationError> {
    match result {
        Ok(text) if text.trim().is_empty() => Err(GenerationError::EmptyResponse),
        other => other,
    }
}
