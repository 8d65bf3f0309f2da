use crate::translator::Engine;
use thiserror::Error;

/// Errors surfaced by translation calls.
///
/// None of these are retried automatically; the caller shows them and the
/// user re-triggers the input to try again.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Too many requests: please try again later")]
    RateLimited { engine: Engine },

    #[error("{engine} is unavailable: {reason}")]
    BackendUnavailable { engine: Engine, reason: String },

    #[error("{engine} does not support translating {from} -> {to}")]
    UnsupportedLanguage {
        engine: Engine,
        from: String,
        to: String,
    },

    #[error("{engine} requires an API key")]
    MissingCredential { engine: Engine },

    #[error("Unexpected response from {engine}: {reason}")]
    InvalidResponse { engine: Engine, reason: String },

    #[error("Unknown language code: '{0}'")]
    UnknownLanguage(String),
}

impl TranslateError {
    /// Short title for a transient notification ("Could not translate" style toasts).
    pub fn title(&self) -> &'static str {
        match self {
            TranslateError::RateLimited { .. } => "Too many requests",
            TranslateError::BackendUnavailable { .. } => "Translation service unavailable",
            TranslateError::UnsupportedLanguage { .. } => "Unsupported language",
            TranslateError::MissingCredential { .. } => "Missing API key",
            TranslateError::InvalidResponse { .. } => "Could not translate",
            TranslateError::UnknownLanguage(_) => "Unknown language",
        }
    }
}
