use crate::error::TranslateError;
use crate::i18n::LanguageCode;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Which translation service backs a [`Translator`](super::Translator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    Google,
    DeepL,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Google => f.write_str("Google Translate"),
            Engine::DeepL => f.write_str("DeepL"),
        }
    }
}

impl FromStr for Engine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Engine::Google),
            "deepl" => Ok(Engine::DeepL),
            other => anyhow::bail!("Unknown translation engine: '{}'", other),
        }
    }
}

/// Raw answer from a backend, before it becomes a `TranslateResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Source language reported by the service, if it maps to a known code
    pub detected: Option<LanguageCode>,
}

/// A translation service.
///
/// Implementations own their language-code quirks: callers always pass
/// registry codes and get registry codes back.
#[async_trait]
pub trait Backend: Send + Sync {
    fn engine(&self) -> Engine;

    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError>;
}
