//! Multi-target translation over a pluggable backend.
//!
//! - `backend`: the `Backend` trait and `Engine` selection
//! - `google` / `deepl`: one implementation per service
//! - `cache`: bounded LRU memo of results
//!
//! A [`Translator`] is built once per session with the configured engine and
//! owns its cache; [`Translator::translate_all`] fans out over the target
//! languages and cleans up the combined answer.

mod backend;
pub mod cache;
mod deepl;
mod google;

pub use backend::{Backend, Engine, Translation};
pub use cache::{CacheKey, TranslationCache};
pub use deepl::{DeepLBackend, DEFAULT_DEEPL_URL};
pub use google::{GoogleBackend, DEFAULT_GOOGLE_URL};

use crate::config::Config;
use crate::error::TranslateError;
use crate::i18n::LanguageCode;
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info};

/// One translated text.
///
/// `to` always echoes the requested target. `from` is the language the
/// backend detected, or the caller-declared source when nothing usable was
/// detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslateResult {
    pub original: String,
    pub translated: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
}

impl TranslateResult {
    /// Link to the same translation in the Google Translate web UI.
    pub fn google_translate_url(&self) -> String {
        let params = [
            ("sl", self.from.code()),
            ("tl", self.to.code()),
            ("text", self.original.as_str()),
            ("op", "translate"),
        ];
        // The base URL is a constant, parsing cannot fail
        reqwest::Url::parse_with_params("https://translate.google.com/", &params)
            .map(|url| url.to_string())
            .unwrap_or_default()
    }

    /// Web search for the original text.
    pub fn google_search_url(&self) -> String {
        reqwest::Url::parse_with_params("https://google.com/", &[("s", self.original.as_str())])
            .map(|url| url.to_string())
            .unwrap_or_default()
    }

    /// Same language in and out, with nothing changed but case or spacing.
    pub fn is_noop(&self) -> bool {
        self.from == self.to && normalize(&self.original) == normalize(&self.translated)
    }
}

/// Lowercase, trim and collapse inner whitespace for comparisons.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// When `translate_all` drops no-op results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoopFilter {
    /// Only when every result reports the same source language
    #[default]
    SingleSource,
    /// Always, regardless of sibling results
    PerResult,
}

impl FromStr for NoopFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single-source" | "single_source" => Ok(NoopFilter::SingleSource),
            "per-result" | "per_result" => Ok(NoopFilter::PerResult),
            other => anyhow::bail!("Unknown no-op filter policy: '{}'", other),
        }
    }
}

/// Translator bound to one backend, with its own result cache.
pub struct Translator {
    backend: Box<dyn Backend>,
    cache: Mutex<TranslationCache>,
    noop_filter: NoopFilter,
}

impl Translator {
    pub fn new(backend: Box<dyn Backend>, capacity: NonZeroUsize) -> Self {
        Self {
            backend,
            cache: Mutex::new(TranslationCache::new(capacity)),
            noop_filter: NoopFilter::default(),
        }
    }

    pub fn with_noop_filter(mut self, noop_filter: NoopFilter) -> Self {
        self.noop_filter = noop_filter;
        self
    }

    /// Build the translator for the configured engine.
    ///
    /// Fails with `MissingCredential` when DeepL is selected without an API key.
    pub fn from_config(client: reqwest::Client, config: &Config) -> Result<Self, TranslateError> {
        let backend: Box<dyn Backend> = match config.engine {
            Engine::Google => Box::new(GoogleBackend::new(client, &config.google_api_url)),
            Engine::DeepL => Box::new(DeepLBackend::new(
                client,
                &config.deepl_api_url,
                config.deepl_api_key.clone(),
            )?),
        };

        info!(
            "Using {} (cache capacity {})",
            backend.engine(),
            config.cache_capacity
        );

        Ok(Self::new(backend, config.cache_capacity).with_noop_filter(config.noop_filter))
    }

    pub fn engine(&self) -> Engine {
        self.backend.engine()
    }

    fn cached(&self, key: &CacheKey) -> Option<TranslateResult> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let hit = cache.get(key);
        let (hits, misses) = cache.stats();
        debug!(
            "Cache {} for {} -> {} ({} hits, {} misses, {} entries)",
            if hit.is_some() { "hit" } else { "miss" },
            key.from,
            key.to,
            hits,
            misses,
            cache.len()
        );
        hit
    }

    fn remember(&self, key: CacheKey, result: TranslateResult) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .put(key, result);
    }

    /// Translate `text` from `from` (or `auto`) into `to`.
    ///
    /// Empty text returns an empty translation without touching the backend.
    /// Results are memoized by (engine, from, to, text).
    pub async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<TranslateResult, TranslateError> {
        if text.is_empty() {
            return Ok(TranslateResult {
                original: String::new(),
                translated: String::new(),
                from,
                to,
            });
        }

        let key = CacheKey::new(self.engine(), from, to, text);
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let translation = self.backend.translate(text, from, to).await?;

        let result = TranslateResult {
            original: text.to_string(),
            translated: translation.text,
            from: translation.detected.unwrap_or(from),
            to,
        };
        self.remember(key, result.clone());
        Ok(result)
    }

    /// Translate `text` into every target concurrently.
    ///
    /// Results keep the order of `targets`. Empty translations are dropped,
    /// and so are no-ops according to the translator's [`NoopFilter`].
    /// The first failing target fails the whole call.
    pub async fn translate_all(
        &self,
        text: &str,
        from: LanguageCode,
        targets: &[LanguageCode],
    ) -> Result<Vec<TranslateResult>, TranslateError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let results = try_join_all(targets.iter().map(|&to| self.translate(text, from, to))).await?;

        let results: Vec<TranslateResult> = results
            .into_iter()
            .filter(|r| !r.translated.is_empty())
            .collect();

        Ok(drop_noops(results, self.noop_filter))
    }
}

/// Whether every result reports the same source language.
pub fn is_single_source(results: &[TranslateResult]) -> bool {
    results.iter().map(|r| r.from).collect::<HashSet<_>>().len() == 1
}

fn drop_noops(results: Vec<TranslateResult>, policy: NoopFilter) -> Vec<TranslateResult> {
    let applies = match policy {
        NoopFilter::SingleSource => is_single_source(&results),
        NoopFilter::PerResult => true,
    };
    if !applies {
        return results;
    }

    let before = results.len();
    let kept: Vec<TranslateResult> = results.into_iter().filter(|r| !r.is_noop()).collect();
    if kept.len() != before {
        debug!("Dropped {} no-op translation(s)", before - kept.len());
    }
    kept
}
