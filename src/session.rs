//! Glue between raw input and everything a front end renders for it.

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::diff::DiffRenderer;
use crate::error::TranslateError;
use crate::i18n::LanguageCode;
use crate::query::{parse_query, Query};
use crate::spellcheck::Spellchecker;
use crate::translator::{is_single_source, TranslateResult, Translator};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// "Did you mean" hint for the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub corrected: String,
    /// Rendered diff image, when rendering succeeded
    pub diff_path: Option<PathBuf>,
}

/// Everything shown for one settled input.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub query: Query,
    pub results: Vec<TranslateResult>,
    pub suggestion: Option<Suggestion>,
}

impl View {
    /// Side label of a result: just the target when every result shares
    /// one source, `from -> to` otherwise.
    pub fn accessory(&self, result: &TranslateResult) -> String {
        if is_single_source(&self.results) {
            result.to.to_string()
        } else {
            format!("{} -> {}", result.from, result.to)
        }
    }
}

pub struct Session {
    translator: Translator,
    spellchecker: Spellchecker,
    diff: DiffRenderer,
    debouncer: Debouncer,
    targets: Vec<LanguageCode>,
    selection: Option<String>,
}

impl Session {
    pub fn new(
        translator: Translator,
        spellchecker: Spellchecker,
        diff: DiffRenderer,
        debouncer: Debouncer,
        targets: Vec<LanguageCode>,
    ) -> Self {
        Self {
            translator,
            spellchecker,
            diff,
            debouncer,
            targets,
            selection: None,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Result<Self, TranslateError> {
        Ok(Self::new(
            Translator::from_config(client, config)?,
            Spellchecker::from_options(
                config.spellcheck_bin.clone(),
                config.spellcheck_runtime.clone(),
            ),
            DiffRenderer::new(&config.diff_dir),
            Debouncer::new(config.debounce),
            config.target_languages.clone(),
        ))
    }

    /// Text used when the typed input is blank.
    pub fn with_selection(mut self, selection: Option<String>) -> Self {
        self.selection = selection.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_debouncer(mut self, debouncer: Debouncer) -> Self {
        self.debouncer = debouncer;
        self
    }

    pub fn targets(&self) -> &[LanguageCode] {
        &self.targets
    }

    /// Translate and spellcheck `input` once it settles.
    ///
    /// Returns `Ok(None)` when a newer submission superseded this one, either
    /// while debouncing or while the work was in flight; errors of superseded
    /// submissions are dropped too.
    pub async fn submit(&self, input: &str) -> Result<Option<View>, TranslateError> {
        let query = parse_query(input, self.selection.as_deref());

        let Some(ticket) = self.debouncer.settle().await else {
            return Ok(None);
        };

        let (results, suggestion) = tokio::join!(
            self.translator
                .translate_all(&query.text, query.from, &self.targets),
            self.suggest(&query.text)
        );

        if !ticket.is_current() {
            debug!("Dropping stale results for request {}", ticket.generation());
            return Ok(None);
        }

        Ok(Some(View {
            query,
            results: results?,
            suggestion,
        }))
    }

    async fn suggest(&self, text: &str) -> Option<Suggestion> {
        if text.is_empty() || !self.spellchecker.is_enabled() {
            return None;
        }

        let corrected = self.spellchecker.correct_spelling(text).await;
        if corrected.is_empty() || corrected == text {
            return None;
        }

        let diff_path = match self.diff.get_diff_svg(text, &corrected).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Could not render spelling diff: {:#}", e);
                None
            }
        };

        Some(Suggestion {
            corrected,
            diff_path,
        })
    }
}
