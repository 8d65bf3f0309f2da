use crate::i18n::LanguageCode;
use crate::translator::cache::DEFAULT_CAPACITY;
use crate::translator::{Engine, NoopFilter, DEFAULT_DEEPL_URL, DEFAULT_GOOGLE_URL};
use anyhow::{bail, Context, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// Number of target language slots (`TRANSLATE_LANG1` .. `TRANSLATE_LANG5`).
pub const LANGUAGE_SLOTS: usize = 5;

/// User options, read once per session.
#[derive(Debug, Clone)]
pub struct Config {
    // Translation engine
    pub engine: Engine,
    pub deepl_api_key: Option<String>,
    pub google_api_url: String,
    pub deepl_api_url: String,

    // Languages
    pub target_languages: Vec<LanguageCode>,

    // Input
    pub use_system_selection: bool,
    pub debounce: Duration,

    // Translation results
    pub cache_capacity: NonZeroUsize,
    pub noop_filter: NoopFilter,

    // Spellcheck
    pub spellcheck_bin: Option<PathBuf>,
    pub spellcheck_runtime: Option<String>,
    pub diff_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let slots: Vec<Option<String>> = (1..=LANGUAGE_SLOTS)
            .map(|i| std::env::var(format!("TRANSLATE_LANG{}", i)).ok())
            .collect();
        let slots = if slots.iter().all(Option::is_none) {
            vec![Some("en".to_string()), Some("es".to_string())]
        } else {
            slots
        };

        let cache_capacity = std::env::var("CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::new(DEFAULT_CAPACITY).context("cache capacity must be non-zero")?);

        Ok(Self {
            // Engine
            engine: std::env::var("TRANSLATE_ENGINE")
                .ok()
                .map(|v| v.parse::<Engine>())
                .transpose()
                .context("TRANSLATE_ENGINE must be 'google' or 'deepl'")?
                .unwrap_or(Engine::Google),
            deepl_api_key: std::env::var("DEEPL_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            google_api_url: std::env::var("GOOGLE_TRANSLATE_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_URL.to_string()),
            deepl_api_url: std::env::var("DEEPL_API_URL")
                .unwrap_or_else(|_| DEFAULT_DEEPL_URL.to_string()),

            // Languages
            target_languages: parse_target_languages(&slots)?,

            // Input
            use_system_selection: std::env::var("GET_SYSTEM_SELECTION")
                .ok()
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            debounce: Duration::from_millis(
                std::env::var("DEBOUNCE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500),
            ),

            // Results
            cache_capacity,
            noop_filter: std::env::var("NOOP_FILTER")
                .ok()
                .map(|v| v.parse::<NoopFilter>())
                .transpose()?
                .unwrap_or_default(),

            // Spellcheck
            spellcheck_bin: std::env::var("SPELLCHECK_BIN")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            spellcheck_runtime: std::env::var("SPELLCHECK_RUNTIME")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            diff_dir: std::env::var("DIFF_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("multi-translate-diff")),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Turn the language slots into the ordered target list.
///
/// Empty slots, `none` and `auto` are skipped; duplicates keep their first
/// position. Unknown codes are a configuration error.
pub fn parse_target_languages(slots: &[Option<String>]) -> Result<Vec<LanguageCode>> {
    let mut languages: Vec<LanguageCode> = Vec::new();

    for value in slots.iter().flatten() {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("auto") {
            continue;
        }
        let lang = LanguageCode::from_code(value)
            .with_context(|| format!("Invalid target language '{}'", value))?;
        if !languages.contains(&lang) {
            languages.push(lang);
        }
    }

    if languages.is_empty() {
        bail!("At least one target language must be configured (TRANSLATE_LANG1..TRANSLATE_LANG5)");
    }

    Ok(languages)
}
