use super::{Backend, Engine, Translation};
use crate::error::TranslateError;
use crate::i18n::LanguageCode;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub const DEFAULT_DEEPL_URL: &str = "https://api-free.deepl.com";

/// DeepL answers 456 when the character quota is used up.
const QUOTA_EXCEEDED: u16 = 456;

#[derive(Debug, Deserialize)]
struct SupportedLanguage {
    language: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum LanguageKind {
    Source,
    Target,
}

impl LanguageKind {
    fn as_query(&self) -> &'static str {
        match self {
            LanguageKind::Source => "source",
            LanguageKind::Target => "target",
        }
    }
}

/// DeepL REST API. Needs an authentication key.
///
/// The supported source and target language lists are fetched on first use
/// and kept for the lifetime of the backend.
pub struct DeepLBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    source_languages: OnceCell<HashSet<String>>,
    target_languages: OnceCell<HashSet<String>>,
}

/// DeepL source codes are the bare uppercase language (`ZH`, `PT`).
fn to_deepl_source(lang: LanguageCode) -> String {
    lang.code()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

/// DeepL targets require a regional variant for a few languages.
fn to_deepl_target(lang: LanguageCode) -> String {
    match lang.code() {
        "en" => "EN-US".to_string(),
        "pt" => "PT-BR".to_string(),
        "zh-CN" => "ZH-HANS".to_string(),
        "zh-TW" => "ZH-HANT".to_string(),
        code => code.to_ascii_uppercase(),
    }
}

fn from_deepl_code(code: &str) -> Option<LanguageCode> {
    match code.to_ascii_uppercase().as_str() {
        "ZH" | "ZH-HANS" => LanguageCode::from_code("zh-CN").ok(),
        "ZH-HANT" => LanguageCode::from_code("zh-TW").ok(),
        other => LanguageCode::from_code(other.split('-').next().unwrap_or(other)).ok(),
    }
}

/// Map a non-success status to the matching error kind, passing successes through.
async fn check_status(response: Response) -> Result<Response, TranslateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == QUOTA_EXCEEDED {
        return Err(TranslateError::RateLimited {
            engine: Engine::DeepL,
        });
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
    let reason = if status == StatusCode::FORBIDDEN {
        format!("authorization failed, check the API key ({})", status)
    } else {
        format!("{}: {}", status, body)
    };
    Err(TranslateError::BackendUnavailable {
        engine: Engine::DeepL,
        reason,
    })
}

fn unavailable(e: reqwest::Error) -> TranslateError {
    TranslateError::BackendUnavailable {
        engine: Engine::DeepL,
        reason: e.to_string(),
    }
}

fn invalid(e: reqwest::Error) -> TranslateError {
    TranslateError::InvalidResponse {
        engine: Engine::DeepL,
        reason: e.to_string(),
    }
}

impl DeepLBackend {
    /// Fails with `MissingCredential` when no (non-blank) key is given.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, TranslateError> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(TranslateError::MissingCredential {
                engine: Engine::DeepL,
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            source_languages: OnceCell::new(),
            target_languages: OnceCell::new(),
        })
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    async fn fetch_languages(&self, kind: LanguageKind) -> Result<HashSet<String>, TranslateError> {
        let response = self
            .client
            .get(format!("{}/v2/languages", self.base_url))
            .query(&[("type", kind.as_query())])
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(unavailable)?;

        let languages: Vec<SupportedLanguage> =
            check_status(response).await?.json().await.map_err(invalid)?;

        info!(
            "DeepL supports {} {} languages",
            languages.len(),
            kind.as_query()
        );

        Ok(languages
            .into_iter()
            .map(|l| l.language.to_ascii_uppercase())
            .collect())
    }

    async fn supported(&self, kind: LanguageKind) -> Result<&HashSet<String>, TranslateError> {
        let cell = match kind {
            LanguageKind::Source => &self.source_languages,
            LanguageKind::Target => &self.target_languages,
        };
        cell.get_or_try_init(|| self.fetch_languages(kind)).await
    }

    /// Reject pairs DeepL cannot handle before spending a translate request.
    async fn ensure_supported(
        &self,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<(), TranslateError> {
        let unsupported = || TranslateError::UnsupportedLanguage {
            engine: Engine::DeepL,
            from: from.code().to_string(),
            to: to.code().to_string(),
        };

        if !from.is_auto()
            && !self
                .supported(LanguageKind::Source)
                .await?
                .contains(&to_deepl_source(from))
        {
            return Err(unsupported());
        }

        let targets = self.supported(LanguageKind::Target).await?;
        let target = to_deepl_target(to);
        // Older accounts still list the bare code (e.g. "EN") next to or instead of variants
        if !targets.contains(&target) && !targets.contains(&to_deepl_source(to)) {
            return Err(unsupported());
        }

        Ok(())
    }
}

#[async_trait]
impl Backend for DeepLBackend {
    fn engine(&self) -> Engine {
        Engine::DeepL
    }

    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError> {
        self.ensure_supported(from, to).await?;

        debug!("DeepL: translating {} chars {} -> {}", text.len(), from, to);

        let mut form: Vec<(&str, String)> =
            vec![("text", text.to_string()), ("target_lang", to_deepl_target(to))];
        if !from.is_auto() {
            form.push(("source_lang", to_deepl_source(from)));
        }

        let response = self
            .client
            .post(format!("{}/v2/translate", self.base_url))
            .header("Authorization", self.auth_header())
            .form(&form)
            .send()
            .await
            .map_err(unavailable)?;

        let body: TranslateResponse = check_status(response).await?.json().await.map_err(invalid)?;

        let first = body
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| TranslateError::InvalidResponse {
                engine: Engine::DeepL,
                reason: "response contained no translations".to_string(),
            })?;

        Ok(Translation {
            text: first.text,
            detected: first
                .detected_source_language
                .as_deref()
                .and_then(from_deepl_code),
        })
    }
}
