use super::{Backend, Engine, Translation};
use crate::error::TranslateError;
use crate::i18n::LanguageCode;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

pub const DEFAULT_GOOGLE_URL: &str = "https://translate.googleapis.com";

/// Google Translate through the keyless `gtx` web endpoint.
pub struct GoogleBackend {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Google still uses a few legacy ISO 639 codes.
fn to_google_code(lang: LanguageCode) -> &'static str {
    match lang.code() {
        "he" => "iw",
        "jv" => "jw",
        code => code,
    }
}

fn from_google_code(code: &str) -> Option<LanguageCode> {
    let code = match code {
        "iw" => "he",
        "jw" => "jv",
        other => other,
    };
    LanguageCode::from_code(code).ok()
}

/// Parse the nested array answer: `[[["hola","hello",..],..], null, "en", ..]`
fn parse_response(json: &serde_json::Value) -> Result<Translation, TranslateError> {
    let root = json.as_array().ok_or_else(|| TranslateError::InvalidResponse {
        engine: Engine::Google,
        reason: "expected a JSON array".to_string(),
    })?;

    let mut text = String::new();
    if let Some(sentences) = root.first().and_then(|v| v.as_array()) {
        for sentence in sentences {
            if let Some(segment) = sentence.get(0).and_then(|v| v.as_str()) {
                text.push_str(segment);
            }
        }
    }

    let detected = root
        .get(2)
        .and_then(|v| v.as_str())
        .and_then(from_google_code);

    Ok(Translation { text, detected })
}

#[async_trait]
impl Backend for GoogleBackend {
    fn engine(&self) -> Engine {
        Engine::Google
    }

    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError> {
        debug!("Google: translating {} chars {} -> {}", text.len(), from, to);

        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", to_google_code(from)),
                ("tl", to_google_code(to)),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslateError::BackendUnavailable {
                engine: Engine::Google,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslateError::RateLimited {
                engine: Engine::Google,
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslateError::BackendUnavailable {
                engine: Engine::Google,
                reason: format!("{}: {}", status, body),
            });
        }

        let json: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| TranslateError::InvalidResponse {
                    engine: Engine::Google,
                    reason: e.to_string(),
                })?;

        parse_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn google_response(segments: &[&str], detected: &str) -> serde_json::Value {
        let sentences: Vec<serde_json::Value> = segments
            .iter()
            .map(|s| serde_json::json!([s, "source", null, null, 10]))
            .collect();
        serde_json::json!([sentences, null, detected])
    }

    // ==================== Code Mapping Tests ====================

    #[test]
    fn test_legacy_codes_are_remapped() {
        let hebrew = LanguageCode::from_code("he").unwrap();
        let javanese = LanguageCode::from_code("jv").unwrap();
        assert_eq!(to_google_code(hebrew), "iw");
        assert_eq!(to_google_code(javanese), "jw");
        assert_eq!(to_google_code(LanguageCode::SPANISH), "es");
    }

    #[test]
    fn test_detected_legacy_codes_map_back() {
        assert_eq!(from_google_code("iw").unwrap().code(), "he");
        assert_eq!(from_google_code("jw").unwrap().code(), "jv");
        assert_eq!(from_google_code("zh-CN").unwrap().code(), "zh-CN");
        assert!(from_google_code("xx").is_none());
    }

    // ==================== Response Parsing Tests ====================

    #[test]
    fn test_parse_joins_segments() {
        let json = google_response(&["Hola. ", "¿Cómo estás?"], "en");
        let translation = parse_response(&json).unwrap();
        assert_eq!(translation.text, "Hola. ¿Cómo estás?");
        assert_eq!(translation.detected, Some(LanguageCode::ENGLISH));
    }

    #[test]
    fn test_parse_null_sentences_is_empty() {
        let json = serde_json::json!([null, null, "en"]);
        let translation = parse_response(&json).unwrap();
        assert_eq!(translation.text, "");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let json = serde_json::json!({"error": "nope"});
        assert!(matches!(
            parse_response(&json),
            Err(TranslateError::InvalidResponse { .. })
        ));
    }

    // ==================== HTTP Tests ====================

    #[tokio::test]
    async fn test_translate_sends_gtx_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("sl", "auto"))
            .and(query_param("tl", "iw"))
            .and(query_param("q", "hello world"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(google_response(&["שלום עולם"], "en")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = GoogleBackend::new(reqwest::Client::new(), mock_server.uri());
        let hebrew = LanguageCode::from_code("he").unwrap();
        let translation = backend
            .translate("hello world", LanguageCode::AUTO, hebrew)
            .await
            .expect("Should succeed");

        assert_eq!(translation.text, "שלום עולם");
        assert_eq!(translation.detected, Some(LanguageCode::ENGLISH));
    }

    #[tokio::test]
    async fn test_translate_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let backend = GoogleBackend::new(reqwest::Client::new(), mock_server.uri());
        let result = backend
            .translate("hello", LanguageCode::AUTO, LanguageCode::SPANISH)
            .await;

        assert!(matches!(result, Err(TranslateError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_translate_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&mock_server)
            .await;

        let backend = GoogleBackend::new(reqwest::Client::new(), mock_server.uri());
        let err = backend
            .translate("hello", LanguageCode::AUTO, LanguageCode::SPANISH)
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::BackendUnavailable { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_translate_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
            .mount(&mock_server)
            .await;

        let backend = GoogleBackend::new(reqwest::Client::new(), format!("{}/", mock_server.uri()));
        let result = backend
            .translate("hello", LanguageCode::AUTO, LanguageCode::SPANISH)
            .await;

        assert!(matches!(result, Err(TranslateError::InvalidResponse { .. })));
    }
}
