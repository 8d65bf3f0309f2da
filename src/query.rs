//! Turning raw user input into the text and source language to translate.

use crate::i18n::{LanguageCode, LanguageRegistry};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// What the user asked to translate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub text: String,
    pub from: LanguageCode,
}

/// Trailing `>fr`, `:fr` or `/fr` pinning the source language.
fn source_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        let mut codes: Vec<&str> = LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|lang| lang.code)
            .collect();
        // Longest first so `zh-CN` wins over a shorter prefix
        codes.sort_by_key(|code| std::cmp::Reverse(code.len()));
        let alternatives = codes
            .iter()
            .map(|code| regex::escape(code))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)[>:/]({})$", alternatives))
            .expect("language codes form a valid pattern")
    })
}

/// Build the query from typed input, falling back to the system selection.
///
/// The selection is only consulted when `input` is blank.
pub fn parse_query(input: &str, selection: Option<&str>) -> Query {
    let raw = match input.trim() {
        "" => selection.map(str::trim).unwrap_or_default(),
        typed => typed,
    };

    let mut from = LanguageCode::AUTO;
    let text = match source_suffix().captures(raw) {
        Some(captures) => {
            if let Some(lang) = captures
                .get(1)
                .and_then(|m| LanguageCode::from_code(m.as_str()).ok())
            {
                from = lang;
            }
            let start = captures.get(0).map(|m| m.start()).unwrap_or(raw.len());
            &raw[..start]
        }
        None => raw,
    };

    Query {
        text: text.trim().to_string(),
        from,
    }
}
