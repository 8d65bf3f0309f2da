//! LanguageCode: a language identifier validated against the registry.

use crate::error::TranslateError;
use crate::i18n::{LanguageConfig, LanguageRegistry, AUTO_DETECT};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated language code.
///
/// Only codes present in the [`LanguageRegistry`] can be constructed, so
/// display metadata is always available. The code is stored in its
/// canonical registry spelling (`zh-CN`, never `zh-cn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageCode {
    code: &'static str,
}

impl LanguageCode {
    /// Ask the backend to detect the source language.
    pub const AUTO: LanguageCode = LanguageCode { code: AUTO_DETECT };

    pub const ENGLISH: LanguageCode = LanguageCode { code: "en" };

    pub const SPANISH: LanguageCode = LanguageCode { code: "es" };

    pub const FRENCH: LanguageCode = LanguageCode { code: "fr" };

    /// Create a LanguageCode from a code string.
    ///
    /// # Returns
    /// * `Ok(LanguageCode)` if the code is in the registry (case-insensitive)
    /// * `Err(TranslateError::UnknownLanguage)` otherwise
    pub fn from_code(code: &str) -> Result<LanguageCode, TranslateError> {
        LanguageRegistry::get()
            .get_by_code(code.trim())
            .map(|config| LanguageCode { code: config.code })
            .ok_or_else(|| TranslateError::UnknownLanguage(code.to_string()))
    }

    /// The code as stored in the registry (e.g., "en", "zh-CN").
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The registry entry for this language.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("LanguageCode is only built from registry entries")
    }

    /// English display name (e.g., "Spanish").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn flag(&self) -> Option<&'static str> {
        self.config().flag
    }

    pub fn is_auto(&self) -> bool {
        self.code == AUTO_DETECT
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::AUTO
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for LanguageCode {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl Serialize for LanguageCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code)
    }
}

/// Format a language pair for display, e.g. `English 🇬🇧 -> 🇪🇸 Spanish`.
pub fn format_language_pair(from: LanguageCode, to: LanguageCode) -> String {
    format!(
        "{} {} -> {} {}",
        from.name(),
        from.flag().unwrap_or("🏳"),
        to.flag().unwrap_or("🏳"),
        to.name()
    )
}
