//! Language registry: Single source of truth for all languages the translator knows.
//!
//! The table mirrors the language list of the Google Translate web UI. It uses a
//! singleton pattern with `OnceLock` so the table is built once and shared
//! read-only for the rest of the process.

use std::sync::OnceLock;

/// Code of the pseudo-language that asks the backend to detect the source.
pub const AUTO_DETECT: &str = "auto";

/// Display metadata for a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Language code as used by Google Translate (e.g., "en", "zh-CN")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Chinese (Simplified)")
    pub name: &'static str,

    /// Flag emoji, when a representative one exists
    pub flag: Option<&'static str>,
}

impl LanguageConfig {
    /// Whether this entry is the auto-detect pseudo-language.
    pub fn is_auto(&self) -> bool {
        self.code == AUTO_DETECT
    }
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// Matching is ASCII case-insensitive, so `zh-cn` finds `zh-CN`.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// All languages, including the auto-detect entry.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Languages that can be used as a translation target (everything but `auto`).
    pub fn list_targets(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| !lang.is_auto()).collect()
    }

    /// Check if a language code is known.
    pub fn contains(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

macro_rules! lang {
    ($code:literal, $name:literal) => {
        LanguageConfig {
            code: $code,
            name: $name,
            flag: None,
        }
    };
    ($code:literal, $name:literal, $flag:literal) => {
        LanguageConfig {
            code: $code,
            name: $name,
            flag: Some($flag),
        }
    };
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        lang!("auto", "Auto Detect"),
        lang!("af", "Afrikaans", "🇿🇦"),
        lang!("sq", "Albanian", "🇦🇱"),
        lang!("am", "Amharic", "🇪🇹"),
        lang!("ar", "Arabic", "🇸🇦"),
        lang!("hy", "Armenian", "🇦🇲"),
        lang!("az", "Azerbaijani", "🇦🇿"),
        lang!("eu", "Basque"),
        lang!("be", "Belarusian", "🇧🇾"),
        lang!("bn", "Bengali", "🇧🇩"),
        lang!("bs", "Bosnian", "🇧🇦"),
        lang!("bg", "Bulgarian", "🇧🇬"),
        lang!("ca", "Catalan"),
        lang!("ceb", "Cebuano", "🇵🇭"),
        lang!("zh-CN", "Chinese (Simplified)", "🇨🇳"),
        lang!("zh-TW", "Chinese (Traditional)", "🇹🇼"),
        lang!("co", "Corsican", "🇫🇷"),
        lang!("hr", "Croatian", "🇭🇷"),
        lang!("cs", "Czech", "🇨🇿"),
        lang!("da", "Danish", "🇩🇰"),
        lang!("nl", "Dutch", "🇳🇱"),
        lang!("en", "English", "🇬🇧"),
        lang!("eo", "Esperanto"),
        lang!("et", "Estonian", "🇪🇪"),
        lang!("fi", "Finnish", "🇫🇮"),
        lang!("fr", "French", "🇫🇷"),
        lang!("fy", "Frisian", "🇳🇱"),
        lang!("gl", "Galician", "🇪🇸"),
        lang!("ka", "Georgian", "🇬🇪"),
        lang!("de", "German", "🇩🇪"),
        lang!("el", "Greek", "🇬🇷"),
        lang!("gu", "Gujarati", "🇮🇳"),
        lang!("ht", "Haitian Creole", "🇭🇹"),
        lang!("ha", "Hausa", "🇳🇬"),
        lang!("haw", "Hawaiian", "🇺🇸"),
        lang!("he", "Hebrew", "🇮🇱"),
        lang!("hi", "Hindi", "🇮🇳"),
        lang!("hmn", "Hmong"),
        lang!("hu", "Hungarian", "🇭🇺"),
        lang!("is", "Icelandic", "🇮🇸"),
        lang!("ig", "Igbo", "🇳🇬"),
        lang!("id", "Indonesian", "🇮🇩"),
        lang!("ga", "Irish", "🇮🇪"),
        lang!("it", "Italian", "🇮🇹"),
        lang!("ja", "Japanese", "🇯🇵"),
        lang!("jv", "Javanese", "🇮🇩"),
        lang!("kn", "Kannada", "🇮🇳"),
        lang!("kk", "Kazakh", "🇰🇿"),
        lang!("km", "Khmer", "🇰🇭"),
        lang!("ko", "Korean", "🇰🇷"),
        lang!("ku", "Kurdish"),
        lang!("ky", "Kyrgyz", "🇰🇬"),
        lang!("lo", "Lao", "🇱🇦"),
        lang!("la", "Latin", "🇻🇦"),
        lang!("lv", "Latvian", "🇱🇻"),
        lang!("lt", "Lithuanian", "🇱🇹"),
        lang!("lb", "Luxembourgish", "🇱🇺"),
        lang!("mk", "Macedonian", "🇲🇰"),
        lang!("mg", "Malagasy", "🇲🇬"),
        lang!("ms", "Malay", "🇲🇾"),
        lang!("ml", "Malayalam", "🇮🇳"),
        lang!("mt", "Maltese", "🇲🇹"),
        lang!("mi", "Maori", "🇳🇿"),
        lang!("mr", "Marathi", "🇮🇳"),
        lang!("mn", "Mongolian", "🇲🇳"),
        lang!("my", "Myanmar (Burmese)", "🇲🇲"),
        lang!("ne", "Nepali", "🇳🇵"),
        lang!("no", "Norwegian", "🇳🇴"),
        lang!("ny", "Nyanja (Chichewa)", "🇲🇼"),
        lang!("ps", "Pashto", "🇦🇫"),
        lang!("fa", "Persian", "🇮🇷"),
        lang!("pl", "Polish", "🇵🇱"),
        lang!("pt", "Portuguese", "🇵🇹"),
        lang!("pa", "Punjabi", "🇮🇳"),
        lang!("ro", "Romanian", "🇷🇴"),
        lang!("ru", "Russian", "🇷🇺"),
        lang!("sm", "Samoan", "🇼🇸"),
        lang!("gd", "Scots Gaelic"),
        lang!("sr", "Serbian", "🇷🇸"),
        lang!("st", "Sesotho", "🇱🇸"),
        lang!("sn", "Shona", "🇿🇼"),
        lang!("sd", "Sindhi", "🇵🇰"),
        lang!("si", "Sinhala", "🇱🇰"),
        lang!("sk", "Slovak", "🇸🇰"),
        lang!("sl", "Slovenian", "🇸🇮"),
        lang!("so", "Somali", "🇸🇴"),
        lang!("es", "Spanish", "🇪🇸"),
        lang!("su", "Sundanese", "🇮🇩"),
        lang!("sw", "Swahili", "🇰🇪"),
        lang!("sv", "Swedish", "🇸🇪"),
        lang!("tl", "Tagalog (Filipino)", "🇵🇭"),
        lang!("tg", "Tajik", "🇹🇯"),
        lang!("ta", "Tamil", "🇮🇳"),
        lang!("te", "Telugu", "🇮🇳"),
        lang!("th", "Thai", "🇹🇭"),
        lang!("tr", "Turkish", "🇹🇷"),
        lang!("uk", "Ukrainian", "🇺🇦"),
        lang!("ur", "Urdu", "🇵🇰"),
        lang!("uz", "Uzbek", "🇺🇿"),
        lang!("vi", "Vietnamese", "🇻🇳"),
        lang!("cy", "Welsh"),
        lang!("xh", "Xhosa", "🇿🇦"),
        lang!("yi", "Yiddish"),
        lang!("yo", "Yoruba", "🇳🇬"),
        lang!("zu", "Zulu", "🇿🇦"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        // Should return the same instance (same memory address)
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_english() {
        let config = LanguageRegistry::get().get_by_code("en").unwrap();
        assert_eq!(config.code, "en");
        assert_eq!(config.name, "English");
        assert_eq!(config.flag, Some("🇬🇧"));
        assert!(!config.is_auto());
    }

    #[test]
    fn test_get_by_code_is_case_insensitive() {
        let registry = LanguageRegistry::get();
        assert_eq!(registry.get_by_code("zh-cn").unwrap().code, "zh-CN");
        assert_eq!(registry.get_by_code("FR").unwrap().code, "fr");
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code("xx").is_none());
        assert!(registry.get_by_code("").is_none());
        assert!(!registry.contains("klingon"));
    }

    #[test]
    fn test_auto_is_listed_but_not_a_target() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code(AUTO_DETECT).unwrap().is_auto());
        assert!(registry.list_all().iter().any(|l| l.is_auto()));
        assert!(!registry.list_targets().iter().any(|l| l.is_auto()));
        assert_eq!(registry.list_targets().len() + 1, registry.list_all().len());
    }

    #[test]
    fn test_codes_are_unique() {
        let all = LanguageRegistry::get().list_all();
        let codes: HashSet<String> = all.iter().map(|l| l.code.to_ascii_lowercase()).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_some_languages_have_no_flag() {
        let registry = LanguageRegistry::get();
        assert_eq!(registry.get_by_code("eo").unwrap().flag, None);
        assert_eq!(registry.get_by_code("auto").unwrap().flag, None);
    }
}
