//! Language metadata shared by the translator, the query parser and the CLI.
//!
//! - `registry`: static table of every supported language, its name and flag
//! - `language`: `LanguageCode`, a `Copy` handle validated against the registry
//!
//! # Example
//!
//! ```rust
//! use multi_translate::i18n::{LanguageCode, LanguageRegistry};
//!
//! let spanish = LanguageCode::from_code("es").unwrap();
//! assert_eq!(spanish.name(), "Spanish");
//! assert!(LanguageRegistry::get().contains("zh-CN"));
//! ```

mod language;
mod registry;

pub use language::{format_language_pair, LanguageCode};
pub use registry::{LanguageConfig, LanguageRegistry, AUTO_DETECT};
