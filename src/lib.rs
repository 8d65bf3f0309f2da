pub mod config;
pub mod debounce;
pub mod diff;
pub mod error;
pub mod i18n;
pub mod query;
pub mod session;
pub mod spellcheck;
pub mod translator;
