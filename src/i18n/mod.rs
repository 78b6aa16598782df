//! Supported languages.
//!
//! - `registry`: the fixed table of language codes and display names
//! - `language`: `Language`, a code validated against the registry
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{Language, LanguageRegistry};
//!
//! let german = Language::from_code("de")?;
//! assert_eq!(german.display_name(), "Deutsch");
//!
//! let all = LanguageRegistry::get().list_all();
//! ```

mod language;
mod registry;

pub use language::{Language, UnsupportedLanguage};
pub use registry::{LanguageConfig, LanguageRegistry};
