//! Language type: validated language representation.
//!
//! A `Language` can only be constructed from a code present in the registry,
//! so holding one is proof that the code is supported.

use crate::i18n::registry::LANGUAGES;
use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::{Serialize, Serializer};
use std::fmt;

/// Error returned when a code is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown language code: '{0}'")]
pub struct UnsupportedLanguage(pub String);

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    config: &'static LanguageConfig,
}

impl Language {
    pub const TURKISH: Language = Language {
        config: &LANGUAGES[0],
    };
    pub const ENGLISH: Language = Language {
        config: &LANGUAGES[1],
    };

    /// Create a Language from a language code string.
    ///
    /// # Example
    /// ```ignore
    /// let german = Language::from_code("de")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Language, UnsupportedLanguage> {
        LanguageRegistry::get()
            .get_by_code(code)
            .map(|config| Language { config })
            .ok_or_else(|| UnsupportedLanguage(code.to_string()))
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.config.code
    }

    /// Human-readable name, written in the language itself.
    pub fn display_name(&self) -> &'static str {
        self.config.native_name
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}
