//! Language registry: Single source of truth for all supported languages.
//!
//! The table is a compile-time constant. Nothing can register or disable a
//! language at runtime, so lookups need no synchronization.

/// Configuration for a supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "tr")
    pub code: &'static str,

    /// Native name of the language (e.g., "Türkçe", "Deutsch").
    /// This is the display name returned by the API and embedded in prompts.
    pub native_name: &'static str,
}

/// Global language registry.
#[derive(Debug)]
pub struct LanguageRegistry {
    languages: &'static [LanguageConfig],
}

pub(crate) const LANGUAGES: [LanguageConfig; 8] = [
    LanguageConfig {
        code: "tr",
        native_name: "Türkçe",
    },
    LanguageConfig {
        code: "en",
        native_name: "English",
    },
    LanguageConfig {
        code: "de",
        native_name: "Deutsch",
    },
    LanguageConfig {
        code: "fr",
        native_name: "Français",
    },
    LanguageConfig {
        code: "es",
        native_name: "Español",
    },
    LanguageConfig {
        code: "it",
        native_name: "Italiano",
    },
    LanguageConfig {
        code: "pt",
        native_name: "Português",
    },
    LanguageConfig {
        code: "ru",
        native_name: "Русский",
    },
];

static REGISTRY: LanguageRegistry = LanguageRegistry {
    languages: &LANGUAGES,
};

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        &REGISTRY
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&'static LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all languages in registry order.
    pub fn list_all(&self) -> &'static [LanguageConfig] {
        self.languages
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_registry_has_eight_languages() {
        let all = LanguageRegistry::get().list_all();
        assert_eq!(all.len(), 8);

        let codes: Vec<_> = all.iter().map(|lang| lang.code).collect();
        assert_eq!(codes, vec!["tr", "en", "de", "fr", "es", "it", "pt", "ru"]);
    }

    #[test]
    fn test_get_by_code_turkish() {
        let config = LanguageRegistry::get()
            .get_by_code("tr")
            .expect("Turkish should be registered");

        assert_eq!(config.code, "tr");
        assert_eq!(config.native_name, "Türkçe");
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code("ja").is_none());
        assert!(registry.get_by_code("").is_none());
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code("EN").is_none());
        assert!(registry.get_by_code("en").is_some());
    }

    #[test]
    fn test_native_names() {
        let names: Vec<_> = LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|lang| lang.native_name)
            .collect();
        assert_eq!(
            names,
            vec!["Türkçe", "English", "Deutsch", "Français", "Español", "Italiano", "Português", "Русский"]
        );
    }

    #[test]
    fn test_codes_are_unique() {
        let all = LanguageRegistry::get().list_all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
