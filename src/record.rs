use crate::i18n::Language;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One phrasing variant with its usage context and rationale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationAlternative {
    pub translation: String,
    pub context: String,
    pub explanation: String,
}

impl TranslationAlternative {
    pub fn new(
        translation: impl Into<String>,
        context: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            translation: translation.into(),
            context: context.into(),
            explanation: explanation.into(),
        }
    }
}

/// A translation as returned by the API.
///
/// Records are created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRecord {
    pub id: Uuid,
    pub text: String,
    pub from_lang: Language,
    pub to_lang: Language,
    pub main_translation: String,
    pub alternatives: Vec<TranslationAlternative>,
    /// ISO-8601 UTC creation time
    pub timestamp: String,
}

/// A record together with its internal sort key, as held by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub record: TranslationRecord,
    pub created_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Build a new record with a fresh id, stamped with `created_at`.
    pub fn new(
        text: String,
        from_lang: Language,
        to_lang: Language,
        main_translation: String,
        alternatives: Vec<TranslationAlternative>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record: TranslationRecord {
                id: Uuid::new_v4(),
                text,
                from_lang,
                to_lang,
                main_translation,
                alternatives,
                timestamp: format_timestamp(created_at),
            },
            created_at,
        }
    }

    /// Drop the internal sort key.
    pub fn into_record(self) -> TranslationRecord {
        self.record
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
