use crate::db::TranslationStore;
use crate::error::AppError;
use crate::i18n::Language;
use crate::normalize::{normalize_reply, NormalizedTranslation};
use crate::openai::{ChatClient, ChatPrompt};
use crate::record::{StoredRecord, TranslationRecord};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Longest accepted input, in characters
pub const MAX_TEXT_CHARS: usize = 5000;

/// Context labels the model is asked to tag its three alternatives with
pub const CONTEXT_EVERYDAY: &str = "Günlük konuşma";
pub const CONTEXT_POLITE: &str = "Nezaket/tarafsız";
pub const CONTEXT_FORMAL: &str = "Çok resmi/iş";

/// Body of `POST /api/translate`
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub from_lang: String,
    pub to_lang: String,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub text: String,
    pub from: Language,
    pub to: Language,
}

/// Check a request before anything leaves the process.
///
/// Order matters for the message the caller sees: empty text, identical
/// languages, length, then unsupported codes.
pub fn validate_request(request: &TranslationRequest) -> Result<ValidatedRequest, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::invalid("Text cannot be empty"));
    }

    if request.from_lang == request.to_lang {
        return Err(AppError::invalid(
            "Source and target languages cannot be the same",
        ));
    }

    if request.text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::invalid(format!(
            "Text too long (max {} characters)",
            MAX_TEXT_CHARS
        )));
    }

    let (from, to) = match (
        Language::from_code(&request.from_lang),
        Language::from_code(&request.to_lang),
    ) {
        (Ok(from), Ok(to)) => (from, to),
        _ => return Err(AppError::invalid("Unsupported language")),
    };

    Ok(ValidatedRequest {
        text: request.text.clone(),
        from,
        to,
    })
}

/// Build the system prompt for translation
fn build_translation_system_prompt(from: Language, to: Language) -> String {
    let source = from.display_name();
    let target = to.display_name();

    format!(
        r#"You are an expert translator who understands natural, everyday language usage.

Your task: Translate text from {source} to {target}.

IMPORTANT:
- For casual/informal text, provide NATURAL, everyday translations that native speakers actually use
- Prefer the phrasing a native speaker would say out loud over a textbook rendering
- Return main_translation as: "casual_version (informal) / formal_version (formal)" format
- Write ALL explanations in {target} (target language)

Response format:
{{
    "main_translation": "Natural_casual_translation (informal) / Formal_translation (formal)",
    "alternatives": [
        {{
            "translation": "Most natural everyday version",
            "context": "{everyday}",
            "explanation": "Explanation in {target} about natural usage"
        }},
        {{
            "translation": "Polite/neutral version",
            "context": "{polite}",
            "explanation": "Explanation in {target} about polite usage"
        }},
        {{
            "translation": "Very formal/business version",
            "context": "{formal}",
            "explanation": "Explanation in {target} about formal usage"
        }}
    ]
}}

Rules:
1. Main translation should show both casual and formal in one line
2. Prioritize natural, native-speaker language
3. ALL explanations in {target}
4. Consider real-world usage, not textbook translations
5. Return exactly three alternatives with the context labels shown above
6. Return ONLY valid JSON"#,
        source = source,
        target = target,
        everyday = CONTEXT_EVERYDAY,
        polite = CONTEXT_POLITE,
        formal = CONTEXT_FORMAL,
    )
}

/// Build the user prompt for translation
fn build_translation_user_prompt(text: &str) -> String {
    format!("Translate this text: '{}'", text)
}

/// Instruction payload for one validated request
pub fn build_prompt(request: &ValidatedRequest) -> ChatPrompt {
    ChatPrompt {
        system: build_translation_system_prompt(request.from, request.to),
        user: build_translation_user_prompt(&request.text),
    }
}

/// Ask the model to translate one validated request and normalize its reply.
///
/// Nothing is persisted. Each call gets a fresh session id, sent to the
/// provider and recorded on the `llm_call` span.
pub async fn request_translation(
    client: &dyn ChatClient,
    request: &ValidatedRequest,
) -> Result<NormalizedTranslation, AppError> {
    let session_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "llm_call",
        session_id = %session_id,
        from = request.from.code(),
        to = request.to.code()
    );

    async {
        let prompt = build_prompt(request);
        let reply = client
            .complete(&prompt, &session_id)
            .await
            .map_err(AppError::upstream)?;

        Ok::<_, AppError>(normalize_reply(&reply))
    }
    .instrument(span)
    .await
}

/// Wires validation, the model call, normalization and persistence together.
///
/// Holds no per-request state; clone freely.
#[derive(Clone)]
pub struct TranslationService {
    client: Arc<dyn ChatClient>,
    store: Arc<dyn TranslationStore>,
    default_limit: u32,
    max_limit: u32,
}

impl TranslationService {
    pub fn new(
        client: Arc<dyn ChatClient>,
        store: Arc<dyn TranslationStore>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            client,
            store,
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    /// Validate, translate, persist, and return the new record.
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationRecord, AppError> {
        let validated = validate_request(request)?;
        let normalized = request_translation(self.client.as_ref(), &validated).await?;

        let stored = StoredRecord::new(
            validated.text,
            validated.from,
            validated.to,
            normalized.main_translation,
            normalized.alternatives,
            Utc::now(),
        );

        self.store
            .insert(&stored)
            .await
            .map_err(|e| AppError::persistence("Translation failed", e))?;

        info!(
            "Saved translation {} ({} -> {}, {} alternatives, parsed via {})",
            stored.record.id,
            stored.record.from_lang,
            stored.record.to_lang,
            stored.record.alternatives.len(),
            normalized.strategy.as_str()
        );

        Ok(stored.into_record())
    }

    /// Clamp a caller-supplied history limit to `[1, max_limit]`.
    pub fn effective_limit(&self, requested: Option<i64>) -> u32 {
        match requested {
            None => self.default_limit,
            Some(n) => n.clamp(1, i64::from(self.max_limit)) as u32,
        }
    }

    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<TranslationRecord>, AppError> {
        self.store
            .list_recent(self.effective_limit(limit))
            .await
            .map_err(|e| AppError::persistence("Failed to fetch history", e))
    }

    pub async fn clear_history(&self) -> Result<u64, AppError> {
        let removed = self
            .store
            .clear_all()
            .await
            .map_err(|e| AppError::persistence("Failed to clear history", e))?;
        info!("Cleared {} translations from history", removed);
        Ok(removed)
    }
}
