//! Response normalization: turn whatever text the model sent back into a
//! translation with a non-empty main line and a well-formed list of
//! alternatives.
//!
//! Parsing is an ordered chain of strategies; the first one that yields a
//! JSON object wins. When none do, the raw reply becomes the translation.

use crate::record::TranslationAlternative;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Context label used when the reply could not be parsed
pub const FALLBACK_CONTEXT: &str = "General";
/// Explanation used when the reply could not be parsed
pub const FALLBACK_EXPLANATION: &str = "Standard translation";

/// Longest slice of a raw reply that gets written to the log
const LOG_PREVIEW_CHARS: usize = 500;

static FENCED_BLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
static BRACE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Which strategy produced the normalized translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The whole reply was a JSON object
    Direct,
    /// A fenced ```json block held the object
    FencedBlock,
    /// An object was found between braces somewhere in the reply
    BraceMatch,
    /// Nothing parsed; the raw reply was used as the translation
    Fallback,
}

impl ParseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStrategy::Direct => "direct",
            ParseStrategy::FencedBlock => "fenced_block",
            ParseStrategy::BraceMatch => "brace_match",
            ParseStrategy::Fallback => "fallback",
        }
    }
}

/// Normalized model output, ready to become a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTranslation {
    pub main_translation: String,
    pub alternatives: Vec<TranslationAlternative>,
    pub strategy: ParseStrategy,
}

/// Parse `text` as a JSON object. Arrays, strings and numbers don't count.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn try_direct(reply: &str) -> Option<Map<String, Value>> {
    parse_object(reply.trim())
}

fn try_fenced_block(reply: &str) -> Option<Map<String, Value>> {
    let regex = FENCED_BLOCK_REGEX
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());
    regex
        .captures_iter(reply)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| parse_object(m.as_str()))
}

/// Greedy first-`{`-to-last-`}` match, then a scan for the first complete
/// object when the greedy span swallowed more than one.
fn try_brace_match(reply: &str) -> Option<Map<String, Value>> {
    let regex = BRACE_REGEX.get_or_init(|| Regex::new(r"(?s)\{.*\}").unwrap());
    if let Some(map) = regex
        .find(reply)
        .and_then(|m| parse_object(m.as_str()))
    {
        return Some(map);
    }

    reply
        .char_indices()
        .filter(|&(_, c)| c == '{')
        .find_map(|(start, _)| first_object_at(&reply[start..]))
}

fn first_object_at(text: &str) -> Option<Map<String, Value>> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Object(map))) => Some(map),
        _ => None,
    }
}

/// Normalize a raw model reply. Never fails.
pub fn normalize_reply(reply: &str) -> NormalizedTranslation {
    let raw = reply.trim();

    let parsed = try_direct(reply)
        .map(|map| (map, ParseStrategy::Direct))
        .or_else(|| try_fenced_block(reply).map(|map| (map, ParseStrategy::FencedBlock)))
        .or_else(|| try_brace_match(reply).map(|map| (map, ParseStrategy::BraceMatch)));

    match parsed {
        Some((map, strategy)) => {
            debug!("Parsed model reply using {} strategy", strategy.as_str());
            from_object(map, raw, strategy)
        }
        None => {
            warn!(
                "Could not parse model reply as JSON, using raw text. Raw reply: {}",
                preview(raw)
            );
            fallback(raw)
        }
    }
}

fn fallback(raw: &str) -> NormalizedTranslation {
    NormalizedTranslation {
        main_translation: raw.to_string(),
        alternatives: vec![TranslationAlternative::new(
            raw,
            FALLBACK_CONTEXT,
            FALLBACK_EXPLANATION,
        )],
        strategy: ParseStrategy::Fallback,
    }
}

fn from_object(
    mut map: Map<String, Value>,
    raw: &str,
    strategy: ParseStrategy,
) -> NormalizedTranslation {
    let main_translation = match map.remove("main_translation") {
        Some(value) => match value_to_text(value) {
            text if text.trim().is_empty() => {
                warn!("Model reply had an empty main_translation, using raw text");
                raw.to_string()
            }
            text => text,
        },
        None => {
            warn!("Model reply had no main_translation, using raw text");
            raw.to_string()
        }
    };

    let alternatives = match map.remove("alternatives") {
        Some(Value::Array(items)) => items.into_iter().filter_map(to_alternative).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            warn!("Ignoring alternatives of unexpected shape: {}", other);
            Vec::new()
        }
    };

    NormalizedTranslation {
        main_translation,
        alternatives,
        strategy,
    }
}

/// Coerce one alternatives entry. Objects keep their three fields (missing
/// ones become empty); a bare string is taken as the translation.
fn to_alternative(item: Value) -> Option<TranslationAlternative> {
    match item {
        Value::Object(mut fields) => {
            let mut take = |key: &str| fields.remove(key).map(value_to_text).unwrap_or_default();
            Some(TranslationAlternative {
                translation: take("translation"),
                context: take("context"),
                explanation: take("explanation"),
            })
        }
        Value::String(translation) => Some(TranslationAlternative {
            translation,
            context: String::new(),
            explanation: String::new(),
        }),
        _ => None,
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() <= LOG_PREVIEW_CHARS {
        return raw.to_string();
    }
    let head: String = raw.chars().take(LOG_PREVIEW_CHARS).collect();
    format!("{}...", head)
}
