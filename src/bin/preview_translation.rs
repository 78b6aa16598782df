//! Preview translation binary - runs one translation through the model and
//! prints the normalized result without saving it
//!
//! Usage:
//!   cargo run --bin preview -- en tr "What's up?"
//!
//! Required environment variables:
//! - LLM_API_KEY (or GEMINI_API_KEY / OPENAI_API_KEY)
//!
//! Optional:
//! - LLM_API_URL, LLM_MODEL, LLM_MAX_TOKENS, LLM_TIMEOUT_SECS

use anyhow::{bail, Context, Result};
use natural_translator::config::Config;
use natural_translator::openai::OpenAiClient;
use natural_translator::record::StoredRecord;
use natural_translator::translation::{request_translation, validate_request, TranslationRequest};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("natural_translator=debug".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [from_lang, to_lang, text] = args.as_slice() else {
        bail!("Usage: preview <from_lang> <to_lang> <text>");
    };

    let config = Config::from_env()?;
    let request = TranslationRequest {
        text: text.clone(),
        from_lang: from_lang.clone(),
        to_lang: to_lang.clone(),
    };
    let validated = validate_request(&request)?;

    let client = OpenAiClient::new(reqwest::Client::new(), &config);
    info!("Previewing {} -> {} with {}", from_lang, to_lang, client.model());

    let normalized = request_translation(&client, &validated).await?;

    info!("Parsed via {} strategy", normalized.strategy.as_str());

    let record = StoredRecord::new(
        validated.text,
        validated.from,
        validated.to,
        normalized.main_translation,
        normalized.alternatives,
        chrono::Utc::now(),
    )
    .into_record();

    let json = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
    println!("{}", json);

    Ok(())
}
