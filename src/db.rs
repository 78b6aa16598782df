use crate::i18n::Language;
use crate::record::{StoredRecord, TranslationAlternative, TranslationRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Append-only storage for translation records.
///
/// Writes are independent inserts keyed by a unique id, so implementations
/// only need to be safe for concurrent use, not serialized.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Persist a new record.
    async fn insert(&self, record: &StoredRecord) -> Result<()>;

    /// Up to `limit` records, newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<TranslationRecord>>;

    /// Delete every record. Succeeds on an empty store.
    async fn clear_all(&self) -> Result<u64>;
}

// ==================== PostgreSQL ====================

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database and make sure the table exists
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the translations table and its ordering index if missing
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS translations (
                seq BIGSERIAL,
                id UUID PRIMARY KEY,
                text TEXT NOT NULL,
                from_lang TEXT NOT NULL,
                to_lang TEXT NOT NULL,
                main_translation TEXT NOT NULL,
                alternatives JSONB NOT NULL DEFAULT '[]'::jsonb,
                timestamp TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create translations table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS translations_created_at_idx
             ON translations (created_at DESC, seq DESC)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create translations index")?;

        info!("✓ Translations table ready");
        Ok(())
    }
}

fn record_from_row(row: &PgRow) -> Result<TranslationRecord> {
    let from_lang: String = row.try_get("from_lang")?;
    let to_lang: String = row.try_get("to_lang")?;
    let Json(alternatives): Json<Vec<TranslationAlternative>> = row.try_get("alternatives")?;

    Ok(TranslationRecord {
        id: row.try_get::<Uuid, _>("id")?,
        text: row.try_get("text")?,
        from_lang: Language::from_code(&from_lang)?,
        to_lang: Language::from_code(&to_lang)?,
        main_translation: row.try_get("main_translation")?,
        alternatives,
        timestamp: row.try_get("timestamp")?,
    })
}

#[async_trait]
impl TranslationStore for PgStore {
    async fn insert(&self, stored: &StoredRecord) -> Result<()> {
        let record = &stored.record;
        sqlx::query(
            "INSERT INTO translations
                (id, text, from_lang, to_lang, main_translation, alternatives, timestamp, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(record.id)
        .bind(&record.text)
        .bind(record.from_lang.code())
        .bind(record.to_lang.code())
        .bind(&record.main_translation)
        .bind(Json(&record.alternatives))
        .bind(&record.timestamp)
        .bind(stored.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to save translation")?;

        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<TranslationRecord>> {
        let rows = sqlx::query(
            "SELECT id, text, from_lang, to_lang, main_translation, alternatives, timestamp
             FROM translations
             ORDER BY created_at DESC, seq DESC
             LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch translation history")?;

        rows.iter().map(record_from_row).collect()
    }

    async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM translations")
            .execute(&self.pool)
            .await
            .context("Failed to clear translation history")?;

        Ok(result.rows_affected())
    }
}

// ==================== In-memory ====================

/// Process-local store, used for tests and when no database is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<(u64, StoredRecord)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn insert(&self, record: &StoredRecord) -> Result<()> {
        let mut records = self.records.write().await;
        let seq = records.last().map(|(seq, _)| seq + 1).unwrap_or(0);
        records.push((seq, record.clone()));
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<TranslationRecord>> {
        let records = self.records.read().await;
        let mut ordered: Vec<(&DateTime<Utc>, u64, &TranslationRecord)> = records
            .iter()
            .map(|(seq, stored)| (&stored.created_at, *seq, &stored.record))
            .collect();
        ordered.sort_by(|a, b| b.0.cmp(a.0).then(b.1.cmp(&a.1)));

        Ok(ordered
            .into_iter()
            .take(limit as usize)
            .map(|(_, _, record)| record.clone())
            .collect())
    }

    async fn clear_all(&self) -> Result<u64> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
