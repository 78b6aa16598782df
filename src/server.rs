use crate::error::AppError;
use crate::i18n::LanguageRegistry;
use crate::record::TranslationRecord;
use crate::translation::{TranslationRequest, TranslationService};
use axum::{
    extract::{Query, State},
    routing::get,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: TranslationService,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub translations: Vec<TranslationRecord>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/languages", get(get_languages))
        .route("/api/translate", post(translate_text))
        .route(
            "/api/history",
            get(get_translation_history).delete(clear_history),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Translation API is running"
    }))
}

async fn get_languages() -> Json<Value> {
    let languages: Map<String, Value> = LanguageRegistry::get()
        .list_all()
        .iter()
        .map(|lang| (lang.code.to_string(), Value::from(lang.native_name)))
        .collect();

    Json(json!({ "languages": languages }))
}

async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<TranslationRecord>, AppError> {
    let record = state.service.translate(&request).await?;
    Ok(Json(record))
}

async fn get_translation_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let translations = state.service.history(query.limit).await?;
    Ok(Json(HistoryResponse { translations }))
}

async fn clear_history(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.service.clear_history().await?;
    Ok(Json(json!({ "message": "History cleared successfully" })))
}
