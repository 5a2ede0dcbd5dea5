//! Axum route handlers for the Tagging API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{self, ModelOption, AVAILABLE_MODELS};
use crate::state::AppState;
use crate::tagging::dictionary::DictionaryStats;
use crate::tagging::extractor::extract_tags;
use crate::tagging::models::{CandidateRecord, TagRecord, Warning};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    pub model: Option<String>,
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub extraction_id: Uuid,
    pub model: String,
    pub tags: TagRecord,
    pub warnings: Vec<Warning>,
    pub candidate: CandidateRecord,
    pub raw_response: String,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub default: String,
    pub models: &'static [ModelOption],
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tags/extract
///
/// Runs the extraction pipeline against the current dictionary snapshot.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    if let Some(model) = request.model.as_deref() {
        if !llm_client::is_available_model(model) {
            return Err(AppError::Validation(format!("unknown model '{model}'")));
        }
    }

    let model = state.config.model_config(request.model.as_deref());
    let dictionary = state.dictionaries.snapshot();

    let extraction = extract_tags(
        text,
        &dictionary,
        state.llm.as_ref(),
        &model,
        request.custom_prompt.as_deref(),
    )
    .await?;

    Ok(Json(ExtractResponse {
        extraction_id: extraction.id,
        model: model.model,
        tags: extraction.record,
        warnings: extraction.warnings,
        candidate: extraction.candidate,
        raw_response: extraction.raw_response,
        extracted_at: Utc::now(),
    }))
}

/// GET /api/v1/models
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        default: state.config.default_model.clone(),
        models: AVAILABLE_MODELS,
    })
}

/// GET /api/v1/dictionary/stats
pub async fn handle_dictionary_stats(State(state): State<AppState>) -> Json<DictionaryStats> {
    Json(state.dictionaries.snapshot().stats())
}

/// POST /api/v1/dictionary/reload
///
/// Rebuilds the dictionary from disk and swaps it in. A failed reload keeps the
/// current dictionary serving.
pub async fn handle_dictionary_reload(
    State(state): State<AppState>,
) -> Result<Json<DictionaryStats>, AppError> {
    let dir = state.config.dictionary_dir.clone();
    let store = state.dictionaries.clone();

    let fresh = tokio::task::spawn_blocking(move || store.reload_from(&dir))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let stats = fresh.stats();
    info!(?stats, "Tag dictionary reloaded");
    Ok(Json(stats))
}
