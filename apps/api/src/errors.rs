use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::tagging::dictionary::DictionaryError;
use crate::tagging::extractor::ExtractionError;
use crate::tagging::parser::ParseError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("Model call error: {0}")]
    ModelCall(#[from] LlmError),

    #[error("Unparseable model output: {0}")]
    UnparseableOutput(#[from] ParseError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::ModelCall(e) => AppError::ModelCall(e),
            ExtractionError::Parse(e) => AppError::UnparseableOutput(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Dictionary(e) => {
                tracing::error!("Dictionary error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DICTIONARY_ERROR",
                    format!("Tag dictionary unavailable: {e}"),
                )
            }
            AppError::ModelCall(e) => {
                tracing::error!("Model call error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_CALL_FAILED",
                    "Extraction failed, please try again".to_string(),
                )
            }
            AppError::UnparseableOutput(e) => {
                tracing::error!("Unparseable model output: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UNPARSEABLE_MODEL_OUTPUT",
                    format!(
                        "The model reply contained no usable tag record: {}",
                        e.excerpt()
                    ),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                AppError::Validation("text cannot be empty".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::ModelCall(LlmError::Timeout), StatusCode::BAD_GATEWAY),
            (
                AppError::UnparseableOutput(ParseError::NoRecord {
                    excerpt: "nothing".to_string(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Dictionary(DictionaryError::EmptyName { kind: "country" }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_extraction_errors_map_to_distinct_variants() {
        let model: AppError = ExtractionError::ModelCall(LlmError::EmptyContent).into();
        assert!(matches!(model, AppError::ModelCall(_)));

        let parse: AppError = ExtractionError::Parse(ParseError::NoRecord {
            excerpt: String::new(),
        })
        .into();
        assert!(matches!(parse, AppError::UnparseableOutput(_)));
    }
}
