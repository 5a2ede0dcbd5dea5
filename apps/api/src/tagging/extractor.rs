//! Extraction pipeline: build prompt → call model → parse → validate.
//!
//! One call runs strictly in sequence. The model call is the only await point and is
//! not retried here.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm_client::{LlmError, ModelClient, ModelConfig};
use crate::tagging::dictionary::TagDictionary;
use crate::tagging::models::{CandidateRecord, TagRecord, Warning};
use crate::tagging::parser::{parse_response, ParseError};
use crate::tagging::prompts::{build_prompt, effective_override};
use crate::tagging::validator::validate;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("model call failed: {0}")]
    ModelCall(#[from] LlmError),

    #[error("model output could not be parsed: {0}")]
    Parse(#[from] ParseError),
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub id: Uuid,
    pub record: TagRecord,
    pub warnings: Vec<Warning>,
    /// What the model claimed before validation.
    pub candidate: CandidateRecord,
    /// The model's full reply.
    pub raw_response: String,
}

/// Extracts validated tags from `free_text`.
pub async fn extract_tags(
    free_text: &str,
    dictionary: &TagDictionary,
    client: &dyn ModelClient,
    model: &ModelConfig,
    custom_prompt: Option<&str>,
) -> Result<Extraction, ExtractionError> {
    let id = Uuid::new_v4();
    let prompt = build_prompt(free_text, dictionary, custom_prompt);

    let raw_response = client.send(&prompt, model).await.map_err(|e| {
        warn!(extraction_id = %id, model = %model.model, "Model call failed: {e}");
        e
    })?;

    let candidate = parse_response(&raw_response).map_err(|e| {
        warn!(extraction_id = %id, model = %model.model, "Unparseable model output: {e}");
        e
    })?;

    let outcome = validate(candidate.clone(), dictionary);
    info!(
        extraction_id = %id,
        model = %model.model,
        custom_prompt = effective_override(custom_prompt).is_some(),
        fully_valid = outcome.is_fully_valid(),
        complete = outcome.record.is_complete(),
        warnings = outcome.warnings.len(),
        "Extraction complete"
    );

    Ok(Extraction {
        id,
        record: outcome.record,
        warnings: outcome.warnings,
        candidate,
        raw_response,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedModelClient;
    use super::*;
    use crate::tagging::dictionary::test_support::sample_dictionary;
    use crate::tagging::models::WarningReason;

    const INPUT: &str = "我是统计学的本科生，高考600分，我想要申请一下英国的硕士。";

    fn model() -> ModelConfig {
        ModelConfig {
            model: "deepseek-chat".to_string(),
            temperature: 0.1,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_scenario_yields_full_record() {
        let client = ScriptedModelClient::replying(
            "```json\n{\"country\": \"英国\", \"degree\": \"硕士\", \"major\": \"理工科\", \"sub_major\": \"统计学\"}\n```",
        );
        let extraction = extract_tags(INPUT, &sample_dictionary(), &client, &model(), None)
            .await
            .unwrap();

        assert!(extraction.warnings.is_empty());
        assert_eq!(
            serde_json::to_string(&extraction.record).unwrap(),
            r#"{"country":"英国","degree":"硕士","major":"理工科","sub_major":"统计学"}"#
        );

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].user.contains(INPUT));
        assert!(seen[0].system.as_deref().unwrap().contains("统计学"));
    }

    #[tokio::test]
    async fn test_invalid_fields_degrade_with_warnings() {
        let client = ScriptedModelClient::replying(
            r#"{"country": "火星", "degree": "硕士", "major": "理工科", "sub_major": "金融学"}"#,
        );
        let extraction = extract_tags(INPUT, &sample_dictionary(), &client, &model(), None)
            .await
            .unwrap();

        assert_eq!(extraction.record.country(), None);
        assert_eq!(extraction.record.major(), Some("理工科"));
        assert_eq!(extraction.record.sub_major(), None);
        let reasons: Vec<_> = extraction.warnings.iter().map(|w| w.reason).collect();
        assert_eq!(
            reasons,
            vec![
                WarningReason::UnknownValue,
                WarningReason::HierarchyMismatch
            ]
        );
        assert_eq!(extraction.candidate.country.as_deref(), Some("火星"));
    }

    #[tokio::test]
    async fn test_model_failure_is_surfaced() {
        let client = ScriptedModelClient::failing(503);
        let err = extract_tags(INPUT, &sample_dictionary(), &client, &model(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::ModelCall(LlmError::Api { status: 503, .. })
        ));
        assert_eq!(client.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_output_is_distinct_from_model_failure() {
        let client = ScriptedModelClient::replying("抱歉，我无法识别。");
        let err = extract_tags(INPUT, &sample_dictionary(), &client, &model(), None)
            .await
            .unwrap_err();
        match err {
            ExtractionError::Parse(e) => assert_eq!(e.excerpt(), "抱歉，我无法识别。"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_custom_prompt_is_sent_verbatim() {
        let client = ScriptedModelClient::replying(r#"{"country": "英国"}"#);
        let extraction = extract_tags(
            INPUT,
            &sample_dictionary(),
            &client,
            &model(),
            Some("只识别国家，输出JSON：{input}"),
        )
        .await
        .unwrap();

        assert_eq!(extraction.record.country(), Some("英国"));
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].system, None);
        assert_eq!(seen[0].user, format!("只识别国家，输出JSON：{INPUT}"));
    }
}
