//! Harmony suggestions and image color extraction.
//!
//! Suggestions prefer the pipeline's curated batches and fall back to the
//! local hue-rotation generator when the pipeline is unreachable, so the
//! route never fails outright. Image extraction has no local fallback.

use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    color::harmony::{self, DEFAULT_ANALOGOUS_OFFSET},
    dto::{
        suggestions::{
            ExtractColorsResponse, SuggestionDto, SuggestionQuery, SuggestionSource,
            SuggestionsResponse,
        },
        validation::normalize_hex,
        ws::ProgressEvent,
    },
    error::ServiceError,
    services::{pipeline, progress},
    state::{SharedState, link::BackoffPolicy},
};

/// Retry budget for interactive pipeline calls. Long waits belong to the
/// supervisor loop, not to a request handler.
fn request_policy() -> BackoffPolicy {
    BackoffPolicy {
        initial: Duration::from_millis(250),
        factor: 2,
        max_delay: Duration::from_secs(1),
        max_attempts: 2,
    }
}

/// Produce harmony suggestions for a base color and target role, filtered
/// against the current palette.
pub async fn suggestions(
    state: &SharedState,
    query: SuggestionQuery,
) -> Result<SuggestionsResponse, ServiceError> {
    let base = normalize_hex(&query.base_color);
    let offset = query.offset.unwrap_or(DEFAULT_ANALOGOUS_OFFSET);
    let existing = {
        let editor = state.editor().read().await;
        editor.colors().to_vec()
    };

    if let Some(client) = state.pipeline().await {
        let policy = request_policy();
        let result = pipeline::with_retry(&policy, || {
            client.color_harmonies(&base, query.target_role, query.offset)
        })
        .await;

        match result {
            Ok(candidates) if !candidates.is_empty() => {
                let suggestions = harmony::filter_similar(candidates, &existing)
                    .into_iter()
                    .map(SuggestionDto::from)
                    .collect();
                return Ok(SuggestionsResponse {
                    suggestions,
                    source: SuggestionSource::Pipeline,
                });
            }
            Ok(_) => {
                info!("pipeline returned no candidates; generating locally");
            }
            Err(err) => {
                warn!(error = %err, "pipeline harmony request failed; generating locally");
            }
        }
    }

    let candidates = harmony::suggestions_for(&base, query.target_role, offset);
    let suggestions = harmony::filter_similar(candidates, &existing)
        .into_iter()
        .map(SuggestionDto::from)
        .collect();

    Ok(SuggestionsResponse {
        suggestions,
        source: SuggestionSource::Local,
    })
}

/// Upload an image to the pipeline and return the extracted colors.
///
/// Unlike suggestions there is no local fallback: without the pipeline the
/// operation is refused as degraded.
pub async fn extract_colors(
    state: &SharedState,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
) -> Result<ExtractColorsResponse, ServiceError> {
    let Some(client) = state.pipeline().await else {
        return Err(ServiceError::Degraded);
    };

    let job_id = Uuid::new_v4().to_string();
    progress::broadcast(
        state,
        &ProgressEvent::PipelineProgress {
            job_id: job_id.clone(),
            stage: "extracting".to_string(),
            percent: 10,
        },
    );

    let colors = client
        .extract_colors(file_name, content_type, bytes)
        .await
        .map_err(ServiceError::from)?;

    progress::broadcast(
        state,
        &ProgressEvent::PipelineProgress {
            job_id: job_id.clone(),
            stage: "done".to_string(),
            percent: 100,
        },
    );

    info!(%job_id, count = colors.len(), "image colors extracted");
    Ok(ExtractColorsResponse { colors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{color::ColorRole, config::AppConfig, state::AppState};

    #[tokio::test]
    async fn suggestions_fall_back_to_the_local_generator() {
        let state = AppState::new(AppConfig::default());
        let response = suggestions(
            &state,
            SuggestionQuery {
                base_color: "#2196F3".into(),
                target_role: ColorRole::Accent,
                offset: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(response.source, SuggestionSource::Local);
        assert!(response.suggestions.len() >= 2);
        for suggestion in &response.suggestions {
            assert!(suggestion.hex.starts_with('#'));
        }
    }

    #[tokio::test]
    async fn extraction_requires_the_pipeline() {
        let state = AppState::new(AppConfig::default());
        let err = extract_colors(&state, "photo.png".into(), "image/png".into(), vec![0u8])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }
}
