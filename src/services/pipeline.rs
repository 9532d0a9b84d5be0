//! HTTP client for the image pipeline's palette endpoints.
//!
//! The pipeline exposes curated harmony suggestions and image color
//! extraction. Both endpoints are optional: when the pipeline is down the
//! suggestion service falls back to the local harmony generator and only
//! image extraction becomes unavailable.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, StatusCode, multipart};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

use crate::{
    color::{ColorRole, harmony::Suggestion},
    dto::suggestions::ExtractedColor,
    state::link::BackoffPolicy,
};

/// Convenient result alias returning [`PipelineError`] failures.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures that can occur while talking to the pipeline API.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build pipeline client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent at all.
    #[error("failed to send pipeline request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The pipeline returned an unexpected status code.
    #[error("unexpected pipeline response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed.
    #[error("failed to decode pipeline response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The pipeline answered but rejected the request.
    #[error("pipeline rejected the request: {message}")]
    Rejected { message: String },
}

impl PipelineError {
    /// Whether retrying the same request has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::RequestSend { .. } => true,
            PipelineError::RequestStatus { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Retry a pipeline operation on transient failures, sleeping between
/// attempts according to `policy` plus a small random jitter.
pub async fn with_retry<T, F, Fut>(policy: &BackoffPolicy, mut operation: F) -> PipelineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PipelineResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                let jitter = Duration::from_millis(rand::rng().random_range(0..250));
                let delay = policy.delay_for(attempt) + jitter;
                warn!(error = %err, attempt, "pipeline request failed; retrying");
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Shape of the `/color-harmonies` response.
///
/// Older pipeline builds answer with a flat curated list; newer ones split
/// the batch into harmony groups plus neutral variants. Both are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HarmonyResponse {
    Curated {
        success: bool,
        #[serde(default)]
        curated_suggestions: Vec<WireSuggestion>,
    },
    Split {
        harmonies: HarmonyGroups,
        #[serde(default)]
        neutrals: Vec<WireSuggestion>,
    },
}

#[derive(Debug, Deserialize)]
struct HarmonyGroups {
    #[serde(default)]
    complementary: Vec<WireSuggestion>,
    #[serde(default)]
    analogous: Vec<WireSuggestion>,
}

#[derive(Debug, Deserialize)]
struct WireSuggestion {
    hex: String,
    #[serde(default)]
    label: Option<String>,
}

impl WireSuggestion {
    fn into_suggestion(self, default_label: &str) -> Suggestion {
        Suggestion {
            hex: self.hex.to_lowercase(),
            label: self.label.unwrap_or_else(|| default_label.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    colors: Vec<ExtractedColor>,
}

/// Client for the pipeline API, cheap to clone behind an `Arc`.
pub struct PipelineClient {
    client: Client,
    base_url: String,
}

impl PipelineClient {
    /// Build a client for the pipeline at `base_url`.
    pub fn new(base_url: &str) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|source| PipelineError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Ping the pipeline's health endpoint.
    pub async fn ping(&self) -> PipelineResult<()> {
        let path = "healthcheck";
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|source| PipelineError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PipelineError::RequestStatus {
                path: path.to_string(),
                status,
            })
        }
    }

    /// Request curated harmony suggestions for `base_color` filling `target_role`.
    pub async fn color_harmonies(
        &self,
        base_color: &str,
        target_role: ColorRole,
        offset: Option<f64>,
    ) -> PipelineResult<Vec<Suggestion>> {
        let path = "color-harmonies";
        let body = serde_json::json!({
            "base_color": base_color,
            "target_role": target_role,
            "offset": offset,
        });

        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(|source| PipelineError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::RequestStatus {
                path: path.to_string(),
                status,
            });
        }

        let payload = response.json::<HarmonyResponse>().await.map_err(|source| {
            PipelineError::DecodeResponse {
                path: path.to_string(),
                source,
            }
        })?;

        match payload {
            HarmonyResponse::Curated {
                success,
                curated_suggestions,
            } => {
                if !success {
                    return Err(PipelineError::Rejected {
                        message: "harmony request was not successful".to_string(),
                    });
                }
                Ok(curated_suggestions
                    .into_iter()
                    .map(|s| s.into_suggestion("Curated"))
                    .collect())
            }
            HarmonyResponse::Split {
                harmonies,
                neutrals,
            } => {
                let mut suggestions = Vec::new();
                suggestions.extend(
                    harmonies
                        .complementary
                        .into_iter()
                        .map(|s| s.into_suggestion("Complementary")),
                );
                suggestions.extend(
                    harmonies
                        .analogous
                        .into_iter()
                        .map(|s| s.into_suggestion("Analogous")),
                );
                suggestions.extend(neutrals.into_iter().map(|s| s.into_suggestion("Neutral")));
                Ok(suggestions)
            }
        }
    }

    /// Upload an image and get the dominant colors the pipeline extracted.
    pub async fn extract_colors(
        &self,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> PipelineResult<Vec<ExtractedColor>> {
        let path = "extract-colors-from-image";
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|source| PipelineError::RequestSend {
                path: path.to_string(),
                source,
            })?;
        let form = multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|source| PipelineError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(PipelineError::Rejected {
                message: "pipeline could not process the uploaded image".to_string(),
            });
        }
        if !status.is_success() {
            return Err(PipelineError::RequestStatus {
                path: path.to_string(),
                status,
            });
        }

        let payload = response.json::<ExtractResponse>().await.map_err(|source| {
            PipelineError::DecodeResponse {
                path: path.to_string(),
                source,
            }
        })?;

        Ok(payload.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curated_shape_is_accepted() {
        let raw = r##"{"success": true, "curated_suggestions": [{"hex": "#D84315"}]}"##;
        let parsed: HarmonyResponse = serde_json::from_str(raw).unwrap();
        let HarmonyResponse::Curated {
            success,
            curated_suggestions,
        } = parsed
        else {
            panic!("expected curated shape");
        };
        assert!(success);
        assert_eq!(curated_suggestions.len(), 1);
        let suggestion = curated_suggestions
            .into_iter()
            .next()
            .unwrap()
            .into_suggestion("Curated");
        assert_eq!(suggestion.hex, "#d84315");
        assert_eq!(suggestion.label, "Curated");
    }

    #[test]
    fn split_shape_is_accepted() {
        let raw = r##"{
            "harmonies": {
                "complementary": [{"hex": "#15a8d8", "label": "Opposite"}],
                "analogous": [{"hex": "#d88415"}]
            },
            "neutrals": [{"hex": "#f5f5f5"}]
        }"##;
        let parsed: HarmonyResponse = serde_json::from_str(raw).unwrap();
        let HarmonyResponse::Split {
            harmonies,
            neutrals,
        } = parsed
        else {
            panic!("expected split shape");
        };
        assert_eq!(harmonies.complementary[0].label.as_deref(), Some("Opposite"));
        assert_eq!(harmonies.analogous.len(), 1);
        assert_eq!(neutrals.len(), 1);
    }

    #[test]
    fn transient_errors_are_classified() {
        let err = PipelineError::RequestStatus {
            path: "color-harmonies".to_string(),
            status: StatusCode::BAD_GATEWAY,
        };
        assert!(err.is_transient());

        let err = PipelineError::RequestStatus {
            path: "color-harmonies".to_string(),
            status: StatusCode::BAD_REQUEST,
        };
        assert!(!err.is_transient());

        let err = PipelineError::Rejected {
            message: "nope".to_string(),
        };
        assert!(!err.is_transient());
    }
}
