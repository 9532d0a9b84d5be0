use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::suggestions::{ExtractColorsResponse, SuggestionQuery, SuggestionsResponse},
    error::AppError,
    services::suggestion_service,
    state::SharedState,
};

/// Routes handling harmony suggestions and image color extraction.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/suggestions", get(get_suggestions))
        .route("/extract-colors", post(extract_colors))
}

/// Return harmony suggestions for a base color and target role.
#[utoipa::path(
    get,
    path = "/suggestions",
    tag = "suggestions",
    params(SuggestionQuery),
    responses(
        (status = 200, description = "Filtered candidate colors", body = SuggestionsResponse)
    )
)]
pub async fn get_suggestions(
    State(state): State<SharedState>,
    Valid(Query(query)): Valid<Query<SuggestionQuery>>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let response = suggestion_service::suggestions(&state, query).await?;
    Ok(Json(response))
}

/// Upload an image and get the dominant colors the pipeline extracted.
#[utoipa::path(
    post,
    path = "/extract-colors",
    tag = "suggestions",
    responses(
        (status = 200, description = "Extracted colors", body = ExtractColorsResponse),
        (status = 503, description = "Pipeline unavailable")
    )
)]
pub async fn extract_colors(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractColorsResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("invalid multipart payload: {err}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(format!("failed to read image field: {err}")))?;

        let response =
            suggestion_service::extract_colors(&state, file_name, content_type, bytes.to_vec())
                .await?;
        return Ok(Json(response));
    }

    Err(AppError::BadRequest(
        "multipart payload is missing an `image` field".into(),
    ))
}
