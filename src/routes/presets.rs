use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        palette::PaletteSnapshot,
        presets::{PresetSummary, SavePresetRequest},
    },
    error::AppError,
    services::preset_service,
    state::SharedState,
};

/// Routes handling saved palette presets.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/presets", get(list_presets).post(save_preset))
        .route("/presets/{id}/load", post(load_preset))
}

/// List saved presets in save order.
#[utoipa::path(
    get,
    path = "/presets",
    tag = "presets",
    responses(
        (status = 200, description = "Saved presets", body = [PresetSummary])
    )
)]
pub async fn list_presets(State(state): State<SharedState>) -> Json<Vec<PresetSummary>> {
    Json(preset_service::list(&state).await)
}

/// Save the current palette under a name.
#[utoipa::path(
    post,
    path = "/presets",
    tag = "presets",
    request_body = SavePresetRequest,
    responses(
        (status = 200, description = "Preset saved", body = PresetSummary),
        (status = 409, description = "Palette is empty")
    )
)]
pub async fn save_preset(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SavePresetRequest>>,
) -> Result<Json<PresetSummary>, AppError> {
    let summary = preset_service::save(&state, payload.name).await?;
    Ok(Json(summary))
}

/// Replace the current palette with a saved preset.
#[utoipa::path(
    post,
    path = "/presets/{id}/load",
    tag = "presets",
    params(("id" = Uuid, Path, description = "Identifier of the preset to load")),
    responses(
        (status = 200, description = "Preset loaded", body = PaletteSnapshot),
        (status = 404, description = "Preset not found")
    )
)]
pub async fn load_preset(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaletteSnapshot>, AppError> {
    let snapshot = preset_service::load(&state, id).await?;
    Ok(Json(snapshot))
}
