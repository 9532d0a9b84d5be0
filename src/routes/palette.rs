use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::palette::{
        AddColorRequest, AutoNeutralsRequest, LockRequest, PaletteSnapshot, RatioUpdateRequest,
        SliderConstraintsDto, UpdateColorRequest,
    },
    error::AppError,
    services::palette_service,
    state::SharedState,
};

/// Routes handling palette state and color mutations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/palette", get(get_palette))
        .route("/palette/colors", post(add_color))
        .route(
            "/palette/colors/{index}",
            put(update_color).delete(remove_color),
        )
        .route("/palette/colors/{index}/ratio", put(set_ratio))
        .route("/palette/colors/{index}/lock", put(set_locked))
        .route("/palette/colors/{index}/slider", get(slider_constraints))
        .route("/palette/ratios/reset", post(reset_ratios))
        .route("/palette/auto-neutrals", put(set_auto_neutrals))
}

/// Return the full editor snapshot.
#[utoipa::path(
    get,
    path = "/palette",
    tag = "palette",
    responses(
        (status = 200, description = "Current palette state", body = PaletteSnapshot)
    )
)]
pub async fn get_palette(State(state): State<SharedState>) -> Json<PaletteSnapshot> {
    Json(palette_service::snapshot(&state).await)
}

/// Add a color to the palette.
#[utoipa::path(
    post,
    path = "/palette/colors",
    tag = "palette",
    request_body = AddColorRequest,
    responses(
        (status = 200, description = "Color added", body = PaletteSnapshot),
        (status = 409, description = "Duplicate, cap reached, or confirmation required")
    )
)]
pub async fn add_color(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AddColorRequest>>,
) -> Result<Json<PaletteSnapshot>, AppError> {
    let snapshot = palette_service::add_color(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Partially update the color at the given position.
#[utoipa::path(
    put,
    path = "/palette/colors/{index}",
    tag = "palette",
    params(("index" = usize, Path, description = "Zero-based color position")),
    request_body = UpdateColorRequest,
    responses(
        (status = 200, description = "Color updated", body = PaletteSnapshot),
        (status = 404, description = "No color at this position")
    )
)]
pub async fn update_color(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Valid(Json(payload)): Valid<Json<UpdateColorRequest>>,
) -> Result<Json<PaletteSnapshot>, AppError> {
    let snapshot = palette_service::update_color(&state, index, payload).await?;
    Ok(Json(snapshot))
}

/// Remove the color at the given position.
#[utoipa::path(
    delete,
    path = "/palette/colors/{index}",
    tag = "palette",
    params(("index" = usize, Path, description = "Zero-based color position")),
    responses(
        (status = 200, description = "Color removed", body = PaletteSnapshot),
        (status = 404, description = "No color at this position")
    )
)]
pub async fn remove_color(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<Json<PaletteSnapshot>, AppError> {
    let snapshot = palette_service::remove_color(&state, index).await?;
    Ok(Json(snapshot))
}

/// Update the ratio of a core color from a slider drag.
#[utoipa::path(
    put,
    path = "/palette/colors/{index}/ratio",
    tag = "palette",
    params(("index" = usize, Path, description = "Zero-based color position")),
    request_body = RatioUpdateRequest,
    responses(
        (status = 200, description = "Ratio updated", body = PaletteSnapshot),
        (status = 409, description = "Color is locked or not a core color")
    )
)]
pub async fn set_ratio(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Valid(Json(payload)): Valid<Json<RatioUpdateRequest>>,
) -> Result<Json<PaletteSnapshot>, AppError> {
    let snapshot = palette_service::set_ratio(&state, index, payload).await?;
    Ok(Json(snapshot))
}

/// Toggle the redistribution lock of a core color.
#[utoipa::path(
    put,
    path = "/palette/colors/{index}/lock",
    tag = "palette",
    params(("index" = usize, Path, description = "Zero-based color position")),
    request_body = LockRequest,
    responses(
        (status = 200, description = "Lock toggled", body = PaletteSnapshot),
        (status = 409, description = "Not a core color")
    )
)]
pub async fn set_locked(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Json(payload): Json<LockRequest>,
) -> Result<Json<PaletteSnapshot>, AppError> {
    let snapshot = palette_service::set_locked(&state, index, payload.locked).await?;
    Ok(Json(snapshot))
}

/// Return the slider bounds for the color at the given position.
#[utoipa::path(
    get,
    path = "/palette/colors/{index}/slider",
    tag = "palette",
    params(("index" = usize, Path, description = "Zero-based color position")),
    responses(
        (status = 200, description = "Slider bounds", body = SliderConstraintsDto),
        (status = 404, description = "No color at this position")
    )
)]
pub async fn slider_constraints(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<Json<SliderConstraintsDto>, AppError> {
    let constraints = palette_service::slider_constraints(&state, index).await?;
    Ok(Json(constraints))
}

/// Return the collection to automatic ratio allocation.
#[utoipa::path(
    post,
    path = "/palette/ratios/reset",
    tag = "palette",
    responses(
        (status = 200, description = "Ratios reset", body = PaletteSnapshot)
    )
)]
pub async fn reset_ratios(
    State(state): State<SharedState>,
) -> Result<Json<PaletteSnapshot>, AppError> {
    let snapshot = palette_service::reset_ratios(&state).await?;
    Ok(Json(snapshot))
}

/// Enable or disable automatic neutral maintenance.
#[utoipa::path(
    put,
    path = "/palette/auto-neutrals",
    tag = "palette",
    request_body = AutoNeutralsRequest,
    responses(
        (status = 200, description = "Auto neutrals toggled", body = PaletteSnapshot),
        (status = 409, description = "Toggle would leave the palette empty")
    )
)]
pub async fn set_auto_neutrals(
    State(state): State<SharedState>,
    Json(payload): Json<AutoNeutralsRequest>,
) -> Result<Json<PaletteSnapshot>, AppError> {
    let snapshot = palette_service::set_auto_neutrals(&state, payload.enabled).await?;
    Ok(Json(snapshot))
}
