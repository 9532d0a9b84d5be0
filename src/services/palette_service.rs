//! Mutation pipeline for the shared palette editor.
//!
//! Every handler funnels through here: validate and normalize the input,
//! apply the change under the editor lock, then notify subscribed clients
//! that a fresh snapshot is available.

use tracing::info;

use crate::{
    dto::{
        palette::{
            AddColorRequest, ColorDto, PaletteSnapshot, RatioUpdateRequest, SliderConstraintsDto,
            UpdateColorRequest,
        },
        validation::normalize_hex,
    },
    error::ServiceError,
    services::progress,
    state::{SharedState, palette::ColorPatch},
};

/// Build the full editor snapshot returned by `GET /palette`.
pub async fn snapshot(state: &SharedState) -> PaletteSnapshot {
    let editor = state.editor().read().await;
    PaletteSnapshot {
        colors: editor.colors().iter().map(ColorDto::from).collect(),
        mode: editor.mode(),
        auto_neutrals: editor.auto_neutrals(),
        degraded: state.is_degraded().await,
    }
}

/// Add a user color to the palette.
pub async fn add_color(
    state: &SharedState,
    request: AddColorRequest,
) -> Result<PaletteSnapshot, ServiceError> {
    let hex = normalize_hex(&request.hex);

    {
        let mut editor = state.editor().write().await;
        editor.add_color(
            state.config(),
            hex.clone(),
            request.role,
            request.label,
            request.confirm,
        )?;
    }

    info!(%hex, role = %request.role, "color added");
    notify_and_snapshot(state).await
}

/// Apply a partial edit to the color at `index`.
pub async fn update_color(
    state: &SharedState,
    index: usize,
    request: UpdateColorRequest,
) -> Result<PaletteSnapshot, ServiceError> {
    let patch = ColorPatch {
        hex: request.hex.as_deref().map(normalize_hex),
        role: request.role,
        label: request.label,
    };

    {
        let mut editor = state.editor().write().await;
        editor.update_color(state.config(), index, patch)?;
    }

    info!(index, "color updated");
    notify_and_snapshot(state).await
}

/// Remove the color at `index`.
pub async fn remove_color(
    state: &SharedState,
    index: usize,
) -> Result<PaletteSnapshot, ServiceError> {
    {
        let mut editor = state.editor().write().await;
        editor.remove_color(state.config(), index)?;
    }

    info!(index, "color removed");
    notify_and_snapshot(state).await
}

/// Update the ratio of the core color at `index` from a slider drag.
pub async fn set_ratio(
    state: &SharedState,
    index: usize,
    request: RatioUpdateRequest,
) -> Result<PaletteSnapshot, ServiceError> {
    {
        let mut editor = state.editor().write().await;
        editor.set_ratio(index, request.ratio, request.commit)?;
    }

    if request.commit {
        info!(index, ratio = request.ratio, "ratio committed");
        return notify_and_snapshot(state).await;
    }

    // Live drags are frequent and provisional; skip the broadcast.
    Ok(snapshot(state).await)
}

/// Toggle the redistribution lock of the core color at `index`.
pub async fn set_locked(
    state: &SharedState,
    index: usize,
    locked: bool,
) -> Result<PaletteSnapshot, ServiceError> {
    {
        let mut editor = state.editor().write().await;
        editor.set_locked(index, locked)?;
    }

    info!(index, locked, "lock toggled");
    notify_and_snapshot(state).await
}

/// Return the collection to auto mode and recompute the role split.
pub async fn reset_ratios(state: &SharedState) -> Result<PaletteSnapshot, ServiceError> {
    {
        let mut editor = state.editor().write().await;
        editor.reset_ratios(state.config());
    }

    info!("ratios reset to auto mode");
    notify_and_snapshot(state).await
}

/// Enable or disable automatic neutral maintenance.
pub async fn set_auto_neutrals(
    state: &SharedState,
    enabled: bool,
) -> Result<PaletteSnapshot, ServiceError> {
    {
        let mut editor = state.editor().write().await;
        editor.set_auto_neutrals(state.config(), enabled)?;
    }

    info!(enabled, "auto neutrals toggled");
    notify_and_snapshot(state).await
}

/// Compute the slider bounds for the color at `index`.
pub async fn slider_constraints(
    state: &SharedState,
    index: usize,
) -> Result<SliderConstraintsDto, ServiceError> {
    let editor = state.editor().read().await;
    if index >= editor.colors().len() {
        return Err(ServiceError::NotFound(format!("no color at index {index}")));
    }

    Ok(crate::color::ratio::slider_constraints(editor.colors(), index).into())
}

/// Broadcast a palette-change event and return the fresh snapshot.
async fn notify_and_snapshot(state: &SharedState) -> Result<PaletteSnapshot, ServiceError> {
    let snapshot = snapshot(state).await;
    progress::broadcast_palette_updated(state, snapshot.colors.len(), snapshot.mode);
    Ok(snapshot)
}
