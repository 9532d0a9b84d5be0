//! In-memory preset store backing the editor's save/load flow.

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{palette::PaletteSnapshot, presets::PresetSummary},
    error::ServiceError,
    services::{palette_service, progress},
    state::SharedState,
};

/// List saved presets in save order.
pub async fn list(state: &SharedState) -> Vec<PresetSummary> {
    let presets = state.presets().read().await;
    presets.values().map(PresetSummary::from).collect()
}

/// Save the current palette under a name.
pub async fn save(state: &SharedState, name: String) -> Result<PresetSummary, ServiceError> {
    let preset = {
        let editor = state.editor().read().await;
        if editor.colors().is_empty() {
            return Err(ServiceError::InvalidState(
                "cannot save an empty palette".into(),
            ));
        }
        editor.save_preset(name)
    };

    let summary = PresetSummary::from(&preset);
    info!(id = %preset.id, name = %preset.name, "preset saved");

    let mut presets = state.presets().write().await;
    presets.insert(preset.id, preset);
    Ok(summary)
}

/// Replace the editor state with a saved preset.
pub async fn load(state: &SharedState, id: Uuid) -> Result<PaletteSnapshot, ServiceError> {
    let preset = {
        let presets = state.presets().read().await;
        presets
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("preset `{id}` not found")))?
    };

    {
        let mut editor = state.editor().write().await;
        editor.load_preset(state.config(), &preset);
    }

    info!(%id, name = %preset.name, "preset loaded");
    let snapshot = palette_service::snapshot(state).await;
    progress::broadcast_palette_updated(state, snapshot.colors.len(), snapshot.mode);
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::ColorRole,
        config::AppConfig,
        dto::palette::AddColorRequest,
        state::AppState,
    };

    async fn state_with_primary() -> crate::state::SharedState {
        let state = AppState::new(AppConfig::default());
        palette_service::add_color(
            &state,
            AddColorRequest {
                hex: "#2196f3".into(),
                role: ColorRole::Primary,
                label: None,
                confirm: true,
            },
        )
        .await
        .unwrap();
        state
    }

    #[tokio::test]
    async fn empty_palette_cannot_be_saved() {
        let state = AppState::new(AppConfig::default());
        let err = save(&state, "empty".into()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn save_then_load_restores_the_palette() {
        let state = state_with_primary().await;
        let summary = save(&state, "brand".into()).await.unwrap();
        assert_eq!(list(&state).await.len(), 1);

        palette_service::remove_color(&state, 0).await.unwrap();
        assert!(palette_service::snapshot(&state).await.colors.is_empty());

        let snapshot = load(&state, summary.id).await.unwrap();
        assert_eq!(snapshot.colors.len(), summary.color_count);
        assert_eq!(snapshot.colors[0].hex, "#2196F3");
    }

    #[tokio::test]
    async fn loading_an_unknown_preset_is_not_found() {
        let state = state_with_primary().await;
        let err = load(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
