use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod palette;
pub mod presets;
pub mod suggestions;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
///
/// The Swagger UI is only mounted when developer mode is enabled.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(websocket::router())
        .merge(palette::router())
        .merge(suggestions::router())
        .merge(presets::router());

    let router = if state.config().developer_mode() {
        api_router.merge(docs::router(state.clone()))
    } else {
        api_router
    };

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    // Assembling the full tree type-checks every handler signature,
    // including the Valid-wrapped body and query extractors.
    #[test]
    fn full_router_assembles() {
        let state = AppState::new(AppConfig::default());
        let _ = router(state);
    }
}
