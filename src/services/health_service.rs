use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.pipeline().await {
        Some(client) => {
            if let Err(err) = client.ping().await {
                warn!(error = %err, "pipeline health check failed");
            }
        }
        None => warn!("pipeline unavailable (degraded mode)"),
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
