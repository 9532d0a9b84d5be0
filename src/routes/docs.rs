use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Mount point of the interactive API explorer.
const SWAGGER_PATH: &str = "/docs";
/// Path the generated palette API document is served from.
const OPENAPI_PATH: &str = "/api-doc/openapi.json";

/// Serve the Swagger UI for the palette API. Only mounted in developer mode.
pub fn router(state: SharedState) -> Router<SharedState> {
    let ui: Router<SharedState> = SwaggerUi::new(SWAGGER_PATH)
        .url(OPENAPI_PATH, ApiDoc::openapi())
        .into();

    ui.with_state(state)
}
