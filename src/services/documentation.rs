use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Palette Studio Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::palette::get_palette,
        crate::routes::palette::add_color,
        crate::routes::palette::update_color,
        crate::routes::palette::remove_color,
        crate::routes::palette::set_ratio,
        crate::routes::palette::set_locked,
        crate::routes::palette::slider_constraints,
        crate::routes::palette::reset_ratios,
        crate::routes::palette::set_auto_neutrals,
        crate::routes::suggestions::get_suggestions,
        crate::routes::suggestions::extract_colors,
        crate::routes::presets::list_presets,
        crate::routes::presets::save_preset,
        crate::routes::presets::load_preset,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::color::role::ColorRole,
            crate::color::ratio::RatioMode,
            crate::dto::health::HealthResponse,
            crate::dto::palette::ColorDto,
            crate::dto::palette::PaletteSnapshot,
            crate::dto::palette::AddColorRequest,
            crate::dto::palette::UpdateColorRequest,
            crate::dto::palette::RatioUpdateRequest,
            crate::dto::palette::LockRequest,
            crate::dto::palette::AutoNeutralsRequest,
            crate::dto::palette::SliderConstraintsDto,
            crate::dto::presets::SavePresetRequest,
            crate::dto::presets::PresetSummary,
            crate::dto::suggestions::SuggestionDto,
            crate::dto::suggestions::SuggestionsResponse,
            crate::dto::suggestions::ExtractedColor,
            crate::dto::suggestions::ExtractColorsResponse,
            crate::dto::ws::ProgressEvent,
            crate::dto::ws::ClientInboundMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "palette", description = "Palette editing operations"),
        (name = "suggestions", description = "Harmony suggestions and image extraction"),
        (name = "presets", description = "Saved palette presets"),
        (name = "progress", description = "WebSocket progress stream"),
    )
)]
pub struct ApiDoc;
