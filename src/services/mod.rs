/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Palette mutation pipeline.
pub mod palette_service;
/// HTTP client for the image pipeline API.
pub mod pipeline;
/// Saved preset management.
pub mod preset_service;
/// WebSocket progress stream handling.
pub mod progress;
/// Harmony suggestions and image color extraction.
pub mod suggestion_service;
