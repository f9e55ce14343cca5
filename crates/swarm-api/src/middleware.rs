//! Cross-cutting layers for the router.
use tower_http::cors::CorsLayer;

/// The chat widget is served from another origin during development.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}
