use crate::assistant::generator::GenerationClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub generator: GenerationClient,
}
