use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{create_url_handler, health_handler, redirect_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", post(create_url_handler))
            .route("/health", get(health_handler))
            .route("/{code}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            // the frontend is served from a different origin
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}
