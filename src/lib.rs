//! User login and registration service.
//!
//! Verifies credentials against a relational user store, hashes passwords
//! with bcrypt, and hands out signed session tokens as an HTTP-only cookie.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router (health, auth). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let auth_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/auth", auth_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
