//! anamnesis-lambda
//!
//! HTTP surface over the interview orchestrator. Runs as an AWS Lambda
//! function, or as a plain listener when `ANAMNESIS_LISTEN_ADDR` is set.

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        // Active session
        .route("/session", get(routes::session::current_session))
        .route("/session/start", post(routes::session::start))
        .route("/session/answers", post(routes::session::submit_answers))
        .route("/session/images", post(routes::session::submit_images))
        .route("/session/skip", post(routes::session::skip))
        .route("/session/record", post(routes::session::request_record))
        .route("/session/reset", post(routes::session::reset))
        // Stored snapshots
        .route("/sessions", get(routes::sessions::list_sessions))
        .route(
            "/sessions/{id}",
            get(routes::sessions::get_session).delete(routes::sessions::delete_session),
        )
        .route("/sessions/{id}/load", post(routes::sessions::load_session))
        .layer(axum_mw::from_fn(middleware::request_log::request_log))
        .layer(cors)
        .with_state(state)
}
