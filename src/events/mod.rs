use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Router,
};

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/events/:id",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route("/events/:id/contribute", patch(handlers::contribute))
        .route("/my-events", get(handlers::my_events))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}
