// routes.rs
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/questions", get(handlers::api_list_questions))
        .route("/questions/{question_id}", get(handlers::api_get_question))
        .route("/questions/{question_id}/vote", post(handlers::api_vote))
        .route("/admin/questions", post(handlers::api_create_question))
        .route(
            "/admin/questions/{question_id}",
            delete(handlers::api_delete_question),
        );

    Router::new()
        .route("/", get(handlers::root))
        .route("/polls", get(handlers::index))
        .route("/polls/{question_id}", get(handlers::detail))
        .route("/polls/{question_id}/results", get(handlers::results))
        .route("/polls/{question_id}/vote", post(handlers::vote))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
