use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    advance_round, create_match, finish_match, get_match, get_score, list_matches, pause_match,
    record_foul, record_score, record_warning, resume_match, start_match,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_match))
        .route("/:id/start", post(start_match))
        .route("/:id/pause", post(pause_match))
        .route("/:id/resume", post(resume_match))
        .route("/:id/finish", post(finish_match))
        .route("/:id/next-round", post(advance_round))
        .route("/:id/:color/scores", post(record_score))
        .route("/:id/:color/fouls", post(record_foul))
        .route("/:id/:color/warnings", post(record_warning))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_matches))
        .route("/:id", get(get_match))
        .route("/:id/:color/score", get(get_score))
        .merge(protected)
}
