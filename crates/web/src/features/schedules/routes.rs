use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    create_tanding, create_tgr, distribute_tanding, distribute_tgr, list_tanding, list_tgr,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/tanding", post(create_tanding))
        .route("/tanding/distribute", post(distribute_tanding))
        .route("/tgr", post(create_tgr))
        .route("/tgr/distribute", post(distribute_tgr))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/tanding", get(list_tanding))
        .route("/tgr", get(list_tgr))
        .merge(protected)
}
