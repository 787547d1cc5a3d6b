use axum::{Router, http::StatusCode, middleware::from_fn_with_state, routing::get};

use crate::state::AppState;
use crate::{auth, conversation, message};

pub fn init(state: AppState) -> Router {
    let protected = Router::new()
        .merge(conversation::api(state.clone()))
        .merge(message::api(state.clone()))
        .route_layer(from_fn_with_state(state, auth::middleware::authorize));

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .merge(protected)
}
