// Route table for the Arena API

use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/problems",
            get(handlers::list_problems).post(handlers::create_problem),
        )
        .route(
            "/problems/:id",
            get(handlers::get_problem)
                .patch(handlers::update_problem)
                .delete(handlers::delete_problem),
        )
        .route("/status", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
}
