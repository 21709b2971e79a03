use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn booking_routes(state: AppState) -> Router {
    // All booking operations require authentication
    let protected_routes = Router::new()
        .route("/bookings", post(handlers::create_booking).get(handlers::list_bookings))
        .route("/bookings/{booking_id}", get(handlers::get_booking))
        // Payment and refund outcomes are recorded by an administrator
        .route("/bookings/{booking_id}/status", patch(handlers::update_booking_status))
        .route("/bookings/{booking_id}/reschedule", post(handlers::reschedule_booking))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
