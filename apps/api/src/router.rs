use axum::{
    Router,
    routing::get,
};

use booking_cell::router::booking_routes;
use shared_database::AppState;
use therapist_cell::router::therapist_routes;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Therapy Booking API is running!" }))
        .merge(therapist_routes(state.clone()))
        .merge(booking_routes(state))
}
