use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn therapist_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/timeslots", get(handlers::get_timeslots))
        .route("/therapists", get(handlers::list_therapists))
        .route("/therapists/{therapist_id}", get(handlers::get_therapist))
        .route(
            "/therapists/{therapist_id}/availability/{date}",
            get(handlers::get_therapist_availability),
        );

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        // Universal catalog - admin only
        .route("/timeslots/candidates", post(handlers::search_candidates))
        .route("/timeslots/{date}", put(handlers::save_timeslots))
        .route("/timeslots/{date}/copy", post(handlers::copy_timeslots))
        .route("/timeslots/{date}/recurring", post(handlers::recurring_timeslots))

        // Therapist profile and availability - owning expert or admin
        .route("/therapists", post(handlers::create_therapist))
        .route("/therapists/{therapist_id}", put(handlers::update_therapist))
        .route(
            "/therapists/{therapist_id}/availability/{date}",
            put(handlers::save_therapist_availability),
        )
        .route(
            "/therapists/{therapist_id}/availability/{date}/copy",
            post(handlers::copy_therapist_availability),
        )
        .route(
            "/therapists/{therapist_id}/availability/{date}/recurring",
            post(handlers::recurring_therapist_availability),
        )
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
