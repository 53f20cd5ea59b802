// libs/scheduling-cell/src/router.rs
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::SchedulingState;

pub fn appointment_routes(state: SchedulingState) -> Router {
    // All appointment operations require authentication
    let protected_routes = Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/", get(handlers::list_appointments))
        .route("/stats", get(handlers::appointment_stats))
        .route("/conflicts/check", get(handlers::check_appointment_conflicts))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}", patch(handlers::update_appointment))
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/start", post(handlers::start_appointment))
        .route("/{appointment_id}/finish", post(handlers::finish_appointment))
        .route("/{appointment_id}/no-show", post(handlers::no_show_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route(
            "/{appointment_id}/reschedule",
            post(handlers::reschedule_appointment),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
