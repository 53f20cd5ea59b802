use axum::{routing::get, Router};

use scheduling_cell::router::appointment_routes;
use scheduling_cell::SchedulingState;

pub fn create_router(state: SchedulingState) -> Router {
    Router::new()
        .route("/", get(|| async { "Consulta API is running!" }))
        .nest("/appointments", appointment_routes(state))
}
