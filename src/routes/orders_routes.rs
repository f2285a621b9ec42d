use crate::{controllers::orders_controller, AppState};
use axum::{
    routing::{get, post},
    Router,
};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/orders",
            post(orders_controller::create_order).get(orders_controller::list_orders),
        )
        .route("/orders/:id", get(orders_controller::get_order))
        .route("/orders/:id/status", post(orders_controller::update_status))
        .route(
            "/orders/:id/payment",
            post(orders_controller::simulate_payment),
        )
        .route(
            "/orders/:id/escrow/release",
            post(orders_controller::release_escrow),
        )
}
