use crate::{controllers::home_controller, AppState};
use axum::{routing::get, Router};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/health", get(home_controller::health))
}
