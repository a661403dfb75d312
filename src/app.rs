use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/picker/toggle", post(handlers::picker_toggle))
        .route("/picker/previous", post(handlers::picker_previous))
        .route("/picker/next", post(handlers::picker_next))
        .route("/picker/dismiss", post(handlers::picker_dismiss))
        .route("/picker/select", post(handlers::picker_select))
        .route("/api/picker", get(handlers::get_picker))
        .route("/api/year", get(handlers::get_year).post(handlers::set_year))
        .route("/api/overview", get(handlers::get_overview))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
