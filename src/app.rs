use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/counter/increment", post(handlers::counter_increment))
        .route("/counter/decrement", post(handlers::counter_decrement))
        .route("/api/counter", get(handlers::get_counter).post(handlers::counter))
        .route("/api/charts", get(handlers::list_charts))
        .route("/api/charts/:kind", get(handlers::get_chart))
        .route("/api/auth", get(handlers::get_session))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .with_state(state)
}
