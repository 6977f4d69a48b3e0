pub mod analysis;
pub mod health;
pub mod status;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest(
            "/api",
            Router::new()
                .merge(status::router())
                .merge(analysis::router())
                .merge(crate::openapi::router()),
        )
        .with_state(state)
}
