mod me;
mod update;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(update::update_profile))
        .route("/me", get(me::my_profile))
}
