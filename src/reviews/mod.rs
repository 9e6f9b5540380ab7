mod list;
mod new;

use axum::{routing::{get, post}, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;

pub use new::submit_review;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{gig_id}", post(new::create_review))
        .route("/user/{user_id}", get(list::reviews_for_user))
}

/// A structured rating of the freelancer's completed work. One per
/// (gig, reviewer), backed by the UNIQUE constraint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub gig: Uuid,
    pub reviewer: Uuid,
    pub reviewed_user: Uuid,
    pub rating: i64,
    pub comment: String,
    pub date_posted: i64,
}
