use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{auth::CurrentUser, chats, AppResult, AppState, Config};

use super::{modify, Gig};

#[debug_handler(state = AppState)]
pub(crate) async fn apply(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    user: CurrentUser,
) -> AppResult<Json<Gig>> {
    let target =
        modify(&db_pool, id, |g| g.apply(user.id, config.auto_assign_first_applicant)).await?;

    let auto_assigned = target.freelancer == Some(user.id);
    tracing::info!(gig = %id, applicant = %user.id, auto_assigned, "application recorded");
    Ok(Json(target))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignBody {
    freelancer_id: Uuid,
}

#[debug_handler(state = AppState)]
pub(crate) async fn assign(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(body): Json<AssignBody>,
) -> AppResult<Json<Gig>> {
    let target = modify(&db_pool, id, |g| g.assign(body.freelancer_id, user.id)).await?;

    // the conversation is materialized eagerly here and lazily on first
    // chat access; ensure_thread tolerates either order
    chats::ensure_thread(&db_pool, &target).await?;

    tracing::info!(gig = %id, freelancer = %body.freelancer_id, "freelancer assigned");
    Ok(Json(target))
}

#[debug_handler(state = AppState)]
pub(crate) async fn complete(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
) -> AppResult<Json<Gig>> {
    let target = modify(&db_pool, id, |g| g.complete(user.id)).await?;
    tracing::info!(gig = %id, "gig completed");
    Ok(Json(target))
}

#[derive(Deserialize)]
pub(crate) struct ReviewBody {
    review: String,
}

/// Sets the denormalized review text on the gig itself. The structured
/// review record lives under /reviews.
#[debug_handler(state = AppState)]
pub(crate) async fn review(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(body): Json<ReviewBody>,
) -> AppResult<Json<Gig>> {
    let target =
        modify(&db_pool, id, |g| g.submit_review(user.id, body.review.clone())).await?;
    Ok(Json(target))
}
