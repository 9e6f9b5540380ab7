use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{auth::CurrentUser, users::Role, AppError, AppResult, AppState};

use super::{gig, load_gig, Gig, SkillsInput};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GigBody {
    title: String,
    description: String,
    location: String,
    budget: f64,
    skills_required: Option<SkillsInput>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_gig(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(body): Json<GigBody>,
) -> AppResult<Json<Gig>> {
    if user.role != Role::Client {
        return Err(AppError::forbidden("only clients can post gigs"));
    }

    let new_gig = Gig::create(
        user.id,
        body.title,
        body.description,
        body.location,
        body.budget,
        body.skills_required,
    )?;
    gig::insert(&db_pool, &new_gig).await?;
    tracing::info!(gig = %new_gig.id, client = %user.id, "gig posted");

    Ok(Json(new_gig))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_gig(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(body): Json<GigBody>,
) -> AppResult<Json<Gig>> {
    let target = super::modify(&db_pool, id, |g| {
        g.update_details(
            user.id,
            body.title.clone(),
            body.description.clone(),
            body.location.clone(),
            body.budget,
            body.skills_required.clone(),
        )
    })
    .await?;
    Ok(Json(target))
}

/// Removes the gig. Its chat thread is left orphaned; there is no cascade.
#[debug_handler(state = AppState)]
pub(crate) async fn delete_gig(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
) -> AppResult<Json<Value>> {
    let target = load_gig(&db_pool, id).await?;
    target.authorize_owner(user.id)?;
    gig::delete(&db_pool, id).await?;
    tracing::info!(gig = %id, "gig removed");
    Ok(Json(json!({ "msg": "gig removed" })))
}
