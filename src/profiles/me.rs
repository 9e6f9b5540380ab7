use axum::{debug_handler, extract::State, Json};
use sqlx::SqlitePool;

use crate::{auth::CurrentUser, users::{self, User}, AppError, AppResult, AppState};

#[debug_handler(state = AppState)]
pub(crate) async fn my_profile(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
) -> AppResult<Json<User>> {
    let me = users::fetch_by_id(&db_pool, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Json(me))
}
