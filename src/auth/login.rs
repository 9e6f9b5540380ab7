use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{users::{self, User}, AppError, AppResult, AppState};

use super::{open_session, password};

#[derive(Deserialize)]
pub(crate) struct LoginBody {
    email: String,
    password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(body): Json<LoginBody>,
) -> AppResult<Json<User>> {
    let email = body.email.trim().to_lowercase();

    // the same message for unknown email and wrong password
    let Some(user) = users::fetch_by_email(&db_pool, &email).await? else {
        return Err(AppError::unauthorized("invalid credentials"));
    };
    if !password::verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::unauthorized("invalid credentials"));
    }

    open_session(&session, user.id, user.role).await?;
    tracing::info!(user = %user.id, "logged in");

    Ok(Json(user))
}
