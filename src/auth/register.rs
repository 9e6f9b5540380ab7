use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    db,
    users::{self, Profile, Role, User},
    AppError, AppResult, AppState,
};

use super::{open_session, password};

#[derive(Deserialize)]
pub(crate) struct RegisterBody {
    name: String,
    email: String,
    password: String,
    role: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(body): Json<RegisterBody>,
) -> AppResult<Json<User>> {
    let name = body.name.trim().to_owned();
    let email = body.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() {
        return Err(AppError::bad_request("name and email are required"));
    }
    if body.password.len() < 6 {
        return Err(AppError::bad_request("password must be at least 6 characters"));
    }
    let Some(role) = Role::parse(&body.role) else {
        return Err(AppError::bad_request("role must be client or freelancer"));
    };

    if users::fetch_by_email(&db_pool, &email).await?.is_some() {
        return Err(AppError::conflict("email is already registered"));
    }

    let user = User {
        id: Uuid::now_v7(),
        name,
        email,
        password_hash: password::hash_password(&body.password)?,
        role,
        profile: Profile::default(),
        date_joined: db::now_ts(),
    };
    users::insert(&db_pool, &user).await?;

    open_session(&session, user.id, user.role).await?;
    tracing::info!(user = %user.id, role = role.as_str(), "registered");

    Ok(Json(user))
}
