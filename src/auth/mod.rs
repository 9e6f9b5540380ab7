mod login;
mod logout;
mod password;
mod register;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    routing::post,
    Router,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session::{USER_ID, USER_ROLE}, users::Role, AppError, AppState};

pub use password::{hash_password, verify_password};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
}

/// The authenticated caller, pulled from the session on every protected
/// request. Role is stored at login time and never changes afterward.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::unauthorized(msg))?;

        let Some(id) = session.get::<Uuid>(USER_ID).await? else {
            return Err(AppError::unauthorized("not signed in, authorization denied"));
        };
        let Some(role) = session.get::<Role>(USER_ROLE).await? else {
            return Err(AppError::unauthorized("not signed in, authorization denied"));
        };

        Ok(CurrentUser { id, role })
    }
}

pub(crate) async fn open_session(session: &Session, id: Uuid, role: Role) -> crate::AppResult<()> {
    session.insert(USER_ID, id).await?;
    session.insert(USER_ROLE, role).await?;
    Ok(())
}
