use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    auth::CurrentUser,
    gigs::SkillsInput,
    users::{self, Profile, Role, User},
    AppError, AppResult, AppState,
};

#[derive(Deserialize)]
pub(crate) struct ProfileBody {
    bio: Option<String>,
    skills: Option<SkillsInput>,
    portfolio: Option<String>,
    rate: Option<f64>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(body): Json<ProfileBody>,
) -> AppResult<Json<User>> {
    if user.role != Role::Freelancer {
        return Err(AppError::forbidden("only freelancers can edit a profile"));
    }
    if let Some(rate) = body.rate {
        if !rate.is_finite() || rate < 0.0 {
            return Err(AppError::bad_request("rate must be a non-negative number"));
        }
    }

    let profile = Profile {
        bio: body.bio,
        skills: body.skills.map(SkillsInput::normalize).unwrap_or_default(),
        portfolio: body.portfolio,
        rate: body.rate,
    };
    users::update_profile(&db_pool, user.id, &profile).await?;

    let me = users::fetch_by_id(&db_pool, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Json(me))
}
