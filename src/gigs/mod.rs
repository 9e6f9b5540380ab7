mod gig;
mod lifecycle;
mod new;
mod search;

use axum::{routing::{get, put}, Router};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState};

pub use gig::{delete, fetch, fetch_all, insert, save, Gig, SkillsInput};
pub use search::{search, SearchQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search::list_gigs).post(new::create_gig))
        .route("/search", get(search::search_gigs))
        .route("/freelancer/dashboard", get(search::freelancer_dashboard))
        .route("/applicants/{id}", get(search::applicant))
        .route(
            "/{id}",
            get(search::gig_by_id).put(new::update_gig).delete(new::delete_gig),
        )
        .route("/{id}/apply", put(lifecycle::apply))
        .route("/{id}/assign", put(lifecycle::assign))
        .route("/{id}/complete", put(lifecycle::complete))
        .route("/{id}/review", put(lifecycle::review))
}

pub(crate) async fn load_gig(pool: &SqlitePool, id: Uuid) -> AppResult<Gig> {
    gig::fetch(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("gig not found"))
}

const MODIFY_ATTEMPTS: u32 = 3;

/// Load-mutate-store with optimistic retry. When a concurrent writer
/// lands between our read and write, `save` reports the stale version
/// and the whole round is redone against the fresh row, so no applicant
/// or lifecycle change is ever lost to an overlapping request. `op` may
/// therefore run more than once and must not carry side effects of its
/// own.
pub async fn modify<F>(pool: &SqlitePool, id: Uuid, mut op: F) -> AppResult<Gig>
where
    F: FnMut(&mut Gig) -> AppResult<()>,
{
    for _ in 0..MODIFY_ATTEMPTS {
        let mut target = load_gig(pool, id).await?;
        op(&mut target)?;
        if gig::save(pool, &mut target).await? {
            return Ok(target);
        }
    }
    Err(AppError::conflict("gig is being updated by another request, try again"))
}
