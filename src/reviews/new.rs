use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{auth::CurrentUser, db, gigs, users, AppError, AppResult, AppState};

use super::Review;

fn validate_rating(rating: i64) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::bad_request("rating must be an integer from 1 to 5"));
    }
    Ok(())
}

/// The review gate: completed gig, client as reviewer, one review per
/// (gig, reviewer). On success the gig's inline review text is refreshed
/// from the comment; the inline field is a cache of this record.
pub async fn submit_review(
    pool: &SqlitePool,
    gig_id: Uuid,
    reviewer: Uuid,
    rating: i64,
    comment: String,
) -> AppResult<Review> {
    validate_rating(rating)?;

    let gig = gigs::load_gig(pool, gig_id).await?;
    if !gig.is_completed {
        return Err(AppError::forbidden("cannot review a gig that is not completed"));
    }
    if reviewer != gig.client {
        return Err(AppError::forbidden("only the client can review this gig"));
    }
    let Some(reviewed_user) = gig.freelancer else {
        return Err(AppError::bad_request("gig has no assigned freelancer to review"));
    };

    let review = Review {
        id: Uuid::now_v7(),
        gig: gig_id,
        reviewer,
        reviewed_user,
        rating,
        comment,
        date_posted: db::now_ts(),
    };

    let inserted = sqlx::query(
        "INSERT INTO reviews (id,gig_id,reviewer,reviewed_user,rating,comment,date_posted) \
         VALUES (?,?,?,?,?,?,?)",
    )
    .bind(review.id.to_string())
    .bind(review.gig.to_string())
    .bind(review.reviewer.to_string())
    .bind(review.reviewed_user.to_string())
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.date_posted)
    .execute(pool)
    .await;

    match inserted {
        Ok(_) => {}
        Err(e) if users::is_unique_violation(&e) => {
            return Err(AppError::conflict("you have already reviewed this gig"));
        }
        Err(e) => return Err(e.into()),
    }

    gigs::modify(pool, gig_id, |g| g.submit_review(reviewer, review.comment.clone())).await?;

    tracing::info!(gig = %gig_id, reviewer = %reviewer, rating, "review submitted");
    Ok(review)
}

#[derive(Deserialize)]
pub(crate) struct ReviewBody {
    rating: i64,
    comment: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_review(
    Path(gig_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(body): Json<ReviewBody>,
) -> AppResult<Json<Review>> {
    let review = submit_review(&db_pool, gig_id, user.id, body.rating, body.comment).await?;
    Ok(Json(review))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_inclusive() {
        for ok in 1..=5 {
            assert!(validate_rating(ok).is_ok());
        }
        for bad in [0, 6, -1, 100] {
            assert!(matches!(validate_rating(bad).unwrap_err(), AppError::BadRequest(_)));
        }
    }
}
