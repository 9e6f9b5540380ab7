use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppResult, AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewView {
    pub id: Uuid,
    pub gig: Uuid,
    pub reviewer: Uuid,
    pub reviewer_name: String,
    pub rating: i64,
    pub comment: String,
    pub date_posted: i64,
}

/// Public: everything said about one user, newest first.
#[debug_handler(state = AppState)]
pub(crate) async fn reviews_for_user(
    Path(user_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<ReviewView>>> {
    let rows: Vec<(String, String, String, String, i64, String, i64)> = sqlx::query_as(
        "SELECT r.id,r.gig_id,r.reviewer,u.name,r.rating,r.comment,r.date_posted \
         FROM reviews r JOIN users u ON u.id = r.reviewer \
         WHERE r.reviewed_user=? ORDER BY r.rowid DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(&db_pool)
    .await?;

    rows.into_iter()
        .map(|(id, gig, reviewer, reviewer_name, rating, comment, date_posted)| {
            Ok(ReviewView {
                id: Uuid::parse_str(&id)?,
                gig: Uuid::parse_str(&gig)?,
                reviewer: Uuid::parse_str(&reviewer)?,
                reviewer_name,
                rating,
                comment,
                date_posted,
            })
        })
        .collect::<AppResult<Vec<_>>>()
        .map(Json)
}
