use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{auth::CurrentUser, gigs, users, AppError, AppResult, AppState};

use super::thread::{self, MessageView};

#[derive(Deserialize)]
pub(crate) struct SendMessageBody {
    content: String,
}

/// POST /chats/{gig_id}: append one message. The thread must already
/// exist (reading the chat creates it).
#[debug_handler(state = AppState)]
pub(crate) async fn send_msg(
    Path(gig_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
    Json(body): Json<SendMessageBody>,
) -> AppResult<Json<MessageView>> {
    let gig = gigs::load_gig(&db_pool, gig_id).await?;
    let (content, timestamp) =
        thread::append_message(&db_pool, &gig, user.id, &body.content).await?;

    let sender = users::fetch_summary(&db_pool, user.id)
        .await?
        .ok_or_else(|| AppError::server("sender account missing"))?;

    Ok(Json(MessageView { sender, content, timestamp }))
}
