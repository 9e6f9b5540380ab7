use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    gigs::{self, Gig},
    users::UserSummary,
    AppError, AppResult, AppState,
};

/// One conversation per gig, between the client and the assigned
/// freelancer. Participants are derived from the gig and re-synced on
/// access, so a thread created before assignment picks up the
/// freelancer later.
#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub participants: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct MessageView {
    pub sender: UserSummary,
    pub content: String,
    pub timestamp: i64,
}

fn participants_of(gig: &Gig) -> Vec<Uuid> {
    let mut participants = vec![gig.client];
    if let Some(freelancer) = gig.freelancer {
        participants.push(freelancer);
    }
    participants
}

fn parse_participants(raw: &str) -> AppResult<Vec<Uuid>> {
    let ids: Vec<String> = serde_json::from_str(raw)?;
    Ok(ids
        .iter()
        .map(|p| Uuid::parse_str(p))
        .collect::<Result<_, _>>()?)
}

fn participants_json(participants: &[Uuid]) -> AppResult<String> {
    let ids: Vec<String> = participants.iter().map(Uuid::to_string).collect();
    Ok(serde_json::to_string(&ids)?)
}

pub async fn fetch_thread(pool: &SqlitePool, gig_id: Uuid) -> AppResult<Option<Thread>> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT id,participants FROM chats WHERE gig_id=?")
            .bind(gig_id.to_string())
            .fetch_optional(pool)
            .await?;
    Ok(match row {
        Some((id, participants)) => Some(Thread {
            id: Uuid::parse_str(&id)?,
            gig_id,
            participants: parse_participants(&participants)?,
        }),
        None => None,
    })
}

/// Create-if-absent, idempotent under concurrent callers: the UNIQUE
/// constraint on gig_id makes the losing INSERT a no-op and both callers
/// read back the same row.
pub async fn ensure_thread(pool: &SqlitePool, gig: &Gig) -> AppResult<Thread> {
    sqlx::query("INSERT OR IGNORE INTO chats (id,gig_id,participants) VALUES (?,?,?)")
        .bind(Uuid::now_v7().to_string())
        .bind(gig.id.to_string())
        .bind(participants_json(&participants_of(gig))?)
        .execute(pool)
        .await?;

    let mut thread = fetch_thread(pool, gig.id)
        .await?
        .ok_or_else(|| AppError::server("chat thread vanished after creation"))?;
    sync_participants(pool, &mut thread, gig).await?;
    Ok(thread)
}

/// Brings a stale participant set in line with the gig.
pub(crate) async fn sync_participants(
    pool: &SqlitePool,
    thread: &mut Thread,
    gig: &Gig,
) -> AppResult<()> {
    let wanted = participants_of(gig);
    if thread.participants != wanted {
        sqlx::query("UPDATE chats SET participants=? WHERE id=?")
            .bind(participants_json(&wanted)?)
            .bind(thread.id.to_string())
            .execute(pool)
            .await?;
        thread.participants = wanted;
    }
    Ok(())
}

/// Append order is read order: messages keep their insertion order.
pub async fn list_messages(pool: &SqlitePool, chat_id: Uuid) -> AppResult<Vec<MessageView>> {
    let rows: Vec<(String, String, String, String, i64)> = sqlx::query_as(
        "SELECT m.sender,u.name,u.email,m.content,m.timestamp \
         FROM messages m JOIN users u ON u.id = m.sender \
         WHERE m.chat_id=? ORDER BY m.rowid",
    )
    .bind(chat_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(sender, name, email, content, timestamp)| {
            Ok(MessageView {
                sender: UserSummary {
                    id: Uuid::parse_str(&sender)?,
                    name,
                    email,
                },
                content,
                timestamp,
            })
        })
        .collect()
}

/// Append one message to the gig's conversation. The thread must already
/// exist; reading the chat is what creates it. Returns the stored
/// (trimmed) content and its timestamp.
pub async fn append_message(
    pool: &SqlitePool,
    gig: &Gig,
    sender: Uuid,
    raw_content: &str,
) -> AppResult<(String, i64)> {
    let Some(mut chat) = fetch_thread(pool, gig.id).await? else {
        return Err(AppError::not_found("chat not found for this gig"));
    };
    sync_participants(pool, &mut chat, gig).await?;

    let content = raw_content.trim().to_owned();
    if content.is_empty() {
        return Err(AppError::bad_request("message content cannot be empty"));
    }
    if !chat.participants.contains(&sender) {
        return Err(AppError::forbidden("not authorized to send messages in this chat"));
    }

    let timestamp = crate::db::now_ts();
    sqlx::query("INSERT INTO messages (id,chat_id,sender,content,timestamp) VALUES (?,?,?,?,?)")
        .bind(Uuid::now_v7().to_string())
        .bind(chat.id.to_string())
        .bind(sender.to_string())
        .bind(&content)
        .bind(timestamp)
        .execute(pool)
        .await?;

    Ok((content, timestamp))
}

#[derive(Serialize)]
pub(crate) struct ChatView {
    pub gig: Gig,
    pub messages: Vec<MessageView>,
}

/// GET /chats/{gig_id}: the polling read path. Lazily materializes the
/// thread on first authorized access.
#[debug_handler(state = AppState)]
pub(crate) async fn chat_thread(
    Path(gig_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
) -> AppResult<Json<ChatView>> {
    let gig = gigs::load_gig(&db_pool, gig_id).await?;
    if !gig.is_chat_participant(user.id) {
        return Err(AppError::forbidden("not authorized for this chat"));
    }

    let thread = ensure_thread(&db_pool, &gig).await?;
    let messages = list_messages(&db_pool, thread.id).await?;
    Ok(Json(ChatView { gig, messages }))
}
