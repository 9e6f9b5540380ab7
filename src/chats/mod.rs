mod msg;
mod thread;

use axum::{routing::get, Router};

use crate::AppState;

pub use thread::{
    append_message, ensure_thread, fetch_thread, list_messages, MessageView, Thread,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{gig_id}", get(thread::chat_thread).post(msg::send_msg))
}
