pub mod appresult;
pub mod auth;
pub mod chats;
pub mod db;
pub mod gigs;
pub mod profiles;
pub mod reviews;
pub mod session;
pub mod users;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub use appresult::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub auto_assign_first_applicant: bool,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            database_url: dotenv::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:gigboard.db".to_owned()),
            bind_addr: dotenv::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_owned()),
            auto_assign_first_applicant: dotenv::var("AUTO_ASSIGN_FIRST_APPLICANT")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
        }
    }
}
