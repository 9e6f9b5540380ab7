use std::str::FromStr;

use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, SqlitePool};

pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Brings the schema up at startup. Every statement is idempotent, so
/// reconnecting to an existing database is a no-op.
pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            bio TEXT,
            skills TEXT,
            portfolio TEXT,
            rate REAL,
            date_joined INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS gigs (
            id TEXT PRIMARY KEY,
            client TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            location TEXT NOT NULL,
            budget REAL NOT NULL,
            skills_required TEXT NOT NULL,
            applicants TEXT NOT NULL,
            freelancer TEXT,
            is_completed INTEGER NOT NULL DEFAULT 0,
            is_paid INTEGER NOT NULL DEFAULT 0,
            review TEXT,
            date_posted INTEGER NOT NULL,
            version INTEGER NOT NULL DEFAULT 0
        )",
        // one thread per gig, racing creators resolved by INSERT OR IGNORE
        "CREATE TABLE IF NOT EXISTS chats (
            id TEXT PRIMARY KEY,
            gig_id TEXT NOT NULL UNIQUE,
            participants TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            chat_id TEXT NOT NULL,
            sender TEXT NOT NULL,
            content TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            gig_id TEXT NOT NULL,
            reviewer TEXT NOT NULL,
            reviewed_user TEXT NOT NULL,
            rating INTEGER NOT NULL,
            comment TEXT NOT NULL,
            date_posted INTEGER NOT NULL,
            UNIQUE (gig_id, reviewer)
        )",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

pub fn now_ts() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
