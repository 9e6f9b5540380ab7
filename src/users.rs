use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Freelancer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "client" => Some(Role::Client),
            "freelancer" => Some(Role::Freelancer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Freelancer => "freelancer",
        }
    }
}

/// Freelancer-owned profile fields. Empty for clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub portfolio: Option<String>,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub profile: Profile,
    pub date_joined: i64,
}

/// The public slice of a user attached to gigs and chat messages.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

type UserRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<f64>,
    i64,
);

fn from_row(row: UserRow) -> AppResult<User> {
    let (id, name, email, password_hash, role, bio, skills, portfolio, rate, date_joined) = row;
    Ok(User {
        id: Uuid::parse_str(&id)?,
        name,
        email,
        password_hash,
        role: Role::parse(&role)
            .ok_or_else(|| AppError::server(format!("unknown role in users table: {role}")))?,
        profile: Profile {
            bio,
            skills: skills
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?
                .unwrap_or_default(),
            portfolio,
            rate,
        },
        date_joined,
    })
}

const USER_COLUMNS: &str = "id,name,email,password_hash,role,bio,skills,portfolio,rate,date_joined";

pub async fn insert(pool: &SqlitePool, user: &User) -> AppResult<()> {
    let result = sqlx::query(
        "INSERT INTO users (id,name,email,password_hash,role,bio,skills,portfolio,rate,date_joined) \
         VALUES (?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(user.id.to_string())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(&user.profile.bio)
    .bind(serde_json::to_string(&user.profile.skills)?)
    .bind(&user.profile.portfolio)
    .bind(user.profile.rate)
    .bind(user.date_joined)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => {
            Err(AppError::conflict("email is already registered"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_by_id(pool: &SqlitePool, id: Uuid) -> AppResult<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;
    row.map(from_row).transpose()
}

pub async fn fetch_by_email(pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email=?"))
            .bind(email)
            .fetch_optional(pool)
            .await?;
    row.map(from_row).transpose()
}

pub async fn fetch_summary(pool: &SqlitePool, id: Uuid) -> AppResult<Option<UserSummary>> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id,name,email FROM users WHERE id=?")
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;
    Ok(match row {
        Some((id, name, email)) => Some(UserSummary {
            id: Uuid::parse_str(&id)?,
            name,
            email,
        }),
        None => None,
    })
}

pub async fn update_profile(pool: &SqlitePool, id: Uuid, profile: &Profile) -> AppResult<()> {
    sqlx::query("UPDATE users SET bio=?, skills=?, portfolio=?, rate=? WHERE id=?")
        .bind(&profile.bio)
        .bind(serde_json::to_string(&profile.skills)?)
        .bind(&profile.portfolio)
        .bind(profile.rate)
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|d| d.kind() == sqlx::error::ErrorKind::UniqueViolation)
}
